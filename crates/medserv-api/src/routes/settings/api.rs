//! Settings API endpoints - JSON API

use crate::AppState;
use axum::extract::State;
use axum::Json;
use medserv_config::Config;

pub async fn api_settings(State(state): State<AppState>) -> Json<Config> {
    Json(state.config().clone())
}
