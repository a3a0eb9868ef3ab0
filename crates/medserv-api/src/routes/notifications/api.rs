//! Notification API endpoints - JSON API

use crate::{today, ApiResult, AppState};
use axum::extract::State;
use axum::Json;
use medserv_core::ServiceAlert;

pub async fn api_notifications(State(state): State<AppState>) -> ApiResult<Json<Vec<ServiceAlert>>> {
    let alerts = state
        .dashboard
        .service_alerts(today())
        .await
        .map_err(|e| state.fail(e, "service_alerts", "/api/notifications"))?;
    Ok(Json(alerts))
}
