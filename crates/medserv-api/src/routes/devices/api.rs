//! Device API endpoints - error codes per day

use crate::{parse_id, today, ApiError, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, NaiveDate};
use medserv_core::{ChartData, ErrorCodeReport, MonthFilter};
use std::collections::HashMap;

/// Year/month filter from the query string
///
/// Without parameters the current month is selected. A year without a month
/// (or with `month=all`) selects the whole year.
pub fn parse_period(query: &HashMap<String, String>, today: NaiveDate) -> ApiResult<MonthFilter> {
    let year = query.get("year").map(|s| s.trim()).filter(|s| !s.is_empty());
    let month = query.get("month").map(|s| s.trim()).filter(|s| !s.is_empty());

    if year.is_none() && month.is_none() {
        return Ok(MonthFilter::month_of(today));
    }

    let year = match year {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| ApiError::bad_request(format!("invalid year: {}", raw)))?,
        None => today.year(),
    };
    let month = match month {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| ApiError::bad_request(format!("invalid month: {}", raw)))?,
        ),
    };

    Ok(MonthFilter::new(year, month)?)
}

pub async fn load_error_codes(
    state: &AppState,
    raw_id: &str,
    query: &HashMap<String, String>,
    path: &str,
) -> ApiResult<ErrorCodeReport> {
    let id = parse_id(raw_id)?;
    let period = parse_period(query, today())?;
    state
        .dashboard
        .error_code_report(id, period)
        .await
        .map_err(|e| state.fail(e, "error_code_report", path))
}

pub async fn api_device_error_codes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<ErrorCodeReport>> {
    let path = format!("/api/devices/{}/error-codes", id);
    Ok(Json(load_error_codes(&state, &id, &query, &path).await?))
}

pub async fn api_device_error_code_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<ChartData>> {
    let device_id = parse_id(&id)?;
    let period = parse_period(&query, today())?;
    let chart = state
        .dashboard
        .error_code_chart(device_id, period)
        .await
        .map_err(|e| state.fail(e, "error_code_chart", &format!("/api/devices/{}/error-codes/chart", id)))?;
    Ok(Json(chart))
}
