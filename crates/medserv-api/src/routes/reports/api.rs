//! Reports API endpoints - JSON API

use crate::{parse_id, ApiError, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::Json;
use medserv_core::{PrintableReport, ReportsPage, ServicedDeviceGroup};
use std::collections::HashMap;

/// `page` query parameter, 1 when absent
pub fn parse_page(query: &HashMap<String, String>) -> ApiResult<usize> {
    match query.get("page").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Ok(1),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::bad_request(format!("invalid page: {}", raw))),
    }
}

pub async fn api_reports(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<ReportsPage>> {
    let page = parse_page(&query)?;
    let reports = state
        .dashboard
        .reports_page(page)
        .await
        .map_err(|e| state.fail(e, "reports_page", "/api/reports"))?;
    Ok(Json(reports))
}

pub async fn api_report_devices(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ServicedDeviceGroup>>> {
    let id = parse_id(&id)?;
    let groups = state
        .dashboard
        .serviced_devices(id)
        .await
        .map_err(|e| state.fail(e, "serviced_devices", &format!("/api/reports/{}/devices", id)))?;
    Ok(Json(groups))
}

pub async fn api_report_print(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintableReport>> {
    let id = parse_id(&id)?;
    let printable = state
        .dashboard
        .printable_report(id)
        .await
        .map_err(|e| state.fail(e, "printable_report", &format!("/api/reports/{}/print", id)))?;
    Ok(Json(printable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, router, source};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_api_report_devices_grouped() {
        let (status, body) = get(router(source()), "/api/reports/1/devices", false).await;
        assert_eq!(status, StatusCode::OK);

        let groups: serde_json::Value = serde_json::from_str(&body).unwrap();
        let groups = groups.as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["device"]["id"], 1);
        assert_eq!(groups[0]["work_types"].as_array().unwrap().len(), 2);
        assert_eq!(groups[1]["work_types"][0]["name"], "Cleaning");
    }

    #[tokio::test]
    async fn test_api_report_not_found() {
        let (status, body) = get(router(source()), "/api/reports/404/devices", false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("REPORT_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_api_report_devices_upstream_down() {
        let (status, _) = get(router(source().with_unavailable("medical_devices")), "/api/reports/1/devices", false).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_api_reports_oversized_page() {
        let (status, body) = get(router(source()), "/api/reports?page=18446744073709551615", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("INVALID_QUERY"));
    }

    #[tokio::test]
    async fn test_api_reports_paging() {
        let (status, body) = get(router(source()), "/api/reports?page=1", false).await;
        assert_eq!(status, StatusCode::OK);
        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["total_count"], 1);
        assert_eq!(page["reports"][0]["work_item_count"], 3);

        let (status, _) = get(router(source()), "/api/reports?page=abc", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_report_print() {
        let (status, body) = get(router(source()), "/api/reports/1/print", false).await;
        assert_eq!(status, StatusCode::OK);
        let printable: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(printable["report_number"], "R-0001");
        assert_eq!(printable["rows"][0]["work_performed"], "Cleaning, Calibration");
    }

    #[test]
    fn test_parse_page() {
        let mut query = HashMap::new();
        assert_eq!(parse_page(&query).unwrap(), 1);
        query.insert("page".to_string(), "3".to_string());
        assert_eq!(parse_page(&query).unwrap(), 3);
    }
}
