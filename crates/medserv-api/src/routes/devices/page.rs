//! Device page rendering - device list and error-code history

use crate::{page_result, render_bar_chart, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use medserv_core::time::MONTH_LABELS;
use medserv_core::{ErrorCodeReport, MonthFilter, Permission, PermissionSet};
use medserv_source::MedicalDevice;
use medserv_utils::{escape_html, or_placeholder};
use std::collections::HashMap;

use super::api::load_error_codes;

pub fn render_device_list(devices: &[MedicalDevice], permissions: &PermissionSet) -> String {
    if devices.is_empty() {
        return "<div class='text-center py-12 text-gray-500'><p>No medical devices</p></div>".to_string();
    }

    let mut html = String::from(r#"<table class='w-full text-sm'><thead class='bg-gray-50'><tr>
        <th class='px-4 py-2 text-left'>Brand</th>
        <th class='px-4 py-2 text-left'>Model</th>
        <th class='px-4 py-2 text-left'>Serial number</th>
        <th class='px-4 py-2 text-left'>Software</th>
        <th class='px-4 py-2'></th>
    </tr></thead><tbody>"#);

    for device in devices {
        let action = if permissions.can(Permission::ErrorCodeView) {
            format!("<a href='/devices/{}/error-codes' class='text-indigo-600 hover:underline'>Error codes</a>", device.id)
        } else {
            String::new()
        };
        html.push_str(&format!(
            r#"<tr class='border-b hover:bg-gray-50'>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
            </tr>"#,
            escape_html(&device.brand),
            escape_html(&device.model),
            escape_html(&or_placeholder(device.serial_number.as_deref())),
            escape_html(&or_placeholder(device.software_version.as_deref())),
            action
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Day-by-day error codes with the per-day chart
pub fn render_error_codes(report: &ErrorCodeReport, show_legend: bool) -> String {
    if report.days.is_empty() {
        return format!(
            "<div class='text-center py-12 text-gray-500'><p>No error codes recorded for {}</p></div>",
            report.period.description()
        );
    }

    let mut days = String::new();
    for day in &report.days {
        let codes: String = day
            .codes
            .iter()
            .map(|c| {
                let title = c.description.as_deref().map(escape_html).unwrap_or_default();
                let tone = if c.code == medserv_core::error_codes::NO_ERROR_LABEL {
                    "bg-green-50 text-green-700"
                } else {
                    "bg-red-50 text-red-700"
                };
                format!(
                    "<span title='{}' class='inline-block px-2 py-0.5 mr-1 mb-1 rounded {}'>{}</span>",
                    title,
                    tone,
                    escape_html(&c.code)
                )
            })
            .collect();
        days.push_str(&format!(
            "<div class='flex gap-4 py-2 border-b'><span class='w-28 text-gray-500'>{}</span><span class='w-10 text-right font-medium'>{}</span><div class='flex-1'>{}</div></div>",
            day.date, day.count, codes
        ));
    }

    let top: String = report
        .top_codes
        .iter()
        .map(|c| {
            format!(
                "<div class='flex justify-between py-1 border-b'><span>{}</span><span class='font-medium'>{}</span></div>",
                escape_html(&c.code),
                c.count
            )
        })
        .collect();

    format!(
        r#"<div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='lg:col-span-2 bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>{} entries in {}</h3>
                {}
                <div class='mt-6'>{}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Most frequent</h3>
                {}
            </div>
        </div>"#,
        report.total_entries,
        report.period.description(),
        render_bar_chart(&medserv_core::error_codes::error_code_chart(&report.days), show_legend),
        days,
        top
    )
}

/// Year and month selectors that reload the error-code list
fn period_selector(device_id: &str, period: MonthFilter) -> String {
    let selected_year = period.year;
    let selected_month = period.month;

    let years: String = (selected_year - 5..=selected_year + 1)
        .rev()
        .map(|y| {
            format!(
                "<option value='{}' {}>{}</option>",
                y,
                if y == selected_year { "selected" } else { "" },
                y
            )
        })
        .collect();

    let mut months = format!(
        "<option value='all' {}>Whole year</option>",
        if selected_month.is_none() { "selected" } else { "" }
    );
    for (i, label) in MONTH_LABELS.iter().enumerate() {
        let m = i as u32 + 1;
        months.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            m,
            if selected_month == Some(m) { "selected" } else { "" },
            label
        ));
    }

    format!(
        r#"<form class='flex items-center gap-3 mb-4 p-3 bg-white rounded-lg border shadow-sm'
              hx-get='/devices/{id}/error-codes/list' hx-target='#error-codes' hx-trigger='change'>
            <span class='text-sm font-medium text-gray-600'>Period:</span>
            <select name='year' class='px-2 py-1.5 text-sm border rounded-lg bg-white'>{years}</select>
            <select name='month' class='px-2 py-1.5 text-sm border rounded-lg bg-white'>{months}</select>
            <span class='htmx-indicator text-sm text-gray-400'>Loading...</span>
        </form>"#,
        id = escape_html(device_id),
        years = years,
        months = months,
    )
}

async fn devices_content(state: &AppState, permissions: &PermissionSet) -> ApiResult<String> {
    let devices = state
        .dashboard
        .devices()
        .await
        .map_err(|e| state.fail(e, "devices", "/devices"))?;
    Ok(format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Medical devices</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>"#,
        render_device_list(&devices, permissions)
    ))
}

pub async fn page_devices(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let permissions = state.dashboard.permissions().await;
    let content = devices_content(&state, &permissions).await;
    page_result(&headers, "Devices", "/devices", &permissions, content)
}

pub async fn page_device_error_codes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let permissions = state.dashboard.permissions().await;
    let path = format!("/devices/{}/error-codes", id);
    let content = load_error_codes(&state, &id, &query, &path).await.map(|report| {
        format!(
            r#"<div class='mb-6'><a href='/devices' class='text-sm text-gray-500 hover:underline'>Devices</a><h2 class='text-2xl font-bold'>Error codes</h2></div>
        {}
        <div id='error-codes'>{}</div>"#,
            period_selector(&id, report.period),
            render_error_codes(&report, state.config().charts.show_legend)
        )
    });

    page_result(&headers, "Error codes", "/devices", &permissions, content)
}

/// Error-code list fragment for the period selector
pub async fn htmx_device_error_codes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = format!("/devices/{}/error-codes/list", id);
    match load_error_codes(&state, &id, &query, &path).await {
        Ok(report) => Html(render_error_codes(&report, state.config().charts.show_legend)).into_response(),
        Err(error) => (error.status(), Html(error.panel())).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, router, source};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_error_codes_page() {
        let (status, body) = get(router(source()), "/devices/1/error-codes?year=2024&month=3", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("3 entries in 2024-03"));
        assert!(body.contains(">No Error</span>"));
        assert!(body.contains(">E12</span>"));
        assert!(body.contains("<option value='3' selected>"));
    }

    #[tokio::test]
    async fn test_error_codes_fragment() {
        let (status, body) = get(router(source()), "/devices/1/error-codes/list?year=2024&month=4", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No error codes recorded for 2024-04"));
        assert!(!body.contains("<aside"));
    }

    #[tokio::test]
    async fn test_error_codes_fragment_upstream_down() {
        let (status, body) =
            get(router(source().with_unavailable("error_codes")), "/devices/1/error-codes/list?year=2024", true).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("error-panel"));
    }

    #[tokio::test]
    async fn test_device_list_page() {
        let (status, body) = get(router(source()), "/devices", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("SV300"));
        assert!(body.contains("href='/devices/2/error-codes'"));
    }
}
