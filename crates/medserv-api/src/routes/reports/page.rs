//! Report page rendering - Full page endpoints

use crate::{page_result, parse_id, ApiResult, AppState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use medserv_core::time::day_key;
use medserv_core::{Permission, PermissionSet, PrintableReport, ReportDetail, ReportsPage};
use medserv_utils::{escape_html, format_number, or_placeholder};
use std::collections::HashMap;

use super::api::parse_page;

pub fn render_reports_table(page: &ReportsPage) -> String {
    if page.reports.is_empty() {
        return "<div class='text-center py-12 text-gray-500'><p>No reports</p></div>".to_string();
    }

    let mut html = String::from(r#"<div class='overflow-x-auto'><table class='w-full text-sm'><thead class='bg-gray-50'><tr>
        <th class='px-4 py-2 text-left'>Report</th>
        <th class='px-4 py-2 text-left'>Service date</th>
        <th class='px-4 py-2 text-left'>Health facility</th>
        <th class='px-4 py-2 text-left'>Technician</th>
        <th class='px-4 py-2 text-right'>Devices</th>
        <th class='px-4 py-2 text-right'>Work items</th>
    </tr></thead><tbody>"#);

    for report in &page.reports {
        html.push_str(&format!(
            r#"<tr class='border-b hover:bg-gray-50'>
                <td class='px-4 py-2'><a href='/reports/{}' class='text-indigo-600 hover:underline'>{}</a></td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
            </tr>"#,
            report.id,
            escape_html(&report.report_number),
            report.service_date.map(|d| d.to_string()).unwrap_or_else(|| or_placeholder(None)),
            escape_html(&report.health_facility),
            escape_html(&report.technician),
            report.device_count,
            report.work_item_count
        ));
    }
    html.push_str("</tbody></table></div>");

    html.push_str(&format!(
        "<div class='flex justify-between items-center mt-4 text-sm text-gray-500'><span>{} reports, page {} of {}</span><div class='flex gap-2'>",
        format_number(page.total_count),
        page.page,
        page.total_pages().max(1)
    ));
    if page.page > 1 {
        html.push_str(&format!(
            "<button hx-get='/reports?page={}' hx-target='main' hx-push-url='true' class='px-3 py-1 border rounded-lg hover:bg-gray-50'>Previous</button>",
            page.page - 1
        ));
    }
    if page.has_next() {
        html.push_str(&format!(
            "<button hx-get='/reports?page={}' hx-target='main' hx-push-url='true' class='px-3 py-1 border rounded-lg hover:bg-gray-50'>Next</button>",
            page.page + 1
        ));
    }
    html.push_str("</div></div>");
    html
}

/// Report header and the grouped serviced-devices table
pub fn render_report_detail(detail: &ReportDetail, permissions: &PermissionSet) -> String {
    let report = &detail.report;
    let number = medserv_core::print::report_number(report);

    let print_button = if permissions.can(Permission::ReportPrint) {
        format!(
            "<a href='/reports/{}/print' target='_blank' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Print</a>",
            report.id
        )
    } else {
        String::new()
    };

    let mut rows = String::new();
    for group in &detail.devices {
        let device = &group.device;
        let model = if permissions.can(Permission::ErrorCodeView) {
            format!(
                "<a href='/devices/{}/error-codes' class='text-indigo-600 hover:underline'>{}</a>",
                device.id,
                escape_html(&device.model)
            )
        } else {
            escape_html(&device.model)
        };
        let work: String = group
            .work_types
            .iter()
            .map(|w| format!("<span class='inline-block px-2 py-0.5 mr-1 mb-1 rounded bg-gray-100 text-gray-700'>{}</span>", escape_html(&w.name)))
            .collect();

        rows.push_str(&format!(
            r#"<tr class='border-b align-top'>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2'>{}</td>
            </tr>"#,
            escape_html(&device.brand),
            model,
            escape_html(&or_placeholder(device.serial_number.as_deref())),
            escape_html(&or_placeholder(device.software_version.as_deref())),
            work
        ));
    }
    if detail.devices.is_empty() {
        rows.push_str("<tr><td colspan='5' class='px-4 py-6 text-center text-gray-500'>No serviced devices</td></tr>");
    }

    format!(
        r#"<div class='mb-6 flex justify-between items-center'>
            <div><a href='/reports' class='text-sm text-gray-500 hover:underline'>Reports</a><h2 class='text-2xl font-bold'>Report {}</h2></div>
            {}
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <div class='grid grid-cols-2 md:grid-cols-4 gap-4'>
                <div><p class='text-sm text-gray-500'>Service date</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Health facility</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Technician</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Work items</p><p class='font-medium'>{}</p></div>
            </div>
            <p class='mt-4 text-gray-700'>{}</p>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Serviced devices ({})</h3>
            <table class='w-full text-sm'><thead class='bg-gray-50'><tr>
                <th class='px-4 py-2 text-left'>Brand</th>
                <th class='px-4 py-2 text-left'>Model</th>
                <th class='px-4 py-2 text-left'>Serial number</th>
                <th class='px-4 py-2 text-left'>Software</th>
                <th class='px-4 py-2 text-left'>Work performed</th>
            </tr></thead><tbody>{}</tbody></table>
        </div>"#,
        escape_html(&number),
        print_button,
        report.raw_service_date().and_then(day_key).map(|d| d.to_string()).unwrap_or_else(|| or_placeholder(None)),
        escape_html(&or_placeholder(report.health_facility.as_ref().map(|f| f.name.as_str()))),
        escape_html(&or_placeholder(report.employee.as_ref().map(|e| e.full_name()).as_deref())),
        detail.work_item_count,
        escape_html(report.description.as_deref().unwrap_or("")),
        detail.devices.len(),
        rows
    )
}

/// Standalone print document
pub fn render_print_document(printable: &PrintableReport) -> String {
    let rows: String = printable
        .rows
        .iter()
        .map(|row| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.brand),
                escape_html(&row.model),
                escape_html(&row.serial_number),
                escape_html(&row.software_version),
                escape_html(&row.work_performed)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Report {number}</title>
    <style>
        body {{ font-family: sans-serif; margin: 2cm; color: #111; }}
        table {{ width: 100%; border-collapse: collapse; margin-top: 1em; }}
        th, td {{ border: 1px solid #999; padding: 4px 8px; text-align: left; font-size: 12px; }}
        .meta td {{ border: none; padding: 2px 8px 2px 0; }}
        @media print {{ .no-print {{ display: none; }} }}
    </style>
</head>
<body>
    <button class="no-print" onclick="window.print()">Print</button>
    <h1>{organization}</h1>
    <h2>Service report {number}</h2>
    <table class="meta">
        <tr><td>Service date</td><td>{date}</td></tr>
        <tr><td>Health facility</td><td>{facility}</td></tr>
        <tr><td>Technician</td><td>{technician}</td></tr>
        <tr><td>Description</td><td>{description}</td></tr>
    </table>
    <table>
        <thead><tr><th>Brand</th><th>Model</th><th>Serial number</th><th>Software</th><th>Work performed</th></tr></thead>
        <tbody>{rows}</tbody>
    </table>
    <p>{devices} devices, {items} work items</p>
    <footer>{footer}</footer>
</body>
</html>"#,
        number = escape_html(&printable.report_number),
        organization = escape_html(&printable.organization),
        date = escape_html(&printable.service_date),
        facility = escape_html(&printable.health_facility),
        technician = escape_html(&printable.technician),
        description = escape_html(&printable.description),
        rows = rows,
        devices = printable.device_count,
        items = printable.work_item_count,
        footer = escape_html(&printable.footer),
    )
}

async fn reports_content(state: &AppState, query: &HashMap<String, String>) -> ApiResult<String> {
    let page = parse_page(query)?;
    let reports = state
        .dashboard
        .reports_page(page)
        .await
        .map_err(|e| state.fail(e, "reports_page", "/reports"))?;
    Ok(format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Service reports</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>"#,
        render_reports_table(&reports)
    ))
}

pub async fn page_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let permissions = state.dashboard.permissions().await;
    let content = reports_content(&state, &query).await;
    page_result(&headers, "Reports", "/reports", &permissions, content)
}

async fn report_detail_content(state: &AppState, raw_id: &str, permissions: &PermissionSet) -> ApiResult<String> {
    let id = parse_id(raw_id)?;
    let detail = state
        .dashboard
        .report_detail(id)
        .await
        .map_err(|e| state.fail(e, "report_detail", &format!("/reports/{}", id)))?;
    Ok(render_report_detail(&detail, permissions))
}

pub async fn page_report_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let permissions = state.dashboard.permissions().await;
    let content = report_detail_content(&state, &id, &permissions).await;
    page_result(&headers, "Report", "/reports", &permissions, content)
}

async fn load_printable(state: &AppState, raw_id: &str) -> ApiResult<PrintableReport> {
    let id = parse_id(raw_id)?;
    state
        .dashboard
        .printable_report(id)
        .await
        .map_err(|e| state.fail(e, "printable_report", &format!("/reports/{}/print", id)))
}

pub async fn page_report_print(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    match load_printable(&state, &id).await {
        Ok(printable) => Html(render_print_document(&printable)).into_response(),
        Err(error) => {
            let permissions = state.dashboard.permissions().await;
            (
                error.status(),
                Html(crate::page_response(&headers, "Print", "/reports", &permissions, &error.panel())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, router, source};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_report_detail_page() {
        let (status, body) = get(router(source()), "/reports/1", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Serviced devices (2)"));
        assert!(body.contains("BeneView T5"));
        assert!(body.contains("href='/reports/1/print'"));
        assert!(body.contains("Annual &lt;maintenance&gt;"));
    }

    #[tokio::test]
    async fn test_print_button_hidden_without_permission() {
        let mut restricted = source();
        restricted.permissions = vec!["report.view".to_string()];

        let (status, body) = get(router(restricted), "/reports/1", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("/reports/1/print"));
        assert!(!body.contains("/devices/1/error-codes"));
    }

    #[tokio::test]
    async fn test_report_detail_unknown_report() {
        let (status, body) = get(router(source()), "/reports/77", false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("error-panel"));
    }

    #[tokio::test]
    async fn test_report_detail_incomplete_fetch_shows_no_partial_data() {
        let (status, body) = get(router(source().with_unavailable("types_of_work")), "/reports/1", false).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.contains("Serviced devices"));
    }

    #[tokio::test]
    async fn test_print_document() {
        let (status, body) = get(router(source()), "/reports/1/print", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Service report R-0001"));
        assert!(body.contains("<td>Cleaning, Calibration</td>"));
        assert!(body.contains("<td>SV300</td>"));
    }

    #[tokio::test]
    async fn test_reports_list_page() {
        let (status, body) = get(router(source()), "/reports", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href='/reports/1'"));
        assert!(body.contains("1 reports, page 1 of 1"));
    }
}
