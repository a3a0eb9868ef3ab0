//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::reports: Report list, detail with serviced devices, print view
//! - routes::devices: Device list and error codes per day
//! - routes::notifications: Service alerts
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use medserv_config::Config;
use medserv_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use medserv_core::{ChartData, CoreError, Dashboard, Permission, PermissionSet};
use medserv_source::{EntityId, SourceRef};
use medserv_utils::{escape_html, format_number};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub error_logger: Arc<dyn ErrorLogger>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            error_logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn config(&self) -> &Config {
        self.dashboard.config()
    }

    /// Log a failed dashboard call and turn it into a response error
    pub fn fail(&self, error: CoreError, operation: &str, path: &str) -> ApiError {
        let context = ErrorContext::new(operation).with_request_path(path);
        self.error_logger.log_error(&error, &context);
        ApiError::from(error)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::devices::{api_device_error_codes, api_device_error_code_chart, page_devices, page_device_error_codes, htmx_device_error_codes};
    use routes::notifications::{api_notifications, htmx_notification_badge, page_notifications};
    use routes::reports::{api_reports, api_report_devices, api_report_print, page_reports, page_report_detail, page_report_print};
    use routes::settings::{api_settings, page_settings};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/reports", get(api_reports))
        .route("/api/reports/:id/devices", get(api_report_devices))
        .route("/api/reports/:id/print", get(api_report_print))
        .route("/api/devices/:id/error-codes", get(api_device_error_codes))
        .route("/api/devices/:id/error-codes/chart", get(api_device_error_code_chart))
        .route("/api/notifications", get(api_notifications))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(index_page))
        .route("/dashboard", get(page_dashboard))
        .route("/reports", get(page_reports))
        .route("/reports/:id", get(page_report_detail))
        .route("/reports/:id/print", get(page_report_print))
        .route("/devices", get(page_devices))
        .route("/devices/:id/error-codes", get(page_device_error_codes))
        .route("/notifications", get(page_notifications))
        .route("/settings", get(page_settings))
        // HTMX partial routes
        .route("/devices/:id/error-codes/list", get(htmx_device_error_codes))
        .route("/notifications/badge", get(htmx_notification_badge))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Request Helpers ====================

/// Parse a numeric id from a path segment
pub fn parse_id(raw: &str) -> ApiResult<EntityId> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid id: {}", raw)))
}

/// Current local date, used for alerts and default filters
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Field Service</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar, showing only the sections the user may see
pub fn nav_sidebar(current_path: &str, permissions: &PermissionSet) -> String {
    let links = [
        ("/", "Dashboard", "dashboard", None),
        ("/reports", "Reports", "reports", Some(Permission::ReportView)),
        ("/devices", "Devices", "devices", Some(Permission::DeviceView)),
        ("/notifications", "Notifications", "notifications", Some(Permission::NotificationView)),
        ("/settings", "Settings", "settings", Some(Permission::SettingsView)),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Field Service</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id, required) in &links {
        if let Some(permission) = required {
            if !permissions.can(*permission) {
                continue;
            }
        }
        let is_active = if *path == "/" {
            current_path == "/" || current_path == "/dashboard"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "📊",
            "reports" => "📋",
            "devices" => "🩺",
            "notifications" => "🔔",
            "settings" => "⚙️",
            _ => "📄",
        };
        // overdue count is filled in after the page loads
        let badge = if *id == "notifications" {
            "<span hx-get='/notifications/badge' hx-trigger='load' hx-swap='outerHTML'></span>"
        } else {
            ""
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span>{}</a></li>"#,
            path, active_class, icon, label, badge
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &HeaderMap,
    title: &str,
    current_path: &str,
    permissions: &PermissionSet,
    inner_content: &str,
) -> String {
    if is_htmx_request(headers) {
        format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path, permissions), inner_content))
    }
}

/// Render page content, or the error panel with the matching status
pub fn page_result(
    headers: &HeaderMap,
    title: &str,
    current_path: &str,
    permissions: &PermissionSet,
    content: ApiResult<String>,
) -> Response {
    match content {
        Ok(inner) => Html(page_response(headers, title, current_path, permissions, &inner)).into_response(),
        Err(error) => (
            error.status(),
            Html(page_response(headers, title, current_path, permissions, &error.panel())),
        )
            .into_response(),
    }
}

/// Horizontal bar chart rendered with plain divs
pub fn render_bar_chart(chart: &ChartData, show_legend: bool) -> String {
    let Some(dataset) = chart.datasets.first() else {
        return String::new();
    };
    if chart.labels.is_empty() {
        return "<p class='text-gray-500 text-center py-6'>No data</p>".to_string();
    }

    let max = chart.max_value();
    let color = dataset.background_color.as_deref().unwrap_or("#818cf8");
    let mut html = format!("<div class='space-y-1'><h4 class='text-sm font-medium text-gray-600 mb-2'>{}</h4>", escape_html(&chart.title));

    for (label, value) in chart.labels.iter().zip(dataset.data.iter()) {
        let width = if max > 0.0 { value / max * 100.0 } else { 0.0 };
        html.push_str(&format!(
            r#"<div class='flex items-center gap-2 text-sm'>
                <span class='w-24 text-gray-500'>{}</span>
                <div class='flex-1 bg-gray-100 rounded h-4'><div class='h-4 rounded' style='width: {:.1}%; background-color: {}'></div></div>
                <span class='w-10 text-right font-medium'>{}</span>
            </div>"#,
            escape_html(label),
            width,
            color,
            format_number(*value as i64)
        ));
    }

    if show_legend {
        html.push_str(&format!(
            "<div class='flex items-center gap-2 mt-2 text-xs text-gray-500'><span class='inline-block w-3 h-3 rounded' style='background-color: {}'></span>{}</div>",
            color,
            escape_html(&dataset.label)
        ));
    }
    html.push_str("</div>");
    html
}

// ==================== Dashboard Page ====================

/// Index page with the service overview
async fn index_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let permissions = state.dashboard.permissions().await;
    let content = state
        .dashboard
        .overview(today())
        .await
        .map_err(|e| state.fail(e, "overview", "/"))
        .map(|overview| {
            let recent: String = overview
                .recent_reports
                .iter()
                .map(|r| {
                    format!(
                        "<div class='flex justify-between py-2 border-b'><a href='/reports/{}' class='text-indigo-600 hover:underline'>{}</a><span class='text-gray-500'>{}</span><span>{}</span></div>",
                        r.id,
                        escape_html(&r.report_number),
                        r.service_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                        escape_html(&r.health_facility)
                    )
                })
                .collect();

            format!(
                r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Dashboard</h2></div>
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Reports</p><p class='text-2xl font-bold text-blue-700'>{}</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Medical devices</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Overdue service</p><p class='text-2xl font-bold text-red-700'>{}</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Due soon</p><p class='text-2xl font-bold text-yellow-700'>{}</p></div>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Recent reports</h3>
                <div class='space-y-1'>{}</div>
            </div>
        </div>"#,
                format_number(overview.total_reports),
                format_number(overview.total_devices),
                overview.overdue_devices,
                overview.due_soon_devices,
                render_bar_chart(&overview.reports_per_month, state.config().charts.show_legend),
                recent
            )
        });

    page_result(&headers, "Dashboard", "/dashboard", &permissions, content)
}

/// Dashboard page (alias for index)
async fn page_dashboard(state: State<AppState>, headers: HeaderMap) -> Response {
    index_page(state, headers).await
}

/// Start the HTTP server
pub async fn start_server(config: Config, source: SourceRef) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(Dashboard::new(config, source));

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting field-service dashboard on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /reports (Service reports)");
    log::info!("  - /devices (Medical devices and error codes)");
    log::info!("  - /notifications (Service alerts)");
    log::info!("  - /settings (Configuration)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use medserv_source::{
        ErrorCodeRecord, MedicalDevice, MemorySource, RawErrorCodeEntry, Report, ReportDeviceItem, TypeOfWork,
    };
    use tower::ServiceExt;

    pub fn source() -> MemorySource {
        let device = |id: EntityId, model: &str| MedicalDevice {
            id,
            brand: "Mindray".to_string(),
            model: model.to_string(),
            serial_number: Some(format!("SN-{}", id)),
            software_version: None,
            health_facility_id: None,
        };
        let entry = |code: &str, date: &str| {
            RawErrorCodeEntry::Record(ErrorCodeRecord {
                error_code: Some(code.to_string()),
                date: Some(date.to_string()),
                medical_device_id: Some(1),
                ..ErrorCodeRecord::default()
            })
        };

        MemorySource {
            reports: vec![Report {
                id: 1,
                report_number: Some("R-0001".to_string()),
                service_date: Some("2024-03-05".to_string()),
                created_at: None,
                health_facility: None,
                employee: None,
                description: Some("Annual <maintenance>".to_string()),
                report_device_item: vec![
                    ReportDeviceItem::new(1, 10),
                    ReportDeviceItem::new(2, 10),
                    ReportDeviceItem::new(1, 11),
                ],
            }],
            devices: vec![device(1, "BeneView T5"), device(2, "SV300")],
            work_types: vec![
                TypeOfWork { id: 10, name: "Cleaning".to_string() },
                TypeOfWork { id: 11, name: "Calibration".to_string() },
            ],
            error_codes: vec![entry("-", "2024-03-01"), entry("E12", "2024-03-01"), entry("E07", "2024-03-04")],
            permissions: vec!["*".to_string()],
            ..MemorySource::default()
        }
    }

    pub fn router(source: MemorySource) -> Router {
        create_router(AppState::new(Dashboard::new(Config::default(), Arc::new(source))))
    }

    pub async fn get(router: Router, uri: &str, htmx: bool) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if htmx {
            request = request.header("hx-request", "true");
        }
        let response = router.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
