//! Notification page rendering

use crate::{page_result, today, ApiResult, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use medserv_core::{AlertStatus, Permission, PermissionSet, ServiceAlert};
use medserv_utils::escape_html;

pub fn render_alerts(alerts: &[ServiceAlert], permissions: &PermissionSet) -> String {
    if alerts.is_empty() {
        return "<div class='text-center py-12 text-gray-500'><p>All devices are within their service interval</p></div>".to_string();
    }

    let mut html = String::from("<div class='space-y-2'>");
    for alert in alerts {
        let (badge, text) = match alert.status {
            AlertStatus::Overdue => (
                "bg-red-100 text-red-700",
                format!("{} days overdue", alert.days_overdue),
            ),
            AlertStatus::DueSoon if alert.days_overdue == 0 => ("bg-yellow-100 text-yellow-700", "due today".to_string()),
            AlertStatus::DueSoon => (
                "bg-yellow-100 text-yellow-700",
                format!("due in {} days", -alert.days_overdue),
            ),
        };
        let last_report = if permissions.can(Permission::ReportView) {
            format!(
                "<a href='/reports/{}' class='text-indigo-600 hover:underline'>{}</a>",
                alert.report_id, alert.last_service
            )
        } else {
            alert.last_service.to_string()
        };

        html.push_str(&format!(
            r#"<div class='flex items-center justify-between p-3 border rounded-lg'>
                <div><p class='font-medium'>{}</p><p class='text-sm text-gray-500'>Last service {} / due {}</p></div>
                <span class='px-2 py-1 text-xs rounded-full {}'>{}</span>
            </div>"#,
            escape_html(&alert.device.display_name()),
            last_report,
            alert.due_date,
            badge,
            text
        ));
    }
    html.push_str("</div>");
    html
}

/// Overdue count shown next to the bell; empty when nothing is overdue
pub fn render_bell_badge(overdue: usize) -> String {
    if overdue == 0 {
        return "<span id='bell-badge'></span>".to_string();
    }
    format!(
        "<span id='bell-badge' class='ml-auto px-2 py-0.5 text-xs rounded-full bg-red-600 text-white'>{}</span>",
        overdue
    )
}

async fn notifications_content(state: &AppState, permissions: &PermissionSet) -> ApiResult<String> {
    let alerts = state
        .dashboard
        .service_alerts(today())
        .await
        .map_err(|e| state.fail(e, "service_alerts", "/notifications"))?;
    let overdue = medserv_core::alerts::overdue_count(&alerts);

    Ok(format!(
        r#"<div class='mb-6 flex items-center gap-3'><h2 class='text-2xl font-bold'>Notifications</h2><span class='px-2 py-0.5 text-sm rounded-full bg-red-600 text-white'>{}</span></div>
        <div class='bg-white rounded-xl shadow-sm p-6'>{}</div>"#,
        overdue,
        render_alerts(&alerts, permissions)
    ))
}

pub async fn page_notifications(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let permissions = state.dashboard.permissions().await;
    let content = notifications_content(&state, &permissions).await;
    page_result(&headers, "Notifications", "/notifications", &permissions, content)
}

/// Bell badge fragment loaded by the navigation sidebar
///
/// Failures leave the badge empty; the notifications page reports them.
pub async fn htmx_notification_badge(State(state): State<AppState>) -> Response {
    let permissions = state.dashboard.permissions().await;
    if !permissions.can(Permission::NotificationView) {
        return Html(render_bell_badge(0)).into_response();
    }

    let overdue = match state.dashboard.service_alerts(today()).await {
        Ok(alerts) => medserv_core::alerts::overdue_count(&alerts),
        Err(e) => {
            state.fail(e, "service_alerts", "/notifications/badge");
            0
        }
    };
    Html(render_bell_badge(overdue)).into_response()
}
