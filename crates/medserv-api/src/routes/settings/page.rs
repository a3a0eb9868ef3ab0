//! Settings page rendering - Full page endpoints

use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use medserv_utils::escape_html;

pub async fn page_settings(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let permissions = state.dashboard.permissions().await;
    let config = state.config();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Server</h3>
            <div class='grid grid-cols-2 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Host</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Port</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Data source</h3>
            <div><p class='text-sm text-gray-500'>Snapshot directory</p><p class='font-medium'>{}</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Service notifications</h3>
            <div class='grid grid-cols-3 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Service interval</p><p class='font-medium'>{} days</p></div>
                <div><p class='text-sm text-gray-500'>Warning window</p><p class='font-medium'>{} days</p></div>
                <div><p class='text-sm text-gray-500'>Max alerts</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Display</h3>
            <div class='grid grid-cols-3 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Reports per page</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Top error codes</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Print header</p><p class='font-medium'>{}</p></div>
            </div>
        </div>"#,
        escape_html(&config.server.host),
        config.server.port,
        escape_html(&config.source.path.display().to_string()),
        config.notifications.service_interval_days,
        config.notifications.warning_days,
        config.notifications.max_alerts,
        config.pagination.records_per_page,
        config.charts.top_codes,
        escape_html(&config.print.organization)
    );

    Html(crate::page_response(&headers, "Settings", "/settings", &permissions, &inner_content))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, router, source};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_settings_page() {
        let (status, body) = get(router(source()), "/settings", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("365 days"));
        assert!(body.contains("Field Service"));
    }
}
