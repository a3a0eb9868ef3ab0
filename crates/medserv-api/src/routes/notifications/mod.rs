//! Notification routes - overdue-service alerts

pub mod api;
pub mod page;

pub use api::api_notifications;
pub use page::{htmx_notification_badge, page_notifications};
