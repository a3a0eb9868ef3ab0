//! Route modules for the API server
//!
//! - reports: Report list, serviced devices, print view
//! - devices: Device list, error codes per day
//! - notifications: Overdue-service alerts
//! - settings: Settings page
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering

pub mod devices;
pub mod notifications;
pub mod reports;
pub mod settings;
