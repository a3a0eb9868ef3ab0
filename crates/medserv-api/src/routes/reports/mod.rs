//! Report routes - list, serviced devices and print view
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_reports, api_report_devices, api_report_print};

pub use page::{page_reports, page_report_detail, page_report_print};
