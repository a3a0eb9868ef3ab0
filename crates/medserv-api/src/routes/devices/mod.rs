//! Device routes - device list and error codes per day

pub mod api;
pub mod page;

pub use api::{api_device_error_codes, api_device_error_code_chart};
pub use page::{page_devices, page_device_error_codes, htmx_device_error_codes};
