//! Error types for medserv-core
//!
//! The aggregators themselves never fail on incomplete data; these errors
//! cover fetch failures, contract violations and invalid requests.

use medserv_source::SourceError;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The external API could not be reached or returned an error
    SourceUnavailable,
    /// Report not found
    ReportNotFound,
    /// Medical device not found
    DeviceNotFound,
    /// Payload did not have the expected shape
    InvalidFormat,
    /// Request parameters out of range
    InvalidQuery,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::SourceUnavailable => write!(f, "SOURCE_UNAVAILABLE"),
            ErrorCode::ReportNotFound => write!(f, "REPORT_NOT_FOUND"),
            ErrorCode::DeviceNotFound => write!(f, "DEVICE_NOT_FOUND"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::InvalidQuery => write!(f, "INVALID_QUERY"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for medserv-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Data source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Report not found: {id}")]
    ReportNotFound { id: String },

    #[error("Medical device not found: {id}")]
    DeviceNotFound { id: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::SourceUnavailable { .. } => ErrorCode::SourceUnavailable,
            CoreError::ReportNotFound { .. } => ErrorCode::ReportNotFound,
            CoreError::DeviceNotFound { .. } => ErrorCode::DeviceNotFound,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::InvalidQuery { .. } => ErrorCode::InvalidQuery,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::SourceUnavailable { .. } => ErrorSeverity::Error,
            CoreError::ReportNotFound { .. } => ErrorSeverity::Info,
            CoreError::DeviceNotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::InvalidQuery { .. } => ErrorSeverity::Warning,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::SourceUnavailable { .. } => {
                details = details.with_suggestion(
                    "Check that the field-service API snapshot directory is reachable.".to_string()
                );
                details = details.with_suggestion(
                    "Reload the page once the API is back.".to_string()
                );
            }
            CoreError::ReportNotFound { id } => {
                details = details.with_suggestion(format!(
                    "Check if report '{}' still exists.", id
                ));
                details = details.with_suggestion(
                    "Use the /reports page to list all reports.".to_string()
                );
            }
            CoreError::DeviceNotFound { .. } => {
                details = details.with_suggestion(
                    "Use the /devices page to list all medical devices.".to_string()
                );
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "format_message": message }));
            }
            CoreError::InvalidQuery { message } => {
                details = details.with_detail(serde_json::json!({ "query_message": message }));
            }
            CoreError::InternalError { .. } => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<SourceError> for CoreError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::NotFound { ref resource, ref id } if resource == "report" => {
                CoreError::ReportNotFound { id: id.clone() }
            }
            SourceError::InvalidFormat { .. } | SourceError::Decode { .. } => {
                CoreError::InvalidFormat { message: error.to_string() }
            }
            other => CoreError::SourceUnavailable { message: other.to_string() },
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Request path, when raised while serving HTTP
    pub request_path: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_path: None,
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_request_path(mut self, path: impl Into<String>) -> Self {
        self.request_path = Some(path.into());
        self
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info => log::info!(
                target: "medserv::error",
                "[{}] {} - Operation: {} - Path: {:?}",
                error.code(),
                error,
                context.operation,
                context.request_path
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "medserv::error",
                "[{}] {} - Operation: {} - Path: {:?}",
                error.code(),
                error,
                context.operation,
                context.request_path
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "medserv::error",
                "[{}] {} - Operation: {} - Path: {:?} - Data: {}",
                error.code(),
                error.to_details(),
                context.operation,
                context.request_path,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "medserv::error",
            "WARNING: {} - Operation: {} - Path: {:?}",
            message,
            context.operation,
            context.request_path
        );
    }
}

// ==================== Tests ====================
