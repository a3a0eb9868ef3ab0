//! Error types for medserv-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medserv_core::error::{ErrorCode, ErrorDetails};
use medserv_core::CoreError;
use medserv_utils::escape_html;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    /// HTTP status for this error; upstream failures map to 502
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(error) => match error {
                CoreError::ReportNotFound { .. } | CoreError::DeviceNotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
                CoreError::SourceUnavailable { .. } | CoreError::InvalidFormat { .. } => StatusCode::BAD_GATEWAY,
                CoreError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::InvalidQuery, self.to_string()),
            ApiError::Core(error) => error.to_details(),
        }
    }

    /// Error panel shown in place of the page content
    pub fn panel(&self) -> String {
        let details = self.to_details();
        let (title, tone) = if self.status() == StatusCode::BAD_GATEWAY {
            ("Field-service API unavailable", "red")
        } else if self.status() == StatusCode::NOT_FOUND {
            ("Not found", "yellow")
        } else {
            ("Request failed", "red")
        };

        let suggestions: String = details
            .suggestions
            .iter()
            .map(|s| format!("<li>{}</li>", escape_html(s)))
            .collect();

        format!(
            r#"<div class='bg-{tone}-50 border border-{tone}-200 rounded-xl p-6' id='error-panel'>
            <h3 class='text-lg font-semibold text-{tone}-700 mb-2'>{}</h3>
            <p class='text-sm text-{tone}-600 mb-2'>{}</p>
            <p class='text-xs text-gray-500 mb-2'>{}</p>
            <ul class='list-disc list-inside text-sm text-gray-600'>{}</ul>
        </div>"#,
            title,
            escape_html(&details.message),
            details.code,
            suggestions,
            tone = tone,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_details())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unavailable = ApiError::from(CoreError::SourceUnavailable { message: "refused".to_string() });
        assert_eq!(unavailable.status(), StatusCode::BAD_GATEWAY);

        let missing = ApiError::from(CoreError::ReportNotFound { id: "9".to_string() });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        assert_eq!(ApiError::bad_request("month").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_panel_escapes_message() {
        let error = ApiError::from(CoreError::InvalidFormat { message: "<array>".to_string() });
        let panel = error.panel();
        assert!(panel.contains("&lt;array&gt;"));
        assert!(panel.contains("INVALID_FORMAT"));
    }
}
