//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pitcs_core::CoreError;
use pitcs_mailer::MailerError;
use serde_json::json;

/// Errors that can occur during gateway request handling.
///
/// Every variant renders as `{"success": false, "message": …, "error": …}`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The mail relay did not accept the inquiry.
    #[error(transparent)]
    Relay(#[from] MailerError),

    /// The inquiry failed strict validation.
    #[error(transparent)]
    InvalidInquiry(CoreError),

    /// The request body is not a JSON inquiry.
    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    /// The request origin is outside the allow-list under strict policy.
    #[error("origin '{0}' is not allowed")]
    OriginRejected(String),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidInquiry(_) | GatewayError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::OriginRejected(_) => StatusCode::FORBIDDEN,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            GatewayError::Relay(_) => "Email sending failed",
            GatewayError::InvalidInquiry(_) => "Invalid inquiry",
            GatewayError::InvalidRequest(_) => "Invalid request body",
            GatewayError::OriginRejected(_) => "Origin not allowed",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": self.summary(),
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
