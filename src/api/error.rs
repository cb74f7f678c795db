//! Error type for remote API calls.
//!
//! Three failure classes reach callers: the transport failed, the server
//! answered with a non-success status, or a success response carried a body
//! this client could not use.

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message:?}")]
    Status {
        status: StatusCode,
        /// Message extracted from the response body, if the server sent one
        message: Option<String>,
    },

    #[error("unexpected response payload: {0}")]
    Payload(String),
}

/// Error body shape the API uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Build a `Status` error, pulling the `message` field out of the body
    /// when the server sent a JSON error object.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.message);
        ApiError::Status { status, message }
    }

    /// User-facing message: the server's own message when present, otherwise
    /// the caller's generic fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_extracted_from_json_body() {
        let err = ApiError::from_status(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"message": "Database unavailable"}"#,
        );
        assert_eq!(err.user_message("Failed to load data"), "Database unavailable");
    }

    #[test]
    fn test_non_json_body_falls_back() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>502</html>");
        assert_eq!(err.user_message("Failed to load data"), "Failed to load data");
    }

    #[test]
    fn test_payload_error_uses_fallback() {
        let err = ApiError::Payload("missing visitor".to_string());
        assert_eq!(err.user_message("fallback"), "fallback");
    }
}
