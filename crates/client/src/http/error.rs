//! Failure mapping for backend requests.

use reqwest::StatusCode;
use thiserror::Error;

/// Longest response body excerpt kept in an error message.
const MAX_BODY_EXCERPT: usize = 200;

/// A failed request to the backend.
///
/// `Display` yields the single human-readable message shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the token is missing, expired or rejected.
    #[error("Unauthorized. Please log in again.")]
    Unauthorized,

    /// 403: the user may not perform this action.
    #[error("You do not have permission to perform this action.")]
    Forbidden,

    /// 404: the requested resource does not exist.
    #[error("The requested resource was not found.")]
    NotFound,

    /// 5xx: the backend failed.
    #[error("Server error. Please try again later.")]
    Server(StatusCode),

    /// Any other non-success status.
    #[error("Status code: {}, Message: {message}", .status.as_u16())]
    Status { status: StatusCode, message: String },

    /// The request never produced a response.
    #[error("Error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Error: unexpected response from server: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Error: invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            s if s.is_server_error() => Self::Server(s),
            s => Self::Status {
                status: s,
                message: status_message(s, body),
            },
        }
    }

    /// HTTP status of the response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden => Some(StatusCode::FORBIDDEN),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::Server(status) | Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Parse(_) | Self::Url(_) => None,
        }
    }

    /// Whether the failure is on the backend or in the connection to it.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Transport(_) | Self::Parse(_))
    }
}

/// Log a failure and hand it back for propagation.
///
/// Every request failure goes through here exactly once.
pub fn map_error(error: impl Into<ApiError>) -> ApiError {
    let error = error.into();
    tracing::error!(
        status = ?error.status().map(|s| s.as_u16()),
        error = %error,
        "API request failed"
    );
    error
}

/// Message for statuses without a dedicated text.
///
/// Backend error bodies are either a bare string or JSON with a `message`
/// field; fall back to the canonical reason phrase when the body is empty.
fn status_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    if message.is_empty() {
        return status.canonical_reason().unwrap_or("Unknown error").to_string();
    }

    message.chars().take(MAX_BODY_EXCERPT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dedicated_status_messages() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "").to_string(),
            "Unauthorized. Please log in again."
        );
        assert_eq!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope").to_string(),
            "You do not have permission to perform this action."
        );
        assert_eq!(
            ApiError::from_status(StatusCode::NOT_FOUND, "").to_string(),
            "The requested resource was not found."
        );
    }

    #[test]
    fn test_server_errors() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = ApiError::from_status(status, "stack trace");
            assert_eq!(err.to_string(), "Server error. Please try again later.");
            assert!(err.is_server_side());
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_other_status_uses_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "Password does not match");
        assert_eq!(
            err.to_string(),
            "Status code: 400, Message: Password does not match"
        );
        assert!(!err.is_server_side());
    }

    #[test]
    fn test_other_status_reads_json_message() {
        let err = ApiError::from_status(
            StatusCode::CONFLICT,
            r#"{"message":"Phone number already exists","status":"CONFLICT"}"#,
        );
        assert_eq!(
            err.to_string(),
            "Status code: 409, Message: Phone number already exists"
        );
    }

    #[test]
    fn test_other_status_empty_body_uses_reason() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "  ");
        assert_eq!(
            err.to_string(),
            "Status code: 429, Message: Too Many Requests"
        );
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(1000);
        let ApiError::Status { message, .. } = ApiError::from_status(StatusCode::BAD_REQUEST, &body)
        else {
            panic!("expected Status variant");
        };
        assert_eq!(message.len(), MAX_BODY_EXCERPT);
    }

    #[test]
    fn test_parse_error_is_prefixed() {
        let err = map_error(serde_json::from_str::<u32>("oops").unwrap_err());
        assert!(err.to_string().starts_with("Error: "));
        assert_eq!(err.status(), None);
    }
}
