//! Error types for the REST API client.
//!
//! `Display` of every variant is safe to show to a user: fixed messages for
//! well-known statuses, the backend's own message otherwise. Transport and
//! decoding details are only reachable through `source()`.

use atelier_core::{ApiResponse, ValidationError};
use thiserror::Error;

/// Longest backend message passed through to the user.
const MAX_BACKEND_MESSAGE_LEN: usize = 200;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by [`ApiClient`](super::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401.
    #[error("Authentication failed. Please sign in again.")]
    Unauthorized,

    /// 403.
    #[error("Access denied.")]
    Forbidden,

    /// 404.
    #[error("The requested resource was not found.")]
    NotFound,

    /// 429.
    #[error("Too many requests. Please try again later.")]
    RateLimited {
        /// Seconds from the `Retry-After` header, if sent.
        retry_after: Option<u64>,
    },

    /// Any 5xx.
    #[error("Server error. Please try again later.")]
    Server { status: u16 },

    /// The backend refused the request with a message of its own.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend refused the request without a usable message.
    #[error("Something went wrong. Please try again.")]
    Unexpected { status: u16 },

    /// The request never produced a response.
    #[error("Network error. Please check your connection.")]
    Network(#[source] reqwest::Error),

    /// The response could not be decoded into the expected type.
    #[error("Unexpected response from the server.")]
    Malformed(#[source] serde_json::Error),

    /// A draft failed validation; nothing was sent.
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// A local file needed for the request could not be read.
    ///
    /// `Display` names the file only; the full path stays in `path`.
    #[error("Could not read {name}.")]
    File {
        name: String,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client could not be initialized.")]
    Setup(#[source] reqwest::Error),
}

impl ApiError {
    /// Map a non-success status to an error, using `message` from the body
    /// only for statuses without a fixed message.
    #[must_use]
    pub fn from_status(status: u16, message: Option<&str>, retry_after: Option<u64>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited { retry_after },
            500.. => Self::Server { status },
            _ => Self::rejected(status, message),
        }
    }

    /// A rejection carrying the backend message when it is fit for display.
    #[must_use]
    pub fn rejected(status: u16, message: Option<&str>) -> Self {
        match message.and_then(displayable) {
            Some(message) => Self::Rejected {
                status,
                message: message.to_string(),
            },
            None => Self::Unexpected { status },
        }
    }

    /// HTTP status behind the error, when there was a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Server { status } | Self::Rejected { status, .. } | Self::Unexpected { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Backend messages that look like markup, stack traces or dumps are not
/// shown.
fn displayable(message: &str) -> Option<&str> {
    let message = message.trim();
    let looks_internal = message.is_empty()
        || message.len() > MAX_BACKEND_MESSAGE_LEN
        || message.contains('\n')
        || message.starts_with('<')
        || (message.contains(" at ") && (message.contains(".js:") || message.contains(".ts:")));
    (!looks_internal).then_some(message)
}

/// Flatten a result into the `{ success, data?, error? }` envelope.
pub trait IntoApiResponse<T> {
    fn into_response(self) -> ApiResponse<T>;
}

impl<T> IntoApiResponse<T> for ApiResult<T> {
    fn into_response(self) -> ApiResponse<T> {
        match self {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => ApiResponse::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages_ignore_backend_text() {
        let detail = Some("SequelizeDatabaseError: relation users does not exist");
        for status in [401, 403, 404, 429, 500, 502, 503] {
            let err = ApiError::from_status(status, detail, None);
            assert!(!err.to_string().contains("Sequelize"), "{status}");
            assert_eq!(err.status(), Some(status));
        }
        assert_eq!(
            ApiError::from_status(401, detail, None).to_string(),
            "Authentication failed. Please sign in again."
        );
        assert_eq!(ApiError::from_status(403, None, None).to_string(), "Access denied.");
    }

    #[test]
    fn test_other_statuses_pass_backend_message() {
        let err = ApiError::from_status(409, Some("  Slug already exists "), None);
        assert_eq!(err.to_string(), "Slug already exists");

        let err = ApiError::from_status(400, None, None);
        assert_eq!(err.to_string(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_internal_looking_messages_fall_back() {
        let oversized = "x".repeat(500);
        for message in [
            "<html><body>Bad Gateway</body></html>",
            "TypeError: x is undefined\n    at handler (/srv/app.js:10:3)",
            "Error at Object.<anonymous> (server.js:12)",
            oversized.as_str(),
        ] {
            let err = ApiError::rejected(400, Some(message));
            assert!(matches!(err, ApiError::Unexpected { status: 400 }), "{message}");
        }
    }

    #[test]
    fn test_into_api_response() {
        let ok: ApiResponse<u8> = ApiResult::Ok(7).into_response();
        assert!(ok.success);
        assert_eq!(ok.data, Some(7));

        let failed: ApiResponse<u8> = ApiResult::Err(ApiError::Forbidden).into_response();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Access denied."));
    }
}
