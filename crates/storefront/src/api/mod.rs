//! DevMart REST backend client.
//!
//! # Architecture
//!
//! - `reqwest` with JSON bodies, bearer authentication and a request timeout
//! - The backend is the source of truth - no local sync, direct API calls
//! - In-memory query cache via `moka`, keyed by a typed [`CacheKey`] and
//!   invalidated explicitly after every mutating call
//!
//! # Endpoints
//!
//! - `auth` - login, registration, current user probe
//! - `products` / `categories` - catalog reads and admin CRUD
//! - `orders` - order history, placement, status changes, cancellation
//!
//! # Example
//!
//! ```rust,ignore
//! use devmart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api, tokens)?;
//! let products = client.products().await?;
//! ```

mod auth;
mod cache;
mod categories;
mod client;
mod orders;
mod products;
mod token;
pub mod types;

pub use cache::CacheKey;
pub use client::ApiClient;
pub use token::TokenStore;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown when the backend gives no usable explanation.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Message shown for 5xx responses; details go to the log, not the user.
pub const SERVER_ERROR_MESSAGE: &str =
    "The server ran into a problem. Please try again in a moment.";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection refused, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// 401 - missing, expired or rejected credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403 - authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 - resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409 - duplicate name, email, etc.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 400/422 - business-rule rejection such as insufficient stock.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// 5xx - the backend failed.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Backend-provided message, if any.
        message: String,
    },

    /// Any other non-success status.
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Backend-provided message, if any.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Build the error for a non-success response.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = envelope_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Rejected(message),
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Status {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// HTTP status code of the response, if one was received.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Rejected(_) => Some(400),
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Http(_) | Self::Timeout | Self::Parse(_) | Self::Url(_) => None,
        }
    }

    /// Whether this is a 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Whether this is a 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether an immediate retry could plausibly succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout | Self::Server { .. })
    }

    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Rejected(m)
            | Self::Status { message: m, .. } => m.clone(),
            Self::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            Self::Timeout => "The request timed out. Please try again.".to_string(),
            Self::Http(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Parse(_) | Self::Url(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Extract the human-readable message from a backend error body.
///
/// Looks at `message`, then `error`, then `msg` (used by the JWT layer for
/// token problems). Returns `None` for non-JSON bodies or blank messages.
#[must_use]
pub fn envelope_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "msg"].iter().find_map(|field| {
        value
            .get(field)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_prefers_message_then_error() {
        assert_eq!(
            envelope_message(r#"{"message": "m", "error": "e"}"#).as_deref(),
            Some("m")
        );
        assert_eq!(
            envelope_message(r#"{"error": "Stock insuficiente"}"#).as_deref(),
            Some("Stock insuficiente")
        );
        assert_eq!(
            envelope_message(r#"{"msg": "Token has expired"}"#).as_deref(),
            Some("Token has expired")
        );
    }

    #[test]
    fn test_envelope_ignores_blank_and_non_json() {
        assert_eq!(envelope_message(r#"{"message": "  ", "error": "e"}"#).as_deref(), Some("e"));
        assert_eq!(envelope_message("<html>502</html>"), None);
        assert_eq!(envelope_message(r#"{"detail": 1}"#), None);
    }

    #[test]
    fn test_from_status_maps_variants() {
        let body = r#"{"error": "nope"}"#;
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, body),
            ApiError::Unauthorized(m) if m == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, body),
            ApiError::Forbidden(_)
        ));
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, body).is_not_found());
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, body),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, body),
            ApiError::Rejected(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, body),
            ApiError::Server { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, body),
            ApiError::Status { status: 418, .. }
        ));
    }

    #[test]
    fn test_from_status_falls_back_to_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.user_message(), "Not Found");
    }

    #[test]
    fn test_server_error_message_is_generic() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "Traceback (most recent call last)"}"#,
        );
        assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
        assert!(err.is_transient());
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn test_rejection_surfaces_backend_message() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Insufficient stock for Keyboard"}"#,
        );
        assert_eq!(err.user_message(), "Insufficient stock for Keyboard");
        assert!(!err.is_transient());
    }
}
