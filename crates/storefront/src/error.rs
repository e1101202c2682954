//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends. Errors that point at a
//! backend or local fault are captured to Sentry by [`AppError::report`];
//! user mistakes and business-rule rejections are not.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart mutation refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Form input rejected locally.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The view requires a signed-in user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The view requires a role the user does not have.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    /// Whether this error indicates a fault rather than a user mistake.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        match self {
            Self::Api(e) | Self::Checkout(CheckoutError::Api(e)) | Self::Auth(AuthError::Api(e)) => {
                matches!(
                    e,
                    ApiError::Server { .. } | ApiError::Parse(_) | ApiError::Url(_)
                )
            }
            Self::Auth(AuthError::MissingToken) | Self::Config(_) | Self::Storage(_) => true,
            _ => false,
        }
    }

    /// Log the error and, for faults, capture it to Sentry.
    pub fn report(&self) {
        if self.is_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::debug!(error = %self, "Command rejected");
        }
    }

    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Checkout(e) => e.user_message(),
            Self::Auth(e) => e.user_message(),
            Self::Cart(e) => e.to_string(),
            Self::Validation(e) => e.to_string(),
            Self::Config(e) => e.to_string(),
            Self::Storage(_) => "Could not save local data.".to_string(),
            Self::Unauthorized(_) => "Please sign in first.".to_string(),
            Self::Forbidden(_) => "You do not have access to this page.".to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Unauthorized("/orders".to_string());
        assert_eq!(err.to_string(), "Unauthorized: /orders");
    }

    #[test]
    fn test_fault_classification() {
        let server = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(AppError::from(server).is_fault());

        let rejected = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error": "no"}"#);
        assert!(!AppError::from(CheckoutError::Api(rejected)).is_fault());

        assert!(!AppError::from(CartError::InsufficientStock {
            product: "Mug".into(),
            available: 0,
        })
        .is_fault());
        assert!(!AppError::Forbidden("/admin".into()).is_fault());
    }

    #[test]
    fn test_user_message_hides_server_detail() {
        let err = AppError::from(ApiError::from_status(
            StatusCode::BAD_GATEWAY,
            r#"{"error": "upstream exploded"}"#,
        ));
        assert_eq!(err.user_message(), crate::api::SERVER_ERROR_MESSAGE);

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.user_message(), "Your cart is empty.");
    }
}
