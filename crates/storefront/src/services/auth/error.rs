//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::validation::ValidationErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form failed local validation; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Wrong email or password.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Email or username already registered.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// The backend accepted the login but sent no access token.
    #[error("login response did not include an access token")]
    MissingToken,

    /// Any other backend or transport failure.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::InvalidCredentials(m) | Self::UserAlreadyExists(m) => m.clone(),
            Self::MissingToken => crate::api::GENERIC_ERROR_MESSAGE.to_string(),
            Self::Api(e) => e.user_message(),
        }
    }
}
