//! Authentication endpoints.

use reqwest::Method;
use tracing::instrument;

use super::client::{ApiClient, decode};
use super::types::{AuthResponse, LoginRequest, RegisterRequest, User};
use super::ApiError;

impl ApiClient {
    /// `POST /auth/login`.
    ///
    /// Does not store the returned token; that is the session manager's job.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or any transport
    /// or parse error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let path = "/auth/login";
        let body = self
            .send_json(Method::POST, path, &LoginRequest { email, password })
            .await?;
        decode(path, &body)
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` if the email or username is taken, or any
    /// transport or parse error.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let path = "/auth/register";
        let request = RegisterRequest {
            username,
            email,
            password,
        };
        let body = self.send_json(Method::POST, path, &request).await?;
        decode(path, &body)
    }

    /// `GET /auth/me` - resolve the stored token to a user.
    ///
    /// Never cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::NotFound` when the token
    /// no longer maps to a user.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me").await
    }
}
