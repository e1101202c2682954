//! Session management.
//!
//! Tracks who is signed in. The session moves through
//!
//! ```text
//! Unresolved -> Resolving -> Resolved(user)
//!                         -> Unauthenticated
//! Resolved -> Unauthenticated   (logout, or any 401 from the backend)
//! ```
//!
//! A store with no access token starts out `Unauthenticated`; one with a
//! token starts `Unresolved` until [`SessionManager::resolve`] runs.

mod error;

pub use error::AuthError;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError, AuthResponse, User};
use crate::validation::{LoginForm, RegisterForm};

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A token is stored but has not been checked yet.
    Unresolved,
    /// The token is being checked.
    Resolving,
    /// Signed in.
    Resolved(User),
    /// Signed out.
    Unauthenticated,
}

/// Owns the session state.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    api: ApiClient,
    state: Mutex<SessionState>,
}

impl SessionManager {
    /// Create a session manager over `api`'s token store.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let state = if api.tokens().is_present() {
            SessionState::Unresolved
        } else {
            SessionState::Unauthenticated
        };
        Self {
            inner: Arc::new(SessionManagerInner {
                api,
                state: Mutex::new(state),
            }),
        }
    }

    /// The current state.
    ///
    /// A resolved session whose token has since been cleared (by a 401
    /// elsewhere) reads as `Unauthenticated`.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let mut state = self.lock();
        if matches!(*state, SessionState::Resolved(_)) && !self.inner.api.tokens().is_present() {
            debug!("Access token gone; session ended");
            *state = SessionState::Unauthenticated;
        }
        state.clone()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Resolved(_))
    }

    /// The signed-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        match self.state() {
            SessionState::Resolved(user) => Some(user),
            _ => None,
        }
    }

    /// Whether a resolution request is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*self.lock(), SessionState::Resolving)
    }

    /// Resolve the stored token to a user via `GET /auth/me`.
    ///
    /// Returns `Ok(None)` when there is no token or the backend no longer
    /// recognizes it (401/404); the token is discarded in the latter case.
    /// Other failures are retried once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the retry also fails. The session is then
    /// `Unauthenticated` but the token is kept for a later attempt.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<Option<User>, AuthError> {
        if !self.inner.api.tokens().is_present() {
            self.set(SessionState::Unauthenticated);
            return Ok(None);
        }
        self.set(SessionState::Resolving);

        let mut retried = false;
        loop {
            match self.inner.api.me().await {
                Ok(user) => {
                    if !self.inner.api.tokens().is_present() {
                        // Signed out while the probe was in flight.
                        self.set(SessionState::Unauthenticated);
                        return Ok(None);
                    }
                    debug!(user_id = %user.id, "Session resolved");
                    self.set(SessionState::Resolved(user.clone()));
                    return Ok(Some(user));
                }
                Err(e) if e.is_unauthorized() || e.is_not_found() => {
                    info!("Stored access token rejected");
                    self.discard().await;
                    return Ok(None);
                }
                Err(e) if !retried => {
                    warn!(error = %e, "Session probe failed; retrying once");
                    retried = true;
                }
                Err(e) => {
                    self.set(SessionState::Unauthenticated);
                    return Err(e.into());
                }
            }
        }
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` before any request if the form is
    /// invalid, `AuthError::InvalidCredentials` on a 401, or the API error.
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn login(&self, form: &LoginForm) -> Result<User, AuthError> {
        let email = form.validate()?;
        let response = self
            .inner
            .api
            .login(email.as_str(), form.password.expose_secret())
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized(m) => AuthError::InvalidCredentials(m),
                other => AuthError::Api(other),
            })?;

        let user = self.establish(response).await?;
        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Create an account.
    ///
    /// Returns `Ok(None)` when the backend created the account without
    /// signing the user in; they must then log in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` before any request if the form is
    /// invalid, `AuthError::UserAlreadyExists` on a 409, or the API error.
    #[instrument(skip(self, form), fields(username = %form.username.trim()))]
    pub async fn register(&self, form: &RegisterForm) -> Result<Option<User>, AuthError> {
        let email = form.validate()?;
        let response = self
            .inner
            .api
            .register(
                form.username.trim(),
                email.as_str(),
                form.password.expose_secret(),
            )
            .await
            .map_err(|e| match e {
                ApiError::Conflict(m) => AuthError::UserAlreadyExists(m),
                other => AuthError::Api(other),
            })?;

        if response.access_token.is_none() {
            info!("Account created; sign-in required");
            return Ok(None);
        }
        let user = self.establish(response).await?;
        info!(user_id = %user.id, "Account created and signed in");
        Ok(Some(user))
    }

    /// Sign out. Takes effect immediately; user-scoped cached reads are
    /// dropped as well.
    pub async fn logout(&self) {
        self.discard().await;
        info!("Signed out");
    }

    /// Store the token from an auth response and resolve the user, asking
    /// the backend if the response did not include one.
    async fn establish(&self, response: AuthResponse) -> Result<User, AuthError> {
        let Some(token) = response.access_token else {
            return Err(AuthError::MissingToken);
        };
        if let Err(e) = self.inner.api.tokens().set(SecretString::from(token)) {
            warn!(error = %e, "Failed to persist access token");
        }
        // Whatever was cached belonged to the previous user.
        self.inner.api.invalidate_user_data().await;

        let user = match response.user {
            Some(user) => user,
            None => self.inner.api.me().await?,
        };
        self.set(SessionState::Resolved(user.clone()));
        Ok(user)
    }

    async fn discard(&self) {
        self.inner.api.tokens().clear();
        self.set(SessionState::Unauthenticated);
        self.inner.api.invalidate_user_data().await;
    }

    fn set(&self, state: SessionState) {
        *self.lock() = state;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
