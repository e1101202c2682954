//! Bearer access token holder.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::storage::{Storage, StorageError, keys};

/// The access token, mirrored in durable storage under
/// [`keys::ACCESS_TOKEN`].
///
/// Reads are served from memory. Writes update memory and storage together.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<TokenStoreInner>,
}

struct TokenStoreInner {
    storage: Arc<dyn Storage>,
    token: RwLock<Option<SecretString>>,
}

impl TokenStore {
    /// Load the stored token, if any.
    ///
    /// An unreadable store is treated as holding no token.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let token = match storage.get(keys::ACCESS_TOKEN) {
            Ok(value) => value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "Failed to read stored access token");
                None
            }
        };

        Self {
            inner: Arc::new(TokenStoreInner {
                storage,
                token: RwLock::new(token),
            }),
        }
    }

    /// The current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be persisted; the in-memory
    /// token is still updated.
    pub fn set(&self, token: SecretString) -> Result<(), StorageError> {
        let persisted = self
            .inner
            .storage
            .set(keys::ACCESS_TOKEN, token.expose_secret());
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
        persisted
    }

    /// Discard the token. Never fails; a storage error is logged.
    pub fn clear(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        if let Err(e) = self.inner.storage.remove(keys::ACCESS_TOKEN) {
            warn!(error = %e, "Failed to remove stored access token");
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("token", &if self.is_present() { "[REDACTED]" } else { "None" })
            .finish_non_exhaustive()
    }
}
