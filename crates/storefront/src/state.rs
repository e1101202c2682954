//! Application state shared by every command.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError, TokenStore};
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::services::{Checkout, SessionManager};
use crate::storage::{FileStorage, Storage};

/// Application state.
///
/// Owns the API client, cart, session and checkout, all wired to the same
/// durable storage. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
    session: SessionManager,
    checkout: Checkout,
}

impl AppState {
    /// Create state backed by files under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.state_dir));
        Self::with_storage(config, storage)
    }

    /// Create state over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ApiError> {
        let tokens = TokenStore::load(Arc::clone(&storage));
        let api = ApiClient::new(&config.api, tokens)?;
        let cart = CartStore::load(storage);
        let session = SessionManager::new(api.clone());
        let checkout = Checkout::new(api.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cart,
                session,
                checkout,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the DevMart API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}
