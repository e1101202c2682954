//! HTTP transport and query cache shared by every endpoint module.

use std::fmt;
use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ApiConfig;

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::token::TokenStore;

/// Paths whose 401 responses must not clear the stored token: a failed login
/// or registration says nothing about an existing session, and the session
/// probe handles its own 401.
const AUTH_PATHS: [&str; 3] = ["auth/login", "auth/register", "auth/me"];

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the DevMart REST API.
///
/// Cheap to clone; clones share the connection pool, token and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, tokens: TokenStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                tokens,
                cache,
            }),
        })
    }

    /// The access token holder.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let builder = self.inner.client.request(method, self.url(path)?);
        Ok(match self.inner.tokens.get() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, path: &str, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Http(e)
            }
        })?;

        if status.is_success() {
            return Ok(body);
        }

        if status.is_server_error() {
            error!(
                status = %status,
                path,
                body = %body.chars().take(500).collect::<String>(),
                "DevMart API returned server error"
            );
        } else {
            debug!(status = %status, path, "DevMart API rejected request");
        }

        if status == StatusCode::UNAUTHORIZED && !is_auth_path(path) {
            warn!(path, "Access token rejected; clearing session");
            self.inner.tokens.clear();
            self.invalidate_user_data().await;
        }

        Err(ApiError::from_status(status, &body))
    }

    /// `GET` and decode the JSON body.
    pub(super) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path)?;
        let body = self.execute(path, builder).await?;
        decode(path, &body)
    }

    /// Send a JSON body and return the raw response body.
    pub(super) async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        payload: &B,
    ) -> Result<String, ApiError> {
        let builder = self.request(method, path)?.json(payload);
        self.execute(path, builder).await
    }

    /// `DELETE` and return the raw response body.
    pub(super) async fn delete(&self, path: &str) -> Result<String, ApiError> {
        let builder = self.request(Method::DELETE, path)?;
        self.execute(path, builder).await
    }

    // =========================================================================
    // Cache
    // =========================================================================

    pub(super) async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.get(key).await;
        if value.is_some() {
            debug!(?key, "Cache hit");
        }
        value
    }

    pub(super) async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Drop one cached read.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.inner.cache.invalidate(key).await;
    }

    /// Drop every cached read whose key matches `predicate`.
    pub async fn invalidate_where(&self, predicate: impl Fn(&CacheKey) -> bool) {
        let keys: Vec<CacheKey> = self
            .inner
            .cache
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();
        for key in keys {
            self.inner.cache.invalidate(&key).await;
        }
    }

    /// Drop cached product listings and details (stock or prices changed).
    pub async fn invalidate_product_data(&self) {
        self.invalidate_where(CacheKey::is_product_data).await;
    }

    /// Drop the signed-in user's cached orders.
    pub async fn invalidate_user_data(&self) {
        self.invalidate_where(CacheKey::is_user_scoped).await;
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

fn is_auth_path(path: &str) -> bool {
    let path = path.trim_start_matches('/').trim_end_matches('/');
    AUTH_PATHS.contains(&path)
}

pub(super) fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        error!(
            error = %e,
            path,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse DevMart API response"
        );
        ApiError::Parse(e)
    })
}
