//! Cart state owner with durable persistence.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use devmart_core::ProductId;

use super::{Cart, CartError};
use crate::api::Product;
use crate::storage::{Storage, keys};

/// Owns the current [`Cart`] and persists it under [`keys::CART`] after
/// every change.
///
/// Cheap to clone; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn Storage>,
    cart: Mutex<Cart>,
}

impl CartStore {
    /// Rehydrate the cart from storage.
    ///
    /// A missing, unreadable or malformed value yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let cart = match storage.get(keys::CART) {
            Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding malformed stored cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Cart::new()
            }
        };
        debug!(lines = cart.lines().len(), "Cart loaded");

        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                cart: Mutex::new(cart),
            }),
        }
    }

    /// The current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InsufficientStock` if the stock limit is reached.
    pub fn add_item(&self, product: &Product) -> Result<Cart, CartError> {
        self.apply(|cart| cart.with_added(product))
    }

    /// Set the quantity for `id`; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InsufficientStock` if `quantity` exceeds the
    /// line's stock.
    pub fn update_quantity(&self, id: ProductId, quantity: i64) -> Result<Cart, CartError> {
        self.apply(|cart| cart.with_quantity(id, quantity))
    }

    /// Remove the line for `id`, if any.
    pub fn remove_item(&self, id: ProductId) -> Cart {
        self.replace(|cart| cart.without(id))
    }

    /// Empty the cart.
    pub fn clear(&self) -> Cart {
        self.replace(|_| Cart::new())
    }

    fn replace(&self, f: impl FnOnce(&Cart) -> Cart) -> Cart {
        let mut guard = self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner);
        let next = f(&guard);
        self.persist(&next);
        *guard = next.clone();
        next
    }

    fn apply(&self, f: impl FnOnce(&Cart) -> Result<Cart, CartError>) -> Result<Cart, CartError> {
        let mut guard = self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner);
        let next = f(&guard)?;
        self.persist(&next);
        *guard = next.clone();
        Ok(next)
    }

    /// Write the cart. Failures are logged; the in-memory cart still moves on.
    fn persist(&self, cart: &Cart) {
        let result = serde_json::to_string(cart)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.inner
                    .storage
                    .set(keys::CART, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            warn!(%error, "Failed to persist cart");
        }
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.snapshot())
            .finish_non_exhaustive()
    }
}
