//! Checkout: turn the cart into an order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{info, instrument, warn};

use devmart_core::OrderId;

use crate::api::{ApiClient, ApiError, GENERIC_ERROR_MESSAGE};
use crate::cart::CartStore;
use crate::routes::Route;

/// Errors from placing an order. The cart is unchanged when one is returned.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The backend refused or could not be reached.
    #[error("order placement failed: {0}")]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::Api(e) => {
                let message = e.user_message();
                if message.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    message
                }
            }
        }
    }
}

/// What happened to a checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was placed and the cart cleared.
    Placed {
        /// ID assigned by the backend, when it sent one back.
        order_id: Option<OrderId>,
        /// View to show next.
        destination: Route,
    },
    /// Another checkout was already in flight; nothing was sent.
    Suppressed,
}

/// Places orders from the cart, one at a time.
///
/// Cheap to clone; clones share the in-flight guard.
#[derive(Debug, Clone)]
pub struct Checkout {
    api: ApiClient,
    cart: CartStore,
    in_flight: Arc<AtomicBool>,
}

impl Checkout {
    #[must_use]
    pub fn new(api: ApiClient, cart: CartStore) -> Self {
        Self {
            api,
            cart,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether an order request is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit the current cart as an order.
    ///
    /// On success the cart is cleared and the destination is the new
    /// order's detail view, or the order list if the backend sent no ID.
    /// A call made while another is in flight returns
    /// [`CheckoutOutcome::Suppressed`] without contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` without a request if the cart is
    /// empty, or `CheckoutError::Api` if the backend rejects the order.
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Result<CheckoutOutcome, CheckoutError> {
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Checkout already in progress; ignoring");
            return Ok(CheckoutOutcome::Suppressed);
        }
        let _guard = InFlight(&self.in_flight);

        let request = cart.to_order_request();
        let response = match self.api.create_order(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Order placement failed");
                return Err(e.into());
            }
        };

        self.cart.clear();
        let order_id = response.order_id;
        info!(order_id = ?order_id, items = cart.total_items(), "Order placed");

        Ok(CheckoutOutcome::Placed {
            order_id,
            destination: order_id.map_or(Route::Orders, Route::Order),
        })
    }
}

/// Resets the in-flight flag when the request finishes, including on error.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
