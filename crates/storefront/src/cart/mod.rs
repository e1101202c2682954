//! Shopping cart.
//!
//! The cart lives on the client. A [`Cart`] is an immutable value: every
//! operation returns a new cart and leaves the receiver untouched, so callers
//! can hold on to a snapshot while the [`CartStore`] moves on.
//!
//! Stock is checked against the product snapshot embedded in each line,
//! which is only as fresh as the last time the product was fetched. The
//! backend re-checks stock when the order is placed.

mod store;

pub use store::CartStore;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use devmart_core::{Price, ProductId};

use crate::api::{CreateOrderRequest, OrderLineRequest, Product};

/// Errors from cart mutations. The cart is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity exceeds the stock captured in the snapshot.
    #[error("Only {available} {} of {product} available", units(*.available))]
    InsufficientStock {
        /// Product name.
        product: String,
        /// Units available.
        available: u32,
    },
}

const fn units(n: u32) -> &'static str {
    if n == 1 { "unit" } else { "units" }
}

/// One product and how many of it are in the cart.
///
/// Serialized as the product's fields with `quantity` alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Quantity times unit price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.unit_price().times(self.quantity)
    }
}

/// An ordered set of cart lines, unique by product ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl From<Vec<CartLine>> for Cart {
    /// Drops zero-quantity lines and keeps the first line per product.
    fn from(lines: Vec<CartLine>) -> Self {
        let mut kept: Vec<CartLine> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity > 0 && !kept.iter().any(|l| l.product.id == line.product.id) {
                kept.push(line);
            }
        }
        Self { lines: kept }
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line subtotals; lines without a price count as zero.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add one unit of `product`.
    ///
    /// The line's product snapshot is replaced with `product`, so the stock
    /// figure is as fresh as the caller's copy.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InsufficientStock` if one more unit would exceed
    /// `product`'s stock.
    pub fn with_added(&self, product: &Product) -> Result<Self, CartError> {
        let current = self.line(product.id).map_or(0, |l| l.quantity);
        let wanted = current.saturating_add(1);
        let available = product.available_stock();
        if wanted > available {
            return Err(CartError::InsufficientStock {
                product: product.name.clone(),
                available,
            });
        }

        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => {
                line.product = product.clone();
                line.quantity = wanted;
            }
            None => lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            }),
        }
        Ok(Self { lines })
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Zero or less removes the line. An unknown `id` leaves the cart as is.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InsufficientStock` if `quantity` exceeds the stock
    /// captured in the line's snapshot. The quantity is never clamped.
    pub fn with_quantity(&self, id: ProductId, quantity: i64) -> Result<Self, CartError> {
        if quantity <= 0 {
            return Ok(self.without(id));
        }
        let Some(line) = self.line(id) else {
            return Ok(self.clone());
        };

        let available = line.product.available_stock();
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q <= available => q,
            _ => {
                return Err(CartError::InsufficientStock {
                    product: line.product.name.clone(),
                    available,
                });
            }
        };

        let mut lines = self.lines.clone();
        for line in lines.iter_mut().filter(|l| l.product.id == id) {
            line.quantity = quantity;
        }
        Ok(Self { lines })
    }

    /// The cart without the line for `id`.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|l| l.product.id != id)
                .cloned()
                .collect(),
        }
    }

    /// The order-creation body for this cart. Prices are omitted; the
    /// backend prices the order.
    #[must_use]
    pub fn to_order_request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            items: self
                .lines
                .iter()
                .map(|l| OrderLineRequest {
                    product_id: l.product.id,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Notices
// =============================================================================

/// The single user-facing notice produced by an add-to-cart action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The unit was added.
    Added { product: String },
    /// The stock limit was hit.
    StockLimit { product: String, available: u32 },
}

impl Notice {
    /// The notice for the outcome of adding `product`.
    #[must_use]
    pub fn for_add(product: &Product, outcome: &Result<Cart, CartError>) -> Self {
        match outcome {
            Ok(_) => Self::Added {
                product: product.name.clone(),
            },
            Err(CartError::InsufficientStock { product, available }) => Self::StockLimit {
                product: product.clone(),
                available: *available,
            },
        }
    }

    /// Whether this is a warning rather than a confirmation.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::StockLimit { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { product } => write!(f, "{product} added to cart"),
            Self::StockLimit { available: 0, product } => write!(f, "{product} is out of stock"),
            Self::StockLimit { available: 1, .. } => write!(f, "Only 1 unit available"),
            Self::StockLimit { available, .. } => write!(f, "Only {available} units available"),
        }
    }
}
