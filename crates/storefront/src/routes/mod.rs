//! Storefront views and their access rules.
//!
//! # Route Structure
//!
//! ```text
//! /                       - Home
//! /login                  - Sign in
//! /register               - Create account
//! /products               - Product listing
//! /products/{id}          - Product detail
//! /categories             - Category listing
//! /categories/{slug}      - Category detail
//! /cart                   - Cart
//!
//! # Requires auth
//! /checkout               - Order review and placement
//! /orders                 - Order history
//! /orders/{id}            - Order detail
//! /profile                - Account profile
//!
//! # Requires admin
//! /admin                  - Admin console
//! ```

mod guard;

pub use guard::{Access, authorize};

use std::fmt;

use devmart_core::{OrderId, ProductId};

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Products,
    Product(ProductId),
    Categories,
    Category(String),
    Cart,
    Checkout,
    Orders,
    Order(OrderId),
    Profile,
    Admin,
}

impl Route {
    /// URL path of the view.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Products => "/products".to_string(),
            Self::Product(id) => format!("/products/{id}"),
            Self::Categories => "/categories".to_string(),
            Self::Category(slug) => format!("/categories/{slug}"),
            Self::Cart => "/cart".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::Orders => "/orders".to_string(),
            Self::Order(id) => format!("/orders/{id}"),
            Self::Profile => "/profile".to_string(),
            Self::Admin => "/admin".to_string(),
        }
    }

    /// Whether the view needs a signed-in user.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Checkout | Self::Orders | Self::Order(_) | Self::Profile | Self::Admin
        )
    }

    /// Whether the view needs the admin role.
    #[must_use]
    pub const fn requires_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
