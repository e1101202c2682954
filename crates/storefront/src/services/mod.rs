//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Session resolution, sign-in, registration, sign-out
//! - `checkout` - Order placement from the cart
//! - `dashboard` - Admin summary figures

pub mod auth;
pub mod checkout;
pub mod dashboard;

pub use auth::{AuthError, SessionManager, SessionState};
pub use checkout::{Checkout, CheckoutError, CheckoutOutcome};
pub use dashboard::DashboardSummary;
