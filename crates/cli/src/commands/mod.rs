//! Subcommand implementations.
//!
//! Each module maps one area of the storefront onto terminal output.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use devmart_storefront::api::{Order, Product, User};
use devmart_storefront::error::AppError;
use devmart_storefront::routes::{Access, Route, authorize};
use devmart_storefront::services::SessionState;
use devmart_storefront::state::AppState;

/// Resolve the stored session if needed, then apply the route guard.
///
/// Returns the signed-in user when access is granted.
pub async fn require(state: &AppState, route: &Route) -> Result<User, AppError> {
    if state.session().state() == SessionState::Unresolved {
        state.session().resolve().await?;
    }

    let session = state.session().state();
    match authorize(route, &session) {
        Access::Granted => match session {
            SessionState::Resolved(user) => Ok(user),
            _ => Err(AppError::Unauthorized(route.path())),
        },
        Access::RedirectHome => Err(AppError::Forbidden(route.path())),
        Access::RedirectToLogin | Access::Loading => Err(AppError::Unauthorized(route.path())),
    }
}

fn print_product_row(product: &Product) {
    let price = product
        .price
        .map_or_else(|| "-".to_string(), |p| p.to_string());
    println!(
        "{:>5}  {:<40}  {:>10}  {:>5} in stock",
        product.id,
        product.name,
        price,
        product.available_stock()
    );
}

fn print_order_row(order: &Order) {
    let placed = order
        .created_at
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
    println!(
        "#{:<5}  {:<16}  {:<10}  {:>3} items  {:>10}",
        order.id,
        placed,
        order.status.label(),
        order.item_count(),
        order.total
    );
}
