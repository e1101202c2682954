//! Checkout and order history.

use devmart_core::OrderId;
use devmart_storefront::api::ApiError;
use devmart_storefront::error::AppError;
use devmart_storefront::routes::Route;
use devmart_storefront::services::CheckoutOutcome;
use devmart_storefront::state::AppState;

use super::{print_order_row, require};

pub async fn checkout(state: &AppState) -> Result<(), AppError> {
    require(state, &Route::Checkout).await?;

    match state.checkout().place_order().await? {
        CheckoutOutcome::Placed {
            order_id,
            destination,
        } => {
            match order_id {
                Some(id) => println!("Order #{id} placed."),
                None => println!("Order placed."),
            }
            println!("See {destination}");
        }
        CheckoutOutcome::Suppressed => println!("An order is already being placed."),
    }
    Ok(())
}

pub async fn list(state: &AppState) -> Result<(), AppError> {
    require(state, &Route::Orders).await?;

    let orders = state.api().orders().await?;
    if orders.is_empty() {
        println!("You have no orders yet.");
    }
    for order in &orders {
        print_order_row(order);
    }
    Ok(())
}

pub async fn show(state: &AppState, id: OrderId) -> Result<(), AppError> {
    require(state, &Route::Order(id)).await?;

    let order = state.api().order(id).await?;
    print_order_row(&order);
    println!();
    for item in &order.items {
        println!(
            "  product #{:<5}  {:>3} x {:>10}  = {:>10}",
            item.product_id,
            item.quantity,
            item.unit_price,
            item.subtotal()
        );
    }
    Ok(())
}

pub async fn cancel(state: &AppState, id: OrderId) -> Result<(), AppError> {
    require(state, &Route::Order(id)).await?;

    let order = state.api().order(id).await?;
    if !order.status.is_cancellable() {
        return Err(ApiError::Rejected(format!(
            "Only pending orders can be cancelled; order #{id} is {}",
            order.status.label()
        ))
        .into());
    }

    let response = state.api().cancel_order(id).await?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| format!("Order #{id} cancelled."))
    );
    Ok(())
}
