//! Cart commands. The cart is local; only `add` talks to the backend, to
//! get a fresh product snapshot.

use devmart_core::ProductId;
use devmart_storefront::api::Product;
use devmart_storefront::cart::{Cart, CartError, Notice};
use devmart_storefront::error::{AppError, add_breadcrumb};
use devmart_storefront::state::AppState;

pub fn show(state: &AppState) {
    print_cart(&state.cart().snapshot());
}

pub async fn add(state: &AppState, product_id: ProductId) -> Result<(), AppError> {
    let product = state.api().product(product_id).await?;
    let (notice, totals) = add_report(&product, &state.cart().add_item(&product));

    // A stock limit is reported once, as a warning, and is not a failure.
    let Some(totals) = totals else {
        eprintln!("{notice}");
        return Ok(());
    };
    let id = product_id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));
    println!("{notice}");
    println!("{totals}");
    Ok(())
}

/// The notice for an add, and the cart totals line when the add succeeded.
fn add_report(product: &Product, outcome: &Result<Cart, CartError>) -> (Notice, Option<String>) {
    let notice = Notice::for_add(product, outcome);
    let totals = outcome
        .as_ref()
        .ok()
        .map(|cart| format!("{} items, {}", cart.total_items(), cart.total_price()));
    (notice, totals)
}

pub fn set(state: &AppState, product_id: ProductId, quantity: i64) -> Result<(), AppError> {
    let cart = state.cart().update_quantity(product_id, quantity)?;
    print_cart(&cart);
    Ok(())
}

pub fn remove(state: &AppState, product_id: ProductId) {
    print_cart(&state.cart().remove_item(product_id));
}

pub fn clear(state: &AppState) {
    state.cart().clear();
    println!("Cart emptied.");
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:>5}  {:<40}  {:>3} x {:>10}  = {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.unit_price(),
            line.subtotal()
        );
    }
    println!("{} items, total {}", cart.total_items(), cart.total_price());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use devmart_core::Price;

    use super::*;

    fn cable(stock: i64) -> Product {
        Product {
            id: ProductId::new(4),
            name: "USB-C Cable".to_string(),
            description: None,
            price: Some(Price::from_cents(999)),
            stock: Some(stock),
            image_url: None,
            category_id: None,
            created_at: None,
        }
    }

    #[test]
    fn test_add_report_success() {
        let product = cable(3);
        let outcome = Cart::new().with_added(&product);
        let (notice, totals) = add_report(&product, &outcome);
        assert!(!notice.is_warning());
        assert_eq!(notice.to_string(), "USB-C Cable added to cart");
        assert_eq!(totals.as_deref(), Some("1 items, $9.99"));
    }

    #[test]
    fn test_add_report_stock_limit_is_a_single_warning() {
        let product = cable(1);
        let cart = Cart::new().with_added(&product).unwrap();
        let outcome = cart.with_added(&product);
        let (notice, totals) = add_report(&product, &outcome);
        assert!(notice.is_warning());
        assert_eq!(notice.to_string(), "Only 1 unit available");
        assert_eq!(totals, None);
    }
}
