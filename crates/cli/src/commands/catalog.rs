//! Product and category browsing.

use devmart_core::{CategoryId, ProductId};
use devmart_storefront::error::AppError;
use devmart_storefront::state::AppState;

use super::print_product_row;

pub async fn list_products(state: &AppState) -> Result<(), AppError> {
    let products = state.api().products().await?;
    if products.is_empty() {
        println!("No products yet.");
    }
    for product in &products {
        print_product_row(product);
    }
    Ok(())
}

pub async fn show_product(state: &AppState, id: ProductId) -> Result<(), AppError> {
    let product = state.api().product(id).await?;
    println!("{} (#{})", product.name, product.id);
    println!("Price:  {}", product.unit_price());
    if product.in_stock() {
        println!("Stock:  {}", product.available_stock());
    } else {
        println!("Stock:  out of stock");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    if let Some(url) = &product.image_url {
        println!("Image:  {url}");
    }
    Ok(())
}

pub async fn list_categories(state: &AppState) -> Result<(), AppError> {
    for category in state.api().categories().await? {
        let slug = category.slug.as_deref().unwrap_or("-");
        println!("{:>5}  {:<30}  {slug}", category.id, category.name);
    }
    Ok(())
}

/// `category` is a numeric ID or a slug.
pub async fn show_category(state: &AppState, category: &str) -> Result<(), AppError> {
    let category = match category.parse::<CategoryId>() {
        Ok(id) => state.api().category(id).await?,
        Err(_) => state.api().category_by_slug(category.trim()).await?,
    };
    println!("{} (#{})", category.name, category.id);
    if let Some(description) = &category.description {
        println!("{description}");
    }

    let products = if category.products.is_empty() {
        state.api().category_products(category.id).await?
    } else {
        category.products
    };
    println!();
    for product in &products {
        print_product_row(product);
    }
    Ok(())
}

pub async fn category_products(state: &AppState, id: CategoryId) -> Result<(), AppError> {
    let products = state.api().category_products(id).await?;
    if products.is_empty() {
        println!("No products in this category.");
    }
    for product in &products {
        print_product_row(product);
    }
    Ok(())
}
