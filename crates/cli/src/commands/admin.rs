//! Admin console commands. Callers must have passed the admin route guard.

use devmart_core::{CategoryId, OrderId, OrderStatus, ProductId};
use devmart_storefront::error::AppError;
use devmart_storefront::services::DashboardSummary;
use devmart_storefront::state::AppState;
use devmart_storefront::validation::{CategoryForm, ProductForm};

use super::{print_order_row, print_product_row};

pub async fn dashboard(state: &AppState) -> Result<(), AppError> {
    let summary = DashboardSummary::load(state.api()).await?;
    println!("Revenue:          {}", summary.revenue);
    println!("Orders:           {}", summary.order_count);
    println!("Pending orders:   {}", summary.pending_order_count);
    println!("Products:         {}", summary.product_count);
    println!("Low stock:        {}", summary.low_stock_count);
    println!("Categories:       {}", summary.category_count);
    Ok(())
}

pub async fn create_product(state: &AppState, form: &ProductForm) -> Result<(), AppError> {
    let input = form.validate()?;
    let product = state.api().create_product(&input).await?;
    print!("Created: ");
    print_product_row(&product);
    Ok(())
}

pub async fn update_product(
    state: &AppState,
    id: ProductId,
    form: &ProductForm,
) -> Result<(), AppError> {
    let input = form.validate()?;
    let product = state.api().update_product(id, &input).await?;
    print!("Updated: ");
    print_product_row(&product);
    Ok(())
}

pub async fn delete_product(state: &AppState, id: ProductId) -> Result<(), AppError> {
    state.api().delete_product(id).await?;
    println!("Product #{id} deleted.");
    Ok(())
}

pub async fn create_category(state: &AppState, form: &CategoryForm) -> Result<(), AppError> {
    let input = form.validate()?;
    let category = state.api().create_category(&input).await?;
    println!("Created category #{} {}", category.id, category.name);
    Ok(())
}

pub async fn update_category(
    state: &AppState,
    id: CategoryId,
    form: &CategoryForm,
) -> Result<(), AppError> {
    let input = form.validate()?;
    let category = state.api().update_category(id, &input).await?;
    println!("Updated category #{} {}", category.id, category.name);
    Ok(())
}

pub async fn delete_category(state: &AppState, id: CategoryId) -> Result<(), AppError> {
    state.api().delete_category(id).await?;
    println!("Category #{id} deleted.");
    Ok(())
}

pub async fn list_orders(state: &AppState) -> Result<(), AppError> {
    for order in &state.api().orders().await? {
        print_order_row(order);
    }
    Ok(())
}

pub async fn update_order_status(
    state: &AppState,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), AppError> {
    let order = state.api().update_order_status(id, status).await?;
    print_order_row(&order);
    Ok(())
}
