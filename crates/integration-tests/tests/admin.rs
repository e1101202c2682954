//! Integration tests for the admin console: dashboard, catalog CRUD and
//! order status management.

#![allow(clippy::unwrap_used)]

use devmart_core::{OrderStatus, Price, ProductId};
use devmart_integration_tests::{StubBackend, sign_in};
use devmart_storefront::api::ApiError;
use devmart_storefront::services::{CheckoutOutcome, DashboardSummary};
use devmart_storefront::validation::{CategoryForm, ProductForm};

// =============================================================================
// Dashboard Tests
// =============================================================================

#[tokio::test]
async fn test_dashboard_summary() {
    let backend = StubBackend::start().await;

    let customer = backend.storefront();
    sign_in(&customer, "ana@devmart.test", "secret1").await;
    let mouse = customer.api().product(ProductId::new(2)).await.unwrap();
    customer.cart().add_item(&mouse).unwrap();
    customer.checkout().place_order().await.unwrap();

    let admin = backend.storefront();
    sign_in(&admin, "admin@devmart.test", "adminpass").await;
    let summary = DashboardSummary::load(admin.api()).await.unwrap();

    assert_eq!(summary.product_count, 4);
    assert_eq!(summary.category_count, 2);
    assert_eq!(summary.order_count, 1);
    assert_eq!(summary.pending_order_count, 1);
    assert_eq!(summary.revenue, "19.99".parse::<Price>().unwrap());
    // Keyboard (5), mouse (now 1) and the sold-out book.
    assert_eq!(summary.low_stock_count, 3);
}

#[tokio::test]
async fn test_customers_cannot_edit_catalog() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "ana@devmart.test", "secret1").await;

    // Customers may list their own orders but not create products.
    assert!(DashboardSummary::load(state.api()).await.is_ok());
    let form = ProductForm {
        name: "Contraband".to_string(),
        price: "1.00".to_string(),
        stock: "1".to_string(),
        ..ProductForm::default()
    };
    let err = state
        .api()
        .create_product(&form.validate().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

// =============================================================================
// Catalog CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_product_lifecycle() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "admin@devmart.test", "adminpass").await;
    assert_eq!(state.api().products().await.unwrap().len(), 4);

    let form = ProductForm {
        name: "Monitor Arm".to_string(),
        description: "Gas spring, single monitor".to_string(),
        price: "$89.00".to_string(),
        stock: "7".to_string(),
        category_id: "1".to_string(),
        ..ProductForm::default()
    };
    let created = state
        .api()
        .create_product(&form.validate().unwrap())
        .await
        .unwrap();
    assert_eq!(created.name, "Monitor Arm");
    assert_eq!(created.unit_price(), Price::from_cents(8900));
    assert_eq!(state.api().products().await.unwrap().len(), 5);

    state.api().delete_product(created.id).await.unwrap();
    assert_eq!(state.api().products().await.unwrap().len(), 4);
    let err = state.api().product(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_category_lifecycle() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "admin@devmart.test", "adminpass").await;

    let form = CategoryForm {
        name: "Audio Gear".to_string(),
        description: String::new(),
    };
    let created = state
        .api()
        .create_category(&form.validate().unwrap())
        .await
        .unwrap();
    assert_eq!(created.slug.as_deref(), Some("audio-gear"));
    assert_eq!(
        state.api().category_by_slug("audio-gear").await.unwrap().id,
        created.id
    );

    let duplicate = state
        .api()
        .create_category(&form.validate().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(duplicate, ApiError::Conflict(_)));

    state.api().delete_category(created.id).await.unwrap();
    assert_eq!(state.api().categories().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_category_with_products_cannot_be_deleted() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "admin@devmart.test", "adminpass").await;

    let err = state
        .api()
        .delete_category(devmart_core::CategoryId::new(1))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Category still has products");
    assert_eq!(state.api().categories().await.unwrap().len(), 2);
}

// =============================================================================
// Order Status Tests
// =============================================================================

#[tokio::test]
async fn test_status_change_is_visible_to_customer() {
    let backend = StubBackend::start().await;

    let customer = backend.storefront();
    sign_in(&customer, "ana@devmart.test", "secret1").await;
    let keyboard = customer.api().product(ProductId::new(1)).await.unwrap();
    customer.cart().add_item(&keyboard).unwrap();
    let CheckoutOutcome::Placed {
        order_id: Some(id),
        ..
    } = customer.checkout().place_order().await.unwrap()
    else {
        panic!("order not placed");
    };
    assert_eq!(
        customer.api().order(id).await.unwrap().status,
        OrderStatus::Pending
    );

    let admin = backend.storefront();
    sign_in(&admin, "admin@devmart.test", "adminpass").await;
    let shipped = admin
        .api()
        .update_order_status(id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(
        admin.api().order(id).await.unwrap().status,
        OrderStatus::Shipped
    );

    // The customer's cached copy is stale until something invalidates it.
    customer.api().invalidate_user_data().await;
    let seen = customer.api().order(id).await.unwrap();
    assert_eq!(seen.status, OrderStatus::Shipped);
    assert!(!seen.status.is_cancellable());
    assert!(matches!(
        customer.api().cancel_order(id).await.unwrap_err(),
        ApiError::Rejected(_)
    ));
}
