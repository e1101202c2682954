//! Integration tests for catalog reads and query cache invalidation.

#![allow(clippy::unwrap_used)]

use devmart_core::{CategoryId, ProductId};
use devmart_integration_tests::{StubBackend, sign_in};
use devmart_storefront::api::{ApiError, CacheKey, ProductInput};

// =============================================================================
// Catalog Reads
// =============================================================================

#[tokio::test]
async fn test_products_are_cached() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    let first = state.api().products().await.unwrap();
    let second = state.api().products().await.unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    assert_eq!(backend.hits("GET /products/"), 1);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    let err = state.api().product(ProductId::new(999)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Product not found");
}

#[tokio::test]
async fn test_category_views() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    let categories = state.api().categories().await.unwrap();
    assert_eq!(categories.len(), 2);

    let by_slug = state.api().category_by_slug("peripherals").await.unwrap();
    assert_eq!(by_slug.id, CategoryId::new(1));
    assert_eq!(by_slug.name, "Peripherals");

    let products = state.api().category_products(by_slug.id).await.unwrap();
    assert_eq!(products.len(), 3);
    assert!(products.iter().all(|p| p.category_id == Some(by_slug.id)));

    let err = state.api().category_by_slug("no such thing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_explicit_invalidation_refetches() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();

    state.api().categories().await.unwrap();
    state.api().invalidate(&CacheKey::Categories).await;
    state.api().categories().await.unwrap();

    assert_eq!(backend.hits("GET /categories/"), 2);
}

// =============================================================================
// Invalidation After Mutations
// =============================================================================

#[tokio::test]
async fn test_product_update_invalidates_reads() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "admin@devmart.test", "adminpass").await;

    let cable = state.api().product(ProductId::new(4)).await.unwrap();
    state.api().products().await.unwrap();
    state
        .api()
        .category_products(CategoryId::new(1))
        .await
        .unwrap();

    let input = ProductInput {
        name: "USB-C Cable (2m)".to_string(),
        description: None,
        price: cable.unit_price(),
        stock: 40,
        image_url: None,
        category_id: cable.category_id,
    };
    let updated = state.api().update_product(cable.id, &input).await.unwrap();
    assert_eq!(updated.name, "USB-C Cable (2m)");

    let fresh = state.api().product(cable.id).await.unwrap();
    assert_eq!(fresh.available_stock(), 40);
    state.api().products().await.unwrap();
    state
        .api()
        .category_products(CategoryId::new(1))
        .await
        .unwrap();

    assert_eq!(backend.hits("GET /products/4"), 2);
    assert_eq!(backend.hits("GET /products/"), 2);
    assert_eq!(backend.hits("GET /categories/1/products"), 2);
}

#[tokio::test]
async fn test_category_rename_invalidates_slug_lookup() {
    let backend = StubBackend::start().await;
    let state = backend.storefront();
    sign_in(&state, "admin@devmart.test", "adminpass").await;

    state.api().category_by_slug("books").await.unwrap();
    state.api().categories().await.unwrap();

    let input = devmart_storefront::api::CategoryInput {
        name: "Technical Books".to_string(),
        description: None,
    };
    let renamed = state
        .api()
        .update_category(CategoryId::new(2), &input)
        .await
        .unwrap();
    assert_eq!(renamed.slug.as_deref(), Some("technical-books"));

    let err = state.api().category_by_slug("books").await.unwrap_err();
    assert!(err.is_not_found());
    let categories = state.api().categories().await.unwrap();
    assert!(categories.iter().any(|c| c.name == "Technical Books"));
    assert_eq!(backend.hits("GET /categories/"), 2);
}
