//! Domain types for the DevMart REST API.
//!
//! These mirror the backend's JSON records. Field aliases cover the legacy
//! names some backend builds still emit (`estado`, `cantidad`,
//! `precio_unitario`).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use devmart_core::timestamp;
use devmart_core::{
    CategoryId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId, UserRole,
};

/// Products with fewer units than this are flagged on the admin dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

// =============================================================================
// Users
// =============================================================================

/// An authenticated user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    #[serde(alias = "name")]
    pub username: String,
    /// Email address.
    pub email: Email,
    /// Role, `user` unless the backend says `admin`.
    #[serde(default)]
    pub role: UserRole,
    /// Account creation time.
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this user may open the admin console.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration request body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from `/auth/login` and `/auth/register`.
///
/// Registration may omit the token, in which case the user must log in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product snapshot as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price. Missing prices count as zero in totals.
    #[serde(default)]
    pub price: Option<Price>,
    /// Units available when the product was fetched. Missing means none.
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Units available, treating a missing or negative figure as zero.
    #[must_use]
    pub fn available_stock(&self) -> u32 {
        self.stock
            .map_or(0, |s| u32::try_from(s.max(0)).unwrap_or(u32::MAX))
    }

    /// Unit price, zero when the backend sent none.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }

    /// Whether at least one unit is available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.available_stock() > 0
    }

    /// Whether the product is below the low-stock threshold.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.available_stock() < LOW_STOCK_THRESHOLD
    }
}

/// Body for `POST /products/` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// Products embedded by the backend; may be empty.
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Body for `POST /categories/` and `PUT /categories/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// `GET /categories/{id}/products` answers either with a bare array or with
/// the category alongside its products.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CategoryProductsResponse {
    Bare(Vec<Product>),
    Wrapped { products: Vec<Product> },
}

impl CategoryProductsResponse {
    pub(crate) fn into_products(self) -> Vec<Product> {
        match self {
            Self::Bare(products) | Self::Wrapped { products } => products,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default, alias = "estado")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    /// Total computed by the backend.
    pub total: Price,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    #[serde(alias = "cantidad")]
    pub quantity: u32,
    /// Price per unit at the time of purchase.
    #[serde(alias = "precio_unitario", alias = "price")]
    pub unit_price: Price,
    #[serde(default)]
    pub subtotal: Option<Price>,
}

impl OrderItem {
    /// Line subtotal, derived when the backend omitted it.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.subtotal
            .unwrap_or_else(|| self.unit_price.times(self.quantity))
    }
}

/// Body for `POST /orders/`. Prices are left to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

/// One requested order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Response from `POST /orders/`.
///
/// The order has been created once the backend answers 2xx, so the body is
/// read leniently: `order` is `None` when it cannot be decoded in full, and
/// `order_id` still carries the ID if one could be read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(skip)]
    pub order_id: Option<OrderId>,
}

impl CreateOrderResponse {
    /// Read a successful response body. Blank or partial bodies are not
    /// errors; the returned error only describes what could not be decoded.
    pub(crate) fn from_body(body: &str) -> (Self, Option<serde_json::Error>) {
        if body.trim().is_empty() {
            return (Self::default(), None);
        }
        match serde_json::from_str::<Self>(body) {
            Ok(mut response) => {
                response.order_id = response.order.as_ref().map(|order| order.id);
                (response, None)
            }
            Err(e) => {
                let value: serde_json::Value =
                    serde_json::from_str(body).unwrap_or(serde_json::Value::Null);
                let response = Self {
                    message: value
                        .get("message")
                        .and_then(serde_json::Value::as_str)
                        .map(String::from),
                    order: None,
                    order_id: value
                        .get("order")
                        .and_then(|order| order.get("id"))
                        .and_then(serde_json::Value::as_i64)
                        .map(OrderId::new),
                };
                (response, Some(e))
            }
        }
    }
}

/// Body for `PUT /orders/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Bodies that only carry a confirmation message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode a mutation response that may wrap the entity under `field`
/// (`{"message": "...", "product": {...}}`) or return it bare.
pub(crate) fn unwrap_entity<T: DeserializeOwned>(
    body: &str,
    field: &str,
) -> Result<T, serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(body)?;
    match value.get_mut(field).map(serde_json::Value::take) {
        Some(inner) if inner.is_object() => serde_json::from_value(inner),
        _ => serde_json::from_value(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> &'static str {
        r#"{
            "id": 1,
            "name": "Mechanical Keyboard",
            "description": "Clicky",
            "price": 89.9,
            "stock": 5,
            "image_url": null,
            "category_id": 2,
            "created_at": "2025-01-02T03:04:05.678901"
        }"#
    }

    #[test]
    fn test_product_deserializes_backend_shape() {
        let product: Product = serde_json::from_str(product_json()).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.unit_price(), Price::from_cents(8990));
        assert_eq!(product.available_stock(), 5);
        assert_eq!(product.category_id, Some(CategoryId::new(2)));
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_product_missing_fields_default() {
        let product: Product = serde_json::from_str(r#"{"id": 9, "name": "Sticker"}"#).unwrap();
        assert_eq!(product.unit_price(), Price::ZERO);
        assert_eq!(product.available_stock(), 0);
        assert!(!product.in_stock());
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_negative_stock_is_zero() {
        let product: Product =
            serde_json::from_str(r#"{"id": 9, "name": "Sticker", "stock": -3}"#).unwrap();
        assert_eq!(product.available_stock(), 0);
    }

    #[test]
    fn test_order_accepts_legacy_field_names() {
        let json = r#"{
            "id": 12,
            "user_id": 3,
            "total": 30.0,
            "estado": "pendiente",
            "created_at": "2025-02-01T00:00:00+00:00",
            "items": [
                {"id": 1, "order_id": 12, "product_id": 4, "cantidad": 2, "precio_unitario": 10.0, "subtotal": 20.0},
                {"product_id": 5, "quantity": 1, "unit_price": 10.0}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.items[0].subtotal(), Price::from_cents(2000));
        assert_eq!(order.items[1].subtotal(), Price::from_cents(1000));
    }

    #[test]
    fn test_user_name_alias_and_role() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "name": "ana", "email": "ana@example.com", "role": "admin"}"#,
        )
        .unwrap();
        assert_eq!(user.username, "ana");
        assert!(user.is_admin());

        let user: User = serde_json::from_str(
            r#"{"id": 2, "username": "bo", "email": "bo@example.com"}"#,
        )
        .unwrap();
        assert!(!user.is_admin());
    }

    #[test]
    fn test_category_products_both_shapes() {
        let bare: CategoryProductsResponse =
            serde_json::from_str(&format!("[{}]", product_json())).unwrap();
        assert_eq!(bare.into_products().len(), 1);

        let wrapped: CategoryProductsResponse = serde_json::from_str(&format!(
            r#"{{"category": {{"id": 2, "name": "Peripherals"}}, "products": [{}]}}"#,
            product_json()
        ))
        .unwrap();
        assert_eq!(wrapped.into_products().len(), 1);
    }

    #[test]
    fn test_unwrap_entity_wrapped_and_bare() {
        let wrapped = format!(r#"{{"message": "created", "product": {}}}"#, product_json());
        let product: Product = unwrap_entity(&wrapped, "product").unwrap();
        assert_eq!(product.name, "Mechanical Keyboard");

        let product: Product = unwrap_entity(product_json(), "product").unwrap();
        assert_eq!(product.id, ProductId::new(1));
    }

    #[test]
    fn test_create_order_request_has_no_prices() {
        let request = CreateOrderRequest {
            items: vec![OrderLineRequest {
                product_id: ProductId::new(4),
                quantity: 2,
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"items": [{"product_id": 4, "quantity": 2}]})
        );
    }

    #[test]
    fn test_created_order_full_body() {
        let body = r#"{
            "message": "Order created",
            "order": {"id": 9, "user_id": 2, "estado": "pendiente", "total": 10.5, "items": []}
        }"#;
        let (response, error) = CreateOrderResponse::from_body(body);
        assert!(error.is_none());
        assert_eq!(response.order_id, Some(OrderId::new(9)));
        assert!(response.order.is_some());
    }

    #[test]
    fn test_created_order_partial_body_keeps_id() {
        let body = r#"{"message": "Pedido creado", "order": {"id": 5}}"#;
        let (response, error) = CreateOrderResponse::from_body(body);
        assert!(error.is_some());
        assert!(response.order.is_none());
        assert_eq!(response.order_id, Some(OrderId::new(5)));
        assert_eq!(response.message.as_deref(), Some("Pedido creado"));
    }

    #[test]
    fn test_created_order_empty_or_garbage_body() {
        let (response, error) = CreateOrderResponse::from_body("");
        assert!(error.is_none());
        assert_eq!(response.order_id, None);

        let (response, error) = CreateOrderResponse::from_body("<html>ok</html>");
        assert!(error.is_some());
        assert_eq!(response.order_id, None);
    }
}
