//! Order endpoints.
//!
//! Orders are user-scoped: the backend returns the caller's orders, or all
//! orders for an admin. Cached entries are dropped on login and logout.

use devmart_core::{OrderId, OrderStatus};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use super::client::{ApiClient, decode};
use super::types::{
    CreateOrderRequest, CreateOrderResponse, MessageResponse, Order, UpdateOrderStatusRequest,
    unwrap_entity,
};
use super::ApiError;

impl ApiClient {
    /// List orders visible to the current user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid session.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        if let Some(CacheValue::Orders(orders)) = self.cached(&CacheKey::Orders).await {
            return Ok(orders);
        }

        let orders: Vec<Order> = self.get_json("/orders/").await?;
        self.store(CacheKey::Orders, CacheValue::Orders(orders.clone()))
            .await;
        Ok(orders)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist, or
    /// `ApiError::Forbidden` if it belongs to someone else.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        let key = CacheKey::Order(id);
        if let Some(CacheValue::Order(order)) = self.cached(&key).await {
            return Ok(*order);
        }

        let order: Order = self.get_json(&format!("/orders/{id}")).await?;
        self.store(key, CacheValue::Order(Box::new(order.clone())))
            .await;
        Ok(order)
    }

    /// Place an order.
    ///
    /// The backend prices the lines and decrements stock, so product reads
    /// are invalidated along with the order list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for insufficient stock or unknown
    /// products. A 2xx answer is never an error, even when its body cannot be
    /// decoded.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let path = "/orders/";
        let body = self.send_json(Method::POST, path, request).await?;
        self.invalidate(&CacheKey::Orders).await;
        self.invalidate_product_data().await;

        let (response, error) = CreateOrderResponse::from_body(&body);
        if let Some(e) = error {
            warn!(
                error = %e,
                order_id = ?response.order_id,
                body = %body.chars().take(500).collect::<String>(),
                "Order created but response body was not fully understood"
            );
        }
        if let Some(order) = &response.order {
            debug!(order_id = %order.id, "Order placed");
            self.store(
                CacheKey::Order(order.id),
                CacheValue::Order(Box::new(order.clone())),
            )
            .await;
        }
        Ok(response)
    }

    /// Change an order's status (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admins, or the backend's
    /// rejection.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let body = self
            .send_json(
                Method::PUT,
                &format!("/orders/{id}/status"),
                &UpdateOrderStatusRequest { status },
            )
            .await?;
        self.invalidate(&CacheKey::Orders).await;
        self.invalidate(&CacheKey::Order(id)).await;

        Ok(unwrap_entity(&body, "order")?)
    }

    /// Cancel a pending order. The backend restores the stock.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the order is no longer pending.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<MessageResponse, ApiError> {
        let path = format!("/orders/{id}");
        let body = self.delete(&path).await?;
        self.invalidate(&CacheKey::Orders).await;
        self.invalidate(&CacheKey::Order(id)).await;
        self.invalidate_product_data().await;

        if body.trim().is_empty() {
            return Ok(MessageResponse::default());
        }
        decode(&path, &body)
    }
}
