//! Admin dashboard summary.

use devmart_core::{OrderStatus, Price};
use tracing::instrument;

use crate::api::{ApiClient, ApiError, Category, Order, Product};

/// Figures shown at the top of the admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Sum of all order totals.
    pub revenue: Price,
    pub product_count: usize,
    pub category_count: usize,
    pub order_count: usize,
    /// Products below the low-stock threshold.
    pub low_stock_count: usize,
    pub pending_order_count: usize,
}

impl DashboardSummary {
    /// Compute the summary from already-fetched data.
    #[must_use]
    pub fn from_parts(products: &[Product], categories: &[Category], orders: &[Order]) -> Self {
        Self {
            revenue: orders.iter().map(|o| o.total).sum(),
            product_count: products.len(),
            category_count: categories.len(),
            order_count: orders.len(),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
            pending_order_count: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
        }
    }

    /// Fetch products, categories and orders concurrently and summarize.
    ///
    /// # Errors
    ///
    /// Returns the first API error, e.g. `ApiError::Forbidden` for
    /// non-admins reading all orders.
    #[instrument(skip(api))]
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let (products, categories, orders) =
            tokio::try_join!(api.products(), api.categories(), api.orders())?;
        Ok(Self::from_parts(&products, &categories, &orders))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use devmart_core::{OrderId, UserId};

    use super::*;
    use crate::cart::tests::product;

    fn order(id: i64, cents: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(1),
            status,
            created_at: None,
            total: Price::from_cents(cents),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_summary() {
        let products = [product(1, 100, 3), product(2, 100, 10), product(3, 100, 50)];
        let orders = [
            order(1, 1500, OrderStatus::Pending),
            order(2, 2550, OrderStatus::Delivered),
            order(3, 1000, OrderStatus::Pending),
        ];
        let summary = DashboardSummary::from_parts(&products, &[], &orders);
        assert_eq!(summary.revenue, Price::from_cents(5050));
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.pending_order_count, 2);
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.category_count, 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::from_parts(&[], &[], &[]);
        assert_eq!(summary.revenue, Price::ZERO);
        assert_eq!(summary.low_stock_count, 0);
    }
}
