//! Cache types for REST API reads.

use devmart_core::{CategoryId, OrderId, ProductId};

use super::types::{Category, Order, Product};

/// Cache key for a backend read.
///
/// One variant per cached endpoint, so invalidation after a mutation can
/// name exactly what it touched.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// `GET /products/`
    Products,
    /// `GET /products/{id}`
    Product(ProductId),
    /// `GET /categories/`
    Categories,
    /// `GET /categories/{id}`
    Category(CategoryId),
    /// `GET /categories/slug/{slug}`
    CategoryBySlug(String),
    /// `GET /categories/{id}/products`
    CategoryProducts(CategoryId),
    /// `GET /orders/` (user-scoped)
    Orders,
    /// `GET /orders/{id}` (user-scoped)
    Order(OrderId),
}

impl CacheKey {
    /// Entries whose content depends on product stock or prices.
    #[must_use]
    pub const fn is_product_data(&self) -> bool {
        matches!(
            self,
            Self::Products
                | Self::Product(_)
                | Self::CategoryProducts(_)
                | Self::Category(_)
                | Self::CategoryBySlug(_)
        )
    }

    /// Entries derived from the category collection.
    #[must_use]
    pub const fn is_category_data(&self) -> bool {
        matches!(
            self,
            Self::Categories
                | Self::Category(_)
                | Self::CategoryBySlug(_)
                | Self::CategoryProducts(_)
        )
    }

    /// Entries that belong to the signed-in user.
    #[must_use]
    pub const fn is_user_scoped(&self) -> bool {
        matches!(self, Self::Orders | Self::Order(_))
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
    Order(Box<Order>),
    Orders(Vec<Order>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_groups() {
        assert!(CacheKey::Product(ProductId::new(1)).is_product_data());
        assert!(CacheKey::CategoryProducts(CategoryId::new(1)).is_product_data());
        assert!(!CacheKey::Orders.is_product_data());

        assert!(CacheKey::CategoryBySlug("books".into()).is_category_data());
        assert!(!CacheKey::Products.is_category_data());

        assert!(CacheKey::Order(OrderId::new(3)).is_user_scoped());
        assert!(!CacheKey::Categories.is_user_scoped());
    }
}
