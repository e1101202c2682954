//! Product endpoints.

use devmart_core::ProductId;
use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::client::ApiClient;
use super::types::{Product, ProductInput, unwrap_entity};
use super::ApiError;

impl ApiClient {
    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("/products/").await?;
        self.store(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("/products/{id}")).await?;
        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admins, or the backend's
    /// rejection.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let body = self.send_json(Method::POST, "/products/", input).await?;
        // New product shows up in listings and its category's view.
        self.invalidate_product_data().await;

        let product: Product = unwrap_entity(&body, "product")?;
        debug!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Replace a product's fields (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or the
    /// backend's rejection.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let body = self
            .send_json(Method::PUT, &format!("/products/{id}"), input)
            .await?;
        self.invalidate_product_data().await;

        Ok(unwrap_entity(&body, "product")?)
    }

    /// Delete a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or
    /// `ApiError::Rejected` if it is referenced by orders.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("/products/{id}")).await?;
        self.invalidate_product_data().await;
        Ok(())
    }
}
