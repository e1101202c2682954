//! Category endpoints.

use devmart_core::CategoryId;
use reqwest::Method;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::client::ApiClient;
use super::types::{Category, CategoryInput, CategoryProductsResponse, Product, unwrap_entity};
use super::ApiError;

impl ApiClient {
    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cached(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("/categories/").await?;
        self.store(
            CacheKey::Categories,
            CacheValue::Categories(categories.clone()),
        )
        .await;
        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the category does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.cached(&key).await {
            return Ok(*category);
        }

        let category: Category = self.get_json(&format!("/categories/{id}")).await?;
        self.store(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    /// Get a category by its URL slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no category has this slug.
    #[instrument(skip(self))]
    pub async fn category_by_slug(&self, slug: &str) -> Result<Category, ApiError> {
        let key = CacheKey::CategoryBySlug(slug.to_string());
        if let Some(CacheValue::Category(category)) = self.cached(&key).await {
            return Ok(*category);
        }

        let mut path = String::from("/categories/slug/");
        path.extend(url::form_urlencoded::byte_serialize(slug.as_bytes()));
        let category: Category = self.get_json(&path).await?;
        self.store(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    /// List the products in a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the category does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category_products(&self, id: CategoryId) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::CategoryProducts(id);
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            return Ok(products);
        }

        let response: CategoryProductsResponse =
            self.get_json(&format!("/categories/{id}/products")).await?;
        let products = response.into_products();
        self.store(key, CacheValue::Products(products.clone())).await;
        Ok(products)
    }

    /// Create a category (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` if the name is taken, or the backend's
    /// rejection.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let body = self.send_json(Method::POST, "/categories/", input).await?;
        self.invalidate_where(CacheKey::is_category_data).await;

        let category: Category = unwrap_entity(&body, "category")?;
        debug!(category_id = %category.id, "Created category");
        Ok(category)
    }

    /// Update a category (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the category does not exist, or the
    /// backend's rejection.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let body = self
            .send_json(Method::PUT, &format!("/categories/{id}"), input)
            .await?;
        self.invalidate_where(CacheKey::is_category_data).await;

        Ok(unwrap_entity(&body, "category")?)
    }

    /// Delete a category (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the category does not exist, or
    /// `ApiError::Rejected` if it still holds products.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.delete(&format!("/categories/{id}")).await?;
        self.invalidate_where(CacheKey::is_category_data).await;
        Ok(())
    }
}
