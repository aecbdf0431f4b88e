//! Products and categories.

use freshwater_core::{Page, ProductFilter, ProductId};
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::types::{Category, Product};
use crate::{BackendClient, BackendError};

impl BackendClient {
    /// List available products matching `filter`.
    ///
    /// Results depend on the filter, so they are not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filter), fields(query = %filter.query_string()))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>, BackendError> {
        self.get_list("products/", None, &filter.to_query_pairs())
            .await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown or unavailable products.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("products/{id}/"), None).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List active categories in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let page: Page<Category> = self.get_list("categories/", None, &[("page_size", "100")]).await?;
        let categories = page.results;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }
}
