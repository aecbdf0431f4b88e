//! Admin API: dashboard, users, products, categories, orders and articles.
//!
//! Every call requires an admin access token. Writes to catalogue data drop
//! the anonymous cache so the storefront sees changes within one request.

use freshwater_core::{ArticleId, CategoryId, OrderId, Page, ProductId, UserId};
use reqwest::Method;
use secrecy::SecretString;
use tracing::{info, instrument};

use crate::cache::CacheKey;
use crate::types::{
    AdminArticle, AdminArticleDetail, AdminCategory, AdminOrder, AdminOrderDetail, AdminProduct,
    AdminQuery, AdminUser, AdminUserCreate, AdminUserUpdate, ArticleInput, CategoryInput,
    DashboardStats, OrderUpdate, Product, ProductInput, UserProfile,
};
use crate::{BackendClient, BackendError};

impl BackendClient {
    /// Headline counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn dashboard_stats(&self, token: &SecretString) -> Result<DashboardStats, BackendError> {
        self.get("admin/dashboard/stats", Some(token)).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_users(
        &self,
        token: &SecretString,
        query: &AdminQuery,
    ) -> Result<Page<AdminUser>, BackendError> {
        self.get_list("admin/users/", Some(token), &query.to_query_pairs())
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown users.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn admin_get_user(&self, token: &SecretString, id: UserId) -> Result<AdminUser, BackendError> {
        self.get(&format!("admin/users/{id}/"), Some(token)).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(email = %input.email))]
    pub async fn admin_create_user(
        &self,
        token: &SecretString,
        input: &AdminUserCreate,
    ) -> Result<AdminUser, BackendError> {
        let user: AdminUser = self
            .send_json(Method::POST, "admin/users/", Some(token), input)
            .await?;
        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Forbidden`] when the update includes a role
    /// change.
    #[instrument(skip(self, token, input), fields(user_id = %id))]
    pub async fn admin_update_user(
        &self,
        token: &SecretString,
        id: UserId,
        input: &AdminUserUpdate,
    ) -> Result<AdminUser, BackendError> {
        self.send_json(Method::PATCH, &format!("admin/users/{id}/"), Some(token), input)
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Forbidden`] when deleting your own account.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn admin_delete_user(&self, token: &SecretString, id: UserId) -> Result<(), BackendError> {
        self.delete(&format!("admin/users/{id}/"), Some(token)).await?;
        info!("Deleted user");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn admin_get_user_profile(
        &self,
        token: &SecretString,
        id: UserId,
    ) -> Result<UserProfile, BackendError> {
        self.get(&format!("admin/users/{id}/profile/"), Some(token))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, profile), fields(user_id = %id))]
    pub async fn admin_update_user_profile(
        &self,
        token: &SecretString,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<UserProfile, BackendError> {
        self.send_json(
            Method::PATCH,
            &format!("admin/users/{id}/profile/"),
            Some(token),
            profile,
        )
        .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_products(
        &self,
        token: &SecretString,
        query: &AdminQuery,
    ) -> Result<Page<AdminProduct>, BackendError> {
        self.get_list("admin/products/", Some(token), &query.to_query_pairs())
            .await
    }

    /// Full product, including unavailable ones.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown products.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn admin_get_product(
        &self,
        token: &SecretString,
        id: ProductId,
    ) -> Result<Product, BackendError> {
        self.get(&format!("admin/products/{id}/"), Some(token))
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(species = %input.species_name))]
    pub async fn admin_create_product(
        &self,
        token: &SecretString,
        input: &ProductInput,
    ) -> Result<Product, BackendError> {
        let product: Product = self
            .send_json(Method::POST, "admin/products/", Some(token), input)
            .await?;
        info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn admin_update_product(
        &self,
        token: &SecretString,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, BackendError> {
        let product = self
            .send_json(Method::PUT, &format!("admin/products/{id}/"), Some(token), input)
            .await?;
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn admin_delete_product(
        &self,
        token: &SecretString,
        id: ProductId,
    ) -> Result<(), BackendError> {
        self.delete(&format!("admin/products/{id}/"), Some(token))
            .await?;
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
        info!("Deleted product");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_categories(
        &self,
        token: &SecretString,
        query: &AdminQuery,
    ) -> Result<Page<AdminCategory>, BackendError> {
        self.get_list("admin/categories/", Some(token), &query.to_query_pairs())
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown categories.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn admin_get_category(
        &self,
        token: &SecretString,
        id: CategoryId,
    ) -> Result<AdminCategory, BackendError> {
        self.get(&format!("admin/categories/{id}/"), Some(token))
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn admin_create_category(
        &self,
        token: &SecretString,
        input: &CategoryInput,
    ) -> Result<AdminCategory, BackendError> {
        let category = self
            .send_json(Method::POST, "admin/categories/", Some(token), input)
            .await?;
        self.inner.cache.invalidate(&CacheKey::Categories).await;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(category_id = %id))]
    pub async fn admin_update_category(
        &self,
        token: &SecretString,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<AdminCategory, BackendError> {
        let category = self
            .send_json(Method::PUT, &format!("admin/categories/{id}/"), Some(token), input)
            .await?;
        self.inner.cache.invalidate(&CacheKey::Categories).await;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn admin_delete_category(
        &self,
        token: &SecretString,
        id: CategoryId,
    ) -> Result<(), BackendError> {
        self.delete(&format!("admin/categories/{id}/"), Some(token))
            .await?;
        self.inner.cache.invalidate(&CacheKey::Categories).await;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_orders(
        &self,
        token: &SecretString,
        query: &AdminQuery,
    ) -> Result<Page<AdminOrder>, BackendError> {
        self.get_list("admin/orders/", Some(token), &query.to_query_pairs())
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown orders.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn admin_get_order(
        &self,
        token: &SecretString,
        id: OrderId,
    ) -> Result<AdminOrderDetail, BackendError> {
        self.get(&format!("admin/orders/{id}/"), Some(token)).await
    }

    /// Update status, payment status, tracking and notes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, update), fields(order_id = %id, status = %update.status))]
    pub async fn admin_update_order(
        &self,
        token: &SecretString,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<AdminOrderDetail, BackendError> {
        let order = self
            .send_json(Method::PATCH, &format!("admin/orders/{id}/"), Some(token), update)
            .await?;
        info!("Updated order");
        Ok(order)
    }

    // =========================================================================
    // Articles
    // =========================================================================

    /// Drafts and published articles.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_list_articles(
        &self,
        token: &SecretString,
        query: &AdminQuery,
    ) -> Result<Page<AdminArticle>, BackendError> {
        self.get_list("admin/articles/", Some(token), &query.to_query_pairs())
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown articles.
    #[instrument(skip(self, token), fields(article_id = %id))]
    pub async fn admin_get_article(
        &self,
        token: &SecretString,
        id: ArticleId,
    ) -> Result<AdminArticleDetail, BackendError> {
        self.get(&format!("admin/articles/{id}/"), Some(token))
            .await
    }

    /// The backend sets the author to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(slug = %input.slug))]
    pub async fn admin_create_article(
        &self,
        token: &SecretString,
        input: &ArticleInput,
    ) -> Result<AdminArticleDetail, BackendError> {
        self.send_json(Method::POST, "admin/articles/", Some(token), input)
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Api`] with field errors on validation failure.
    #[instrument(skip(self, token, input), fields(article_id = %id))]
    pub async fn admin_update_article(
        &self,
        token: &SecretString,
        id: ArticleId,
        input: &ArticleInput,
    ) -> Result<AdminArticleDetail, BackendError> {
        self.send_json(Method::PUT, &format!("admin/articles/{id}/"), Some(token), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(article_id = %id))]
    pub async fn admin_delete_article(
        &self,
        token: &SecretString,
        id: ArticleId,
    ) -> Result<(), BackendError> {
        self.delete(&format!("admin/articles/{id}/"), Some(token))
            .await
    }
}
