//! Published articles and article categories.

use freshwater_core::Page;
use reqwest::Method;
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::types::{Article, ArticleCategory, ArticleCategoryInput, ArticleQuery, ArticleSummary};
use crate::{BackendClient, BackendError};

impl BackendClient {
    /// Published articles, newest first. Pages are addressed by opaque
    /// cursor taken from the previous page's links.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_articles(
        &self,
        query: &ArticleQuery,
    ) -> Result<Page<ArticleSummary>, BackendError> {
        self.get_list("articles/", None, query).await
    }

    /// A published article by slug.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown or draft articles.
    #[instrument(skip(self))]
    pub async fn get_article(&self, slug: &str) -> Result<Article, BackendError> {
        self.get(&format!("articles/{slug}/"), None).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_article_categories(&self) -> Result<Vec<ArticleCategory>, BackendError> {
        if let Some(CacheValue::ArticleCategories(categories)) =
            self.inner.cache.get(&CacheKey::ArticleCategories).await
        {
            debug!("Cache hit for article categories");
            return Ok(categories);
        }

        let page: Page<ArticleCategory> = self
            .get_list("article-categories/", None, &[("page_size", "100")])
            .await?;
        let categories = page.results;

        self.inner
            .cache
            .insert(
                CacheKey::ArticleCategories,
                CacheValue::ArticleCategories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown slugs.
    #[instrument(skip(self))]
    pub async fn get_article_category(&self, slug: &str) -> Result<ArticleCategory, BackendError> {
        self.get(&format!("article-categories/{slug}/"), None).await
    }

    /// Create an article category. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Forbidden`] for non-admin tokens.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_article_category(
        &self,
        token: &SecretString,
        input: &ArticleCategoryInput,
    ) -> Result<ArticleCategory, BackendError> {
        let category = self
            .send_json(Method::POST, "article-categories/", Some(token), input)
            .await?;
        self.inner
            .cache
            .invalidate(&CacheKey::ArticleCategories)
            .await;
        Ok(category)
    }
}
