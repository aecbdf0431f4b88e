//! Cache types for anonymous catalogue responses.

use freshwater_core::ProductId;

use crate::types::{ArticleCategory, Category, Product};

/// Cache key. Only token-free reads are cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    ArticleCategories,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    ArticleCategories(Vec<ArticleCategory>),
    Product(Box<Product>),
}
