//! Article CMS types.

use chrono::{DateTime, Utc};
use freshwater_core::{ArticleCategoryId, ArticleId, ArticleStatus, UserId};
use serde::{Deserialize, Serialize};

use super::{blank_as_none, null_as_empty};

/// An article category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCategory {
    pub id: ArticleCategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// Author byline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleAuthor {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl ArticleAuthor {
    #[must_use]
    pub fn display_name(&self) -> &str {
        [&self.name, &self.first_name]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or("Freshwater Aquatics", String::as_str)
    }
}

/// An article as listed on index pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub featured_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub featured_image_alt_text: String,
    pub category: ArticleCategory,
    #[serde(default)]
    pub author: ArticleAuthor,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// A full article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    /// Markdown or HTML body.
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub featured_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub featured_image_alt_text: String,
    pub category: ArticleCategory,
    #[serde(default)]
    pub author: ArticleAuthor,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_description: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Page title, preferring the SEO override.
    #[must_use]
    pub fn page_title(&self) -> &str {
        if self.meta_title.is_empty() {
            &self.title
        } else {
            &self.meta_title
        }
    }

    /// Meta description, falling back to the excerpt.
    #[must_use]
    pub fn description(&self) -> &str {
        if self.meta_description.is_empty() {
            &self.excerpt
        } else {
            &self.meta_description
        }
    }
}

/// Query for the public article listing (cursor paginated).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleQuery {
    /// Category id or slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Body of `POST /article-categories/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_article_detail() {
        let json = r#"{
            "id": "5e4f3a2b-1c0d-4e9f-8a7b-6c5d4e3f2a1b",
            "title": "Cycling Your First Tank",
            "slug": "cycling-your-first-tank",
            "content": "Start with **ammonia**.",
            "excerpt": "The nitrogen cycle explained.",
            "featured_image_url": "",
            "featured_image_alt_text": "",
            "category": {"id": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d", "name": "Beginner Guides", "slug": "beginner-guides"},
            "author": {"id": "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11", "name": "Ada Lovelace", "email": "ada@aquatics.example"},
            "status": "published",
            "meta_title": "",
            "meta_description": "",
            "published_at": "2024-05-01T12:00:00Z"
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.page_title(), "Cycling Your First Tank");
        assert_eq!(article.description(), "The nitrogen cycle explained.");
        assert_eq!(article.author.display_name(), "Ada Lovelace");
        assert_eq!(article.featured_image_url, None);
        assert_eq!(article.status, ArticleStatus::Published);
    }

    #[test]
    fn test_author_fallback() {
        assert_eq!(ArticleAuthor::default().display_name(), "Freshwater Aquatics");
        let author = ArticleAuthor {
            first_name: "Ada".to_string(),
            ..ArticleAuthor::default()
        };
        assert_eq!(author.display_name(), "Ada");
    }
}
