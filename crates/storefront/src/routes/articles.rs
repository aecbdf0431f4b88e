//! Article route handlers.
//!
//! Articles are cursor-paginated by the backend; the cursor from its
//! `next`/`previous` links is passed through our own query string.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use freshwater_backend::{Article, ArticleCategory, ArticleQuery, ArticleSummary};
use serde::Deserialize;
use tracing::{instrument, warn};
use url::form_urlencoded;

use crate::content::{reading_minutes, render_article};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::LayoutContext;
use crate::state::AppState;

/// Query parameters for article listings.
#[derive(Debug, Default, Deserialize)]
pub struct ArticlesQuery {
    /// Category slug.
    pub category: Option<String>,
    pub cursor: Option<String>,
}

/// Article listing template.
#[derive(Template, WebTemplate)]
#[template(path = "articles/index.html")]
pub struct ArticlesIndexTemplate {
    pub layout: LayoutContext,
    pub articles: Vec<ArticleSummary>,
    pub categories: Vec<ArticleCategory>,
    pub current_category: Option<ArticleCategory>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

/// Article detail template.
#[derive(Template, WebTemplate)]
#[template(path = "articles/show.html")]
pub struct ArticleShowTemplate {
    pub layout: LayoutContext,
    pub article: Article,
    pub body_html: String,
    pub reading_minutes: usize,
}

/// Listing URL at `cursor` (first page when `None`), keeping the category
/// filter.
fn page_url(base: &str, category: Option<&str>, cursor: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(slug) = category {
        query.append_pair("category", slug);
    }
    if let Some(cursor) = cursor {
        query.append_pair("cursor", cursor);
    }
    let query = query.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

async fn render_listing(
    state: &AppState,
    layout: LayoutContext,
    category: Option<ArticleCategory>,
    cursor: Option<String>,
    base: &str,
    slug_param: Option<&str>,
) -> Result<ArticlesIndexTemplate> {
    let query = ArticleQuery {
        category: category.as_ref().map(|c| c.id.to_string()),
        cursor: cursor.filter(|c| !c.is_empty()),
    };
    let backend = state.backend();
    let (page, categories) = tokio::join!(
        backend.list_articles(&query),
        backend.list_article_categories()
    );
    let page = page?;
    let categories = categories.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load article categories");
        Vec::new()
    });

    Ok(ArticlesIndexTemplate {
        layout,
        previous_url: page
            .has_previous()
            .then(|| page_url(base, slug_param, page.previous_cursor().as_deref())),
        next_url: page
            .next_cursor()
            .map(|c| page_url(base, slug_param, Some(&c))),
        articles: page.results,
        categories,
        current_category: category,
    })
}

/// Display published articles, optionally filtered by `?category=<slug>`.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: LayoutContext,
    Query(query): Query<ArticlesQuery>,
) -> Result<ArticlesIndexTemplate> {
    let slug = query.category.filter(|s| !s.trim().is_empty());
    let category = match &slug {
        Some(slug) => Some(
            state
                .backend()
                .list_article_categories()
                .await?
                .into_iter()
                .find(|c| &c.slug == slug)
                .ok_or_else(|| AppError::NotFound(format!("article category {slug}")))?,
        ),
        None => None,
    };

    render_listing(
        &state,
        layout,
        category,
        query.cursor,
        "/articles",
        slug.as_deref(),
    )
    .await
}

/// Display one category's articles.
#[instrument(skip(state, layout))]
pub async fn category(
    State(state): State<AppState>,
    layout: LayoutContext,
    Path(slug): Path<String>,
    Query(query): Query<ArticlesQuery>,
) -> Result<ArticlesIndexTemplate> {
    let category = state.backend().get_article_category(&slug).await?;
    let base = format!("/articles/category/{slug}");
    render_listing(&state, layout, Some(category), query.cursor, &base, None).await
}

/// Display an article.
#[instrument(skip(state, layout))]
pub async fn show(
    State(state): State<AppState>,
    layout: LayoutContext,
    Path(slug): Path<String>,
) -> Result<ArticleShowTemplate> {
    let article = state.backend().get_article(&slug).await?;
    Ok(ArticleShowTemplate {
        layout,
        body_html: render_article(&article.content),
        reading_minutes: reading_minutes(&article.content),
        article,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_keeps_category() {
        assert_eq!(
            page_url("/articles", Some("beginner-guides"), Some("cD0yMDI0")),
            "/articles?category=beginner-guides&cursor=cD0yMDI0"
        );
        assert_eq!(
            page_url("/articles/category/plants", None, Some("abc=")),
            "/articles/category/plants?cursor=abc%3D"
        );
    }

    #[test]
    fn test_first_page_url_has_no_cursor() {
        assert_eq!(page_url("/articles", None, None), "/articles");
        assert_eq!(
            page_url("/articles", Some("plants"), None),
            "/articles?category=plants"
        );
    }
}
