//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use freshwater_backend::{ArticleQuery, ArticleSummary, Category, Product};
use freshwater_core::ProductFilter;
use tracing::{instrument, warn};

use crate::filters;
use crate::models::LayoutContext;
use crate::state::AppState;

/// Number of products shown in the featured grid.
const FEATURED_COUNT: usize = 8;
/// Number of articles in the "From the blog" strip.
const LATEST_ARTICLES: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutContext,
    pub featured: Vec<Product>,
    pub categories: Vec<Category>,
    pub articles: Vec<ArticleSummary>,
}

/// Display the home page.
///
/// Each section degrades to empty on backend failure so the page still
/// renders.
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: LayoutContext) -> HomeTemplate {
    let backend = state.backend();
    let filter = ProductFilter::default();
    let article_query = ArticleQuery::default();
    let (products, categories, articles) = tokio::join!(
        backend.list_products(&filter),
        backend.list_categories(),
        backend.list_articles(&article_query),
    );

    let featured = products.map_or_else(
        |e| {
            warn!(error = %e, "Failed to load featured products");
            Vec::new()
        },
        |page| {
            page.results
                .into_iter()
                .filter(Product::is_in_stock)
                .take(FEATURED_COUNT)
                .collect()
        },
    );
    let categories = categories.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load categories");
        Vec::new()
    });
    let articles = articles.map_or_else(
        |e| {
            warn!(error = %e, "Failed to load latest articles");
            Vec::new()
        },
        |page| page.results.into_iter().take(LATEST_ARTICLES).collect(),
    );

    HomeTemplate {
        layout,
        featured,
        categories,
        articles,
    }
}
