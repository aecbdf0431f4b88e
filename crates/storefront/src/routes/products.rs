//! Product route handlers.
//!
//! The listing keeps its whole filter state in the query string. Requests
//! whose query is not in canonical form (blank fields, default values,
//! inverted ranges) are redirected to the canonical URL, so the address bar
//! always reflects exactly the filters applied.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawQuery, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{Category, Product};
use freshwater_core::{ActiveFilter, Cart, DietType, DifficultyLevel, ProductFilter, ProductId};
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{LayoutContext, SelectOption, keys};
use crate::state::AppState;

/// Page size of the backend product listing.
pub const PRODUCT_PAGE_SIZE: u32 = 20;

const LISTING_PATH: &str = "/products";

fn category_options(categories: &[Category], selected: Option<&str>) -> Vec<SelectOption> {
    categories
        .iter()
        .filter(|c| c.is_active)
        .map(|c| SelectOption::new(&c.slug, &c.name, selected == Some(c.slug.as_str())))
        .collect()
}

fn difficulty_options(selected: Option<DifficultyLevel>) -> Vec<SelectOption> {
    DifficultyLevel::ALL
        .iter()
        .map(|level| SelectOption::new(level.as_str(), level.label(), selected == Some(*level)))
        .collect()
}

fn diet_options(selected: Option<DietType>) -> Vec<SelectOption> {
    DietType::ALL
        .iter()
        .map(|diet| SelectOption::new(diet.as_str(), diet.label(), selected == Some(*diet)))
        .collect()
}

/// Previous/next links for the listing.
#[derive(Debug, Clone, Default)]
pub struct Pager {
    pub current: u32,
    pub total: u64,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: LayoutContext,
    pub products: Vec<Product>,
    pub count: u64,
    pub filter: ProductFilter,
    pub search_value: String,
    pub categories: Vec<SelectOption>,
    pub difficulties: Vec<SelectOption>,
    pub diets: Vec<SelectOption>,
    pub active_filters: Vec<ActiveFilter>,
    pub pager: Pager,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: LayoutContext,
    pub product: Product,
    /// How many are already in the cart.
    pub in_cart: u32,
    /// How many more can be added.
    pub max_addable: u32,
}

/// Canonical listing URL for `raw_query`, if it differs from the request.
fn canonical_redirect(raw_query: Option<&str>) -> (ProductFilter, Option<String>) {
    let raw = raw_query.unwrap_or_default();
    let filter = ProductFilter::from_query(raw);
    if raw == filter.query_string() {
        (filter, None)
    } else {
        let url = filter.url(LISTING_PATH);
        (filter, Some(url))
    }
}

/// Display the product listing.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: LayoutContext,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let (filter, redirect) = canonical_redirect(query.as_deref());
    if let Some(url) = redirect {
        return Ok(Redirect::to(&url).into_response());
    }

    let backend = state.backend();
    let (page, categories) = tokio::join!(backend.list_products(&filter), backend.list_categories());
    let page = page?;
    let categories = categories.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load categories for filters");
        Vec::new()
    });

    let pager = Pager {
        current: filter.page,
        total: page.total_pages(PRODUCT_PAGE_SIZE),
        previous_url: page
            .previous_page()
            .map(|p| filter.with_page(p).url(LISTING_PATH)),
        next_url: page.next_page().map(|p| filter.with_page(p).url(LISTING_PATH)),
    };

    Ok(ProductsIndexTemplate {
        layout,
        count: page.count,
        products: page.results,
        search_value: filter.search.clone().unwrap_or_default(),
        categories: category_options(&categories, filter.category.as_deref()),
        difficulties: difficulty_options(filter.difficulty),
        diets: diet_options(filter.diet_type),
        active_filters: filter.active_filters(LISTING_PATH),
        filter,
        pager,
    }
    .into_response())
}

/// Display a product detail page.
#[instrument(skip(state, session, layout))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    layout: LayoutContext,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let id: ProductId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))?;
    let product = state.backend().get_product(id).await?;

    let in_cart = session
        .get::<Cart>(keys::CART)
        .await?
        .map_or(0, |cart| cart.quantity_of(id));
    let max_addable = if product.is_available {
        product.stock_quantity.saturating_sub(in_cart)
    } else {
        0
    };

    Ok(ProductShowTemplate {
        layout,
        product,
        in_cart,
        max_addable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_query_is_not_redirected() {
        let (filter, redirect) = canonical_redirect(Some("category=tetras&difficulty=beginner"));
        assert!(redirect.is_none());
        assert_eq!(filter.category.as_deref(), Some("tetras"));
    }

    #[test]
    fn test_empty_query_is_canonical() {
        assert!(canonical_redirect(None).1.is_none());
        assert!(canonical_redirect(Some("")).1.is_none());
    }

    #[test]
    fn test_form_submission_is_canonicalized() {
        let (_, redirect) = canonical_redirect(Some(
            "search=&category=tetras&difficulty=&min_price=0&max_price=50&page=1",
        ));
        assert_eq!(redirect.as_deref(), Some("/products?category=tetras"));
    }

    #[test]
    fn test_all_defaults_redirects_to_bare_listing() {
        let (_, redirect) = canonical_redirect(Some("page=1&temp_min=0"));
        assert_eq!(redirect.as_deref(), Some("/products"));
    }

    #[test]
    fn test_options_mark_selection() {
        let options = difficulty_options(Some(DifficultyLevel::Advanced));
        assert_eq!(options.len(), DifficultyLevel::ALL.len());
        assert_eq!(
            options.iter().filter(|o| o.selected).map(|o| o.value.as_str()).collect::<Vec<_>>(),
            vec!["advanced"]
        );
        assert!(diet_options(None).iter().all(|o| !o.selected));
    }
}
