//! Product category management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{
    AdminCategory, AdminQuery, BackendClient, BackendError, CategoryInput, FieldErrors,
    MAX_ADMIN_PAGE_SIZE,
};
use freshwater_core::CategoryId;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::form::{checkbox, is_inline, options, page_number, parse_required};
use crate::models::{AdminLayout, Flash, FormErrors, Pager, SelectOption, set_flash};
use crate::state::AppState;

const LIST_PATH: &str = "/categories";

/// Search and filters for the category list.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<String>,
    pub parent_category: Option<String>,
}

/// Category form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_category: String,
    #[serde(default)]
    pub display_order: String,
    pub is_active: Option<String>,
}

impl From<&CategoryInput> for CategoryForm {
    fn from(input: &CategoryInput) -> Self {
        Self {
            name: input.name.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            parent_category: input
                .parent_category
                .map(|id| id.to_string())
                .unwrap_or_default(),
            display_order: input.display_order.to_string(),
            is_active: input.is_active.then(|| "on".to_string()),
        }
    }
}

impl CategoryForm {
    #[must_use]
    pub fn is_active(&self) -> bool {
        checkbox(self.is_active.as_deref())
    }

    /// Parse and validate; a blank slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn parse(&self) -> std::result::Result<CategoryInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let parent_category = match self.parent_category.trim() {
            "" => None,
            raw => Some(parse_required(
                &mut errors,
                "parent_category",
                raw,
                CategoryId::new(uuid::Uuid::nil()),
                "Choose a parent category.",
            )),
        };
        let display_order = if self.display_order.trim().is_empty() {
            0
        } else {
            parse_required(
                &mut errors,
                "display_order",
                &self.display_order,
                0,
                "Enter a whole number.",
            )
        };

        let input = CategoryInput {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.trim().to_string(),
            parent_category,
            display_order,
            is_active: self.is_active(),
        }
        .normalized();

        if let Err(rules) = input.validate() {
            for (field, message) in rules {
                errors.entry(field).or_insert(message);
            }
        }
        if errors.is_empty() { Ok(input) } else { Err(errors) }
    }
}

/// Category list template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: AdminLayout,
    pub categories: Vec<AdminCategory>,
    pub pager: Pager,
    pub search: String,
    pub status_options: Vec<SelectOption>,
    pub parent_options: Vec<SelectOption>,
}

/// New/edit category form template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub layout: AdminLayout,
    pub title: String,
    pub action: String,
    pub form: CategoryForm,
    pub errors: FormErrors,
    pub parent_options: Vec<SelectOption>,
}

/// Every category, for parent pickers.
async fn all_categories(
    backend: &BackendClient,
    token: &SecretString,
) -> std::result::Result<Vec<AdminCategory>, BackendError> {
    let query = AdminQuery {
        page_size: MAX_ADMIN_PAGE_SIZE,
        ..AdminQuery::default()
    };
    Ok(backend.admin_list_categories(token, &query).await?.results)
}

/// Parent choices, leaving out the category being edited.
fn parent_options(
    categories: &[AdminCategory],
    exclude: Option<CategoryId>,
    selected: &str,
) -> Vec<SelectOption> {
    categories
        .iter()
        .filter(|c| Some(c.id) != exclude)
        .map(|c| {
            let id = c.id.to_string();
            SelectOption::new(&id, &c.name, id == selected)
        })
        .collect()
}

fn edit_path(id: CategoryId) -> String {
    format!("{LIST_PATH}/{id}")
}

/// Category list with search, filters and paging.
#[instrument(skip(state, admin, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Query(query): Query<CategoryListQuery>,
) -> Result<CategoriesIndexTemplate> {
    let token = admin.access_token();
    let page = page_number(query.page.as_deref());
    let admin_query = AdminQuery::default()
        .page(page)
        .search(query.search.clone())
        .filter("is_active", query.is_active.clone())
        .filter("parent_category", query.parent_category.clone());

    let (categories, parents) = tokio::try_join!(
        state.backend().admin_list_categories(&token, &admin_query),
        all_categories(state.backend(), &token),
    )?;

    let pager = Pager::new(
        LIST_PATH,
        &categories,
        page,
        &[
            ("search", query.search.as_deref()),
            ("is_active", query.is_active.as_deref()),
            ("parent_category", query.parent_category.as_deref()),
        ],
    );

    Ok(CategoriesIndexTemplate {
        layout,
        categories: categories.results,
        pager,
        search: query.search.unwrap_or_default(),
        status_options: options(
            [("true", "Active"), ("false", "Inactive")],
            query.is_active.as_deref(),
        ),
        parent_options: parent_options(
            &parents,
            None,
            query.parent_category.as_deref().unwrap_or_default(),
        ),
    })
}

/// Blank category form.
#[instrument(skip(state, admin, layout))]
pub async fn new(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
) -> Result<CategoryFormTemplate> {
    let parents = all_categories(state.backend(), &admin.access_token()).await?;
    Ok(CategoryFormTemplate {
        layout,
        title: "New category".to_string(),
        action: LIST_PATH.to_string(),
        form: CategoryForm::from(&CategoryInput::default()),
        errors: FormErrors::default(),
        parent_options: parent_options(&parents, None, ""),
    })
}

/// Create a category.
#[instrument(skip(state, admin, session, layout, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let token = admin.access_token();
    let errors = match form.parse() {
        Ok(input) => match state.backend().admin_create_category(&token, &input).await {
            Ok(category) => {
                info!(category_id = %category.id, "Category created");
                set_flash(&session, Flash::success(format!("Created {}.", category.name)))
                    .await?;
                return Ok(Redirect::to(LIST_PATH).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let parents = all_categories(state.backend(), &token).await?;
    let parent_options = parent_options(&parents, None, &form.parent_category);
    Ok(CategoryFormTemplate {
        layout,
        title: "New category".to_string(),
        action: LIST_PATH.to_string(),
        form,
        errors,
        parent_options,
    }
    .into_response())
}

/// Edit form for an existing category.
#[instrument(skip(state, admin, layout), fields(category_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Path(id): Path<CategoryId>,
) -> Result<CategoryFormTemplate> {
    let token = admin.access_token();
    let (category, parents) = tokio::try_join!(
        state.backend().admin_get_category(&token, id),
        all_categories(state.backend(), &token),
    )?;
    let form = CategoryForm::from(&CategoryInput::from(&category));

    Ok(CategoryFormTemplate {
        layout,
        title: format!("Edit {}", category.name),
        action: edit_path(id),
        parent_options: parent_options(&parents, Some(id), &form.parent_category),
        form,
        errors: FormErrors::default(),
    })
}

/// Update a category.
#[instrument(skip(state, admin, session, layout, form), fields(category_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let token = admin.access_token();
    let errors = match form.parse() {
        Ok(input) => match state.backend().admin_update_category(&token, id, &input).await {
            Ok(category) => {
                set_flash(&session, Flash::success(format!("Saved {}.", category.name))).await?;
                return Ok(Redirect::to(LIST_PATH).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let parents = all_categories(state.backend(), &token).await?;
    let parent_options = parent_options(&parents, Some(id), &form.parent_category);
    Ok(CategoryFormTemplate {
        layout,
        title: format!("Edit {}", form.name.trim()),
        action: edit_path(id),
        form,
        errors,
        parent_options,
    }
    .into_response())
}

/// Delete a category.
#[instrument(skip(state, admin, session), fields(category_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Redirect> {
    state
        .backend()
        .admin_delete_category(&admin.access_token(), id)
        .await?;
    set_flash(&session, Flash::success("Category deleted.")).await?;
    Ok(Redirect::to(LIST_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_slug_derived_from_name() {
        let form = CategoryForm {
            name: "  Live Plants ".to_string(),
            is_active: Some("on".to_string()),
            ..CategoryForm::default()
        };
        let input = form.parse().unwrap();
        assert_eq!(input.name, "Live Plants");
        assert_eq!(input.slug, "live-plants");
        assert_eq!(input.display_order, 0);
        assert!(input.is_active);
        assert!(input.parent_category.is_none());
    }

    #[test]
    fn test_bad_numbers_and_slug_reported() {
        let form = CategoryForm {
            name: "Catfish".to_string(),
            slug: "Cat Fish!".to_string(),
            parent_category: "not-a-uuid".to_string(),
            display_order: "first".to_string(),
            ..CategoryForm::default()
        };
        let errors = form.parse().unwrap_err();
        assert!(errors.contains_key("slug"));
        assert!(errors.contains_key("parent_category"));
        assert!(errors.contains_key("display_order"));
    }

    #[test]
    fn test_parent_options_skip_self() {
        let category = |name: &str| AdminCategory {
            id: CategoryId::new(uuid::Uuid::new_v4()),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: String::new(),
            parent_category: None,
            parent_name: None,
            display_order: 0,
            is_active: true,
            product_count: 0,
            created_at: None,
        };
        let tetras = category("Tetras");
        let cichlids = category("Cichlids");
        let all = vec![tetras.clone(), cichlids.clone()];
        let opts = parent_options(&all, Some(tetras.id), &cichlids.id.to_string());
        assert_eq!(opts.len(), 1);
        assert!(opts.first().unwrap().selected);
    }
}
