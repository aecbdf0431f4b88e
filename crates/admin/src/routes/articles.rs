//! Care-guide articles and article categories.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{
    AdminArticle, AdminQuery, ArticleCategory, ArticleCategoryInput, ArticleInput, FieldErrors,
};
use freshwater_core::{ArticleCategoryId, ArticleId, ArticleStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::form::{is_inline, options, page_number, parse_optional, parse_required};
use crate::models::{AdminLayout, Flash, FormErrors, Pager, SelectOption, set_flash};
use crate::state::AppState;

const LIST_PATH: &str = "/articles";

/// Search and filters for the article list.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Article form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub featured_image_url: String,
    #[serde(default)]
    pub featured_image_alt_text: String,
}

impl From<&ArticleInput> for ArticleForm {
    fn from(input: &ArticleInput) -> Self {
        Self {
            title: input.title.clone(),
            slug: input.slug.clone(),
            content: input.content.clone(),
            excerpt: input.excerpt.clone(),
            category: input.category.map(|id| id.to_string()).unwrap_or_default(),
            status: input.status.as_str().to_string(),
            meta_title: input.meta_title.clone(),
            meta_description: input.meta_description.clone(),
            featured_image_url: input.featured_image_url.clone(),
            featured_image_alt_text: input.featured_image_alt_text.clone(),
        }
    }
}

impl ArticleForm {
    /// Parse and validate; a blank slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn parse(&self) -> std::result::Result<ArticleInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = ArticleInput {
            title: self.title.clone(),
            slug: self.slug.clone(),
            content: self.content.trim().to_string(),
            excerpt: self.excerpt.trim().to_string(),
            category: parse_optional::<ArticleCategoryId>(
                &mut errors,
                "category",
                &self.category,
                "Choose a category.",
            ),
            status: parse_required(
                &mut errors,
                "status",
                &self.status,
                ArticleStatus::Draft,
                "Choose draft or published.",
            ),
            meta_title: self.meta_title.trim().to_string(),
            meta_description: self.meta_description.trim().to_string(),
            featured_image_url: self.featured_image_url.trim().to_string(),
            featured_image_alt_text: self.featured_image_alt_text.trim().to_string(),
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

/// Inline "add a category" form on the article pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleCategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Article list template.
#[derive(Template, WebTemplate)]
#[template(path = "articles/index.html")]
pub struct ArticlesIndexTemplate {
    pub layout: AdminLayout,
    pub articles: Vec<AdminArticle>,
    pub pager: Pager,
    pub search: String,
    pub status_options: Vec<SelectOption>,
    pub category_options: Vec<SelectOption>,
}

/// New/edit article form template.
#[derive(Template, WebTemplate)]
#[template(path = "articles/form.html")]
pub struct ArticleFormTemplate {
    pub layout: AdminLayout,
    pub title: String,
    pub action: String,
    pub form: ArticleForm,
    pub errors: FormErrors,
    pub status_options: Vec<SelectOption>,
    pub category_options: Vec<SelectOption>,
}

impl ArticleFormTemplate {
    fn new(
        layout: AdminLayout,
        title: String,
        action: String,
        form: ArticleForm,
        categories: &[ArticleCategory],
    ) -> Self {
        Self {
            layout,
            title,
            action,
            status_options: status_options(Some(&form.status)),
            category_options: category_options(categories, Some(&form.category)),
            form,
            errors: FormErrors::default(),
        }
    }
}

fn status_options(selected: Option<&str>) -> Vec<SelectOption> {
    options(ArticleStatus::ALL.iter().map(|s| (s.as_str(), s.label())), selected)
}

fn category_options(categories: &[ArticleCategory], selected: Option<&str>) -> Vec<SelectOption> {
    categories
        .iter()
        .map(|c| {
            let id = c.id.to_string();
            SelectOption::new(&id, &c.name, selected == Some(id.as_str()))
        })
        .collect()
}

fn edit_path(id: ArticleId) -> String {
    format!("{LIST_PATH}/{id}")
}

/// Article list with search, filters and paging.
#[instrument(skip(state, admin, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Query(query): Query<ArticleListQuery>,
) -> Result<ArticlesIndexTemplate> {
    let token = admin.access_token();
    let page = page_number(query.page.as_deref());
    let admin_query = AdminQuery::default()
        .page(page)
        .search(query.search.clone())
        .filter("status", query.status.clone())
        .filter("category", query.category.clone());

    let (articles, categories) = tokio::try_join!(
        state.backend().admin_list_articles(&token, &admin_query),
        state.backend().list_article_categories(),
    )?;

    let pager = Pager::new(
        LIST_PATH,
        &articles,
        page,
        &[
            ("search", query.search.as_deref()),
            ("status", query.status.as_deref()),
            ("category", query.category.as_deref()),
        ],
    );

    Ok(ArticlesIndexTemplate {
        layout,
        articles: articles.results,
        pager,
        search: query.search.unwrap_or_default(),
        status_options: status_options(query.status.as_deref()),
        category_options: category_options(&categories, query.category.as_deref()),
    })
}

/// Blank article form.
#[instrument(skip(state, _admin, layout))]
pub async fn new(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    layout: AdminLayout,
) -> Result<ArticleFormTemplate> {
    let categories = state.backend().list_article_categories().await?;
    Ok(ArticleFormTemplate::new(
        layout,
        "New article".to_string(),
        LIST_PATH.to_string(),
        ArticleForm::from(&ArticleInput::default()),
        &categories,
    ))
}

/// Create an article; the backend records the signed-in admin as author.
#[instrument(skip(state, admin, session, layout, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Form(form): Form<ArticleForm>,
) -> Result<Response> {
    let errors = match form.parse() {
        Ok(input) => match state
            .backend()
            .admin_create_article(&admin.access_token(), &input)
            .await
        {
            Ok(article) => {
                info!(article_id = %article.id, status = %article.status, "Article created");
                set_flash(&session, Flash::success(format!("Created \"{}\".", article.title)))
                    .await?;
                return Ok(Redirect::to(LIST_PATH).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let categories = state.backend().list_article_categories().await?;
    let mut page = ArticleFormTemplate::new(
        layout,
        "New article".to_string(),
        LIST_PATH.to_string(),
        form,
        &categories,
    );
    page.errors = errors;
    Ok(page.into_response())
}

/// Edit form for an existing article.
#[instrument(skip(state, admin, layout), fields(article_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Path(id): Path<ArticleId>,
) -> Result<ArticleFormTemplate> {
    let token = admin.access_token();
    let (article, categories) = tokio::try_join!(
        state.backend().admin_get_article(&token, id),
        state.backend().list_article_categories(),
    )?;
    Ok(ArticleFormTemplate::new(
        layout,
        format!("Edit \"{}\"", article.title),
        edit_path(id),
        ArticleForm::from(&ArticleInput::from(&article)),
        &categories,
    ))
}

/// Update an article.
#[instrument(skip(state, admin, session, layout, form), fields(article_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<ArticleId>,
    Form(form): Form<ArticleForm>,
) -> Result<Response> {
    let errors = match form.parse() {
        Ok(input) => match state
            .backend()
            .admin_update_article(&admin.access_token(), id, &input)
            .await
        {
            Ok(article) => {
                set_flash(&session, Flash::success(format!("Saved \"{}\".", article.title)))
                    .await?;
                return Ok(Redirect::to(LIST_PATH).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let categories = state.backend().list_article_categories().await?;
    let title = format!("Edit \"{}\"", form.title.trim());
    let mut page = ArticleFormTemplate::new(layout, title, edit_path(id), form, &categories);
    page.errors = errors;
    Ok(page.into_response())
}

/// Delete an article.
#[instrument(skip(state, admin, session), fields(article_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ArticleId>,
) -> Result<Redirect> {
    state
        .backend()
        .admin_delete_article(&admin.access_token(), id)
        .await?;
    set_flash(&session, Flash::success("Article deleted.")).await?;
    Ok(Redirect::to(LIST_PATH))
}

/// Add an article category, then return to the article list.
#[instrument(skip(state, admin, session, form), fields(name = %form.name))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<ArticleCategoryForm>,
) -> Result<Redirect> {
    let name = form.name.trim();
    if name.is_empty() {
        set_flash(&session, Flash::error("A category name is required.")).await?;
        return Ok(Redirect::to(LIST_PATH));
    }

    let input = ArticleCategoryInput {
        name: name.to_string(),
        description: form.description.trim().to_string(),
    };
    match state
        .backend()
        .create_article_category(&admin.access_token(), &input)
        .await
    {
        Ok(category) => {
            info!(category_id = %category.id, "Article category created");
            set_flash(&session, Flash::success(format!("Added category {}.", category.name)))
                .await?;
        }
        Err(e) if is_inline(&e) => {
            set_flash(&session, Flash::error(e.user_message())).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to(LIST_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ArticleForm {
        ArticleForm {
            title: "Cycling a New Tank".to_string(),
            content: "Start the nitrogen cycle before adding fish.".to_string(),
            category: "8e4c1d7a-2f61-4b53-a7d0-93d4c0b6f2e1".to_string(),
            status: "published".to_string(),
            ..ArticleForm::default()
        }
    }

    #[test]
    fn test_valid_article_parses_with_derived_slug() {
        let input = form().parse().unwrap();
        assert_eq!(input.slug, "cycling-a-new-tank");
        assert_eq!(input.status, ArticleStatus::Published);
        assert!(input.category.is_some());
    }

    #[test]
    fn test_missing_category_and_content() {
        let article = ArticleForm {
            category: String::new(),
            content: "   ".to_string(),
            ..form()
        };
        let errors = article.parse().unwrap_err();
        assert!(errors.contains_key("category"));
        assert!(errors.contains_key("content"));
    }

    #[test]
    fn test_category_options_mark_selection() {
        let categories = vec![
            ArticleCategory {
                id: ArticleCategoryId::new(uuid::Uuid::new_v4()),
                name: "Water Chemistry".to_string(),
                slug: "water-chemistry".to_string(),
                description: String::new(),
            },
            ArticleCategory {
                id: ArticleCategoryId::new(uuid::Uuid::new_v4()),
                name: "Breeding".to_string(),
                slug: "breeding".to_string(),
                description: String::new(),
            },
        ];
        let breeding = categories.last().unwrap().id.to_string();
        let opts = category_options(&categories, Some(&breeding));
        assert_eq!(opts.iter().filter(|o| o.selected).count(), 1);
        assert!(opts.iter().any(|o| o.label == "Breeding" && o.selected));
    }
}
