//! Product catalogue management.
//!
//! Forms post text; [`ProductFields`] keeps what the operator typed so a
//! failed submission re-renders unchanged, and parses it into a
//! [`ProductInput`] for the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{AdminProduct, AdminQuery, Category, FieldErrors, ProductInput};
use freshwater_core::{CategoryId, DietType, DifficultyLevel, Price, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::form::{is_inline, options, page_number, parse_optional, parse_required};
use crate::models::{
    AdminLayout, Flash, FormData, FormErrors, Pager, SelectOption, set_flash,
};
use crate::state::AppState;

const LIST_PATH: &str = "/products";

// =============================================================================
// Query / Form Types
// =============================================================================

/// Search and filters for the product list.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub is_available: Option<String>,
    pub difficulty_level: Option<String>,
    pub diet_type: Option<String>,
}

/// Product form values as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub species_name: String,
    pub scientific_name: String,
    pub description: String,
    pub price: String,
    pub stock_quantity: String,
    pub is_available: bool,
    pub difficulty_level: String,
    pub min_tank_size_gallons: String,
    pub ph_range_min: String,
    pub ph_range_max: String,
    pub temperature_range_min: String,
    pub temperature_range_max: String,
    pub max_size_inches: String,
    pub lifespan_years: String,
    pub diet_type: String,
    pub compatibility_notes: String,
    pub care_instructions: String,
    pub image_url: String,
    pub seo_title: String,
    pub seo_description: String,
    pub category_ids: Vec<String>,
}

fn text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl From<&ProductInput> for ProductFields {
    fn from(input: &ProductInput) -> Self {
        Self {
            species_name: input.species_name.clone(),
            scientific_name: input.scientific_name.clone(),
            description: input.description.clone(),
            price: input.price.to_plain(),
            stock_quantity: input.stock_quantity.to_string(),
            is_available: input.is_available,
            difficulty_level: input.difficulty_level.as_str().to_string(),
            min_tank_size_gallons: input.min_tank_size_gallons.to_string(),
            ph_range_min: text(input.ph_range_min),
            ph_range_max: text(input.ph_range_max),
            temperature_range_min: text(input.temperature_range_min),
            temperature_range_max: text(input.temperature_range_max),
            max_size_inches: text(input.max_size_inches),
            lifespan_years: text(input.lifespan_years),
            diet_type: input.diet_type.as_str().to_string(),
            compatibility_notes: input.compatibility_notes.clone(),
            care_instructions: input.care_instructions.clone(),
            image_url: input.image_url.clone(),
            seo_title: input.seo_title.clone(),
            seo_description: input.seo_description.clone(),
            category_ids: input.category_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<&FormData> for ProductFields {
    fn from(form: &FormData) -> Self {
        Self {
            species_name: form.text("species_name"),
            scientific_name: form.text("scientific_name"),
            description: form.text("description"),
            price: form.text("price"),
            stock_quantity: form.text("stock_quantity"),
            is_available: form.checked("is_available"),
            difficulty_level: form.text("difficulty_level"),
            min_tank_size_gallons: form.text("min_tank_size_gallons"),
            ph_range_min: form.text("ph_range_min"),
            ph_range_max: form.text("ph_range_max"),
            temperature_range_min: form.text("temperature_range_min"),
            temperature_range_max: form.text("temperature_range_max"),
            max_size_inches: form.text("max_size_inches"),
            lifespan_years: form.text("lifespan_years"),
            diet_type: form.text("diet_type"),
            compatibility_notes: form.text("compatibility_notes"),
            care_instructions: form.text("care_instructions"),
            image_url: form.text("image_url"),
            seo_title: form.text("seo_title"),
            seo_description: form.text("seo_description"),
            category_ids: form.all("category_ids"),
        }
    }
}

impl ProductFields {
    /// Parse and validate into a backend request body.
    ///
    /// # Errors
    ///
    /// Returns every failing field: unparseable numbers first, then the
    /// catalogue rules of [`ProductInput::validate`].
    pub fn parse(&self) -> std::result::Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let number = "Enter a number.";

        let input = ProductInput {
            species_name: self.species_name.clone(),
            scientific_name: self.scientific_name.clone(),
            description: self.description.clone(),
            price: parse_required(
                &mut errors,
                "price",
                &self.price,
                Price::ZERO,
                "Enter a price of 0.00 or more.",
            ),
            stock_quantity: parse_required(
                &mut errors,
                "stock_quantity",
                &self.stock_quantity,
                0,
                "Enter a whole number of 0 or more.",
            ),
            is_available: self.is_available,
            difficulty_level: parse_required(
                &mut errors,
                "difficulty_level",
                &self.difficulty_level,
                DifficultyLevel::Beginner,
                "Choose a difficulty level.",
            ),
            min_tank_size_gallons: parse_required(
                &mut errors,
                "min_tank_size_gallons",
                &self.min_tank_size_gallons,
                0,
                "Tank size must be at least 1 gallon.",
            ),
            ph_range_min: parse_optional::<Decimal>(&mut errors, "ph_range_min", &self.ph_range_min, number),
            ph_range_max: parse_optional::<Decimal>(&mut errors, "ph_range_max", &self.ph_range_max, number),
            temperature_range_min: parse_optional(
                &mut errors,
                "temperature_range_min",
                &self.temperature_range_min,
                "Enter a whole number of °F.",
            ),
            temperature_range_max: parse_optional(
                &mut errors,
                "temperature_range_max",
                &self.temperature_range_max,
                "Enter a whole number of °F.",
            ),
            max_size_inches: parse_optional(&mut errors, "max_size_inches", &self.max_size_inches, number),
            lifespan_years: parse_optional(
                &mut errors,
                "lifespan_years",
                &self.lifespan_years,
                "Enter a whole number of years.",
            ),
            diet_type: parse_required(
                &mut errors,
                "diet_type",
                &self.diet_type,
                DietType::Omnivore,
                "Choose a diet type.",
            ),
            compatibility_notes: self.compatibility_notes.clone(),
            care_instructions: self.care_instructions.clone(),
            image_url: self.image_url.clone(),
            seo_title: self.seo_title.clone(),
            seo_description: self.seo_description.clone(),
            category_ids: self
                .category_ids
                .iter()
                .filter_map(|id| id.parse::<CategoryId>().ok())
                .collect(),
        };

        if let Err(rules) = input.validate() {
            for (field, message) in rules {
                errors.entry(field).or_insert(message);
            }
        }
        if errors.is_empty() { Ok(input) } else { Err(errors) }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: AdminLayout,
    pub products: Vec<AdminProduct>,
    pub pager: Pager,
    pub search: String,
    pub availability_options: Vec<SelectOption>,
    pub difficulty_options: Vec<SelectOption>,
    pub diet_options: Vec<SelectOption>,
}

/// New/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: AdminLayout,
    pub title: String,
    pub action: String,
    pub fields: ProductFields,
    pub errors: FormErrors,
    pub difficulty_options: Vec<SelectOption>,
    pub diet_options: Vec<SelectOption>,
    pub category_options: Vec<SelectOption>,
}

impl ProductFormTemplate {
    fn new(
        layout: AdminLayout,
        title: String,
        action: String,
        fields: ProductFields,
        errors: FormErrors,
        categories: &[Category],
    ) -> Self {
        let difficulty_options = options(
            DifficultyLevel::ALL.iter().map(|d| (d.as_str(), d.label())),
            Some(fields.difficulty_level.as_str()),
        );
        let diet_options = options(
            DietType::ALL.iter().map(|d| (d.as_str(), d.label())),
            Some(fields.diet_type.as_str()),
        );
        let category_options = categories
            .iter()
            .map(|c| {
                let id = c.id.to_string();
                let selected = fields.category_ids.contains(&id);
                SelectOption::new(&id, &c.name, selected)
            })
            .collect();

        Self {
            layout,
            title,
            action,
            fields,
            errors,
            difficulty_options,
            diet_options,
            category_options,
        }
    }
}

fn edit_path(id: ProductId) -> String {
    format!("{LIST_PATH}/{id}")
}

// =============================================================================
// Handlers
// =============================================================================

/// Product list with search, filters and paging.
#[instrument(skip(state, admin, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductsIndexTemplate> {
    let page = page_number(query.page.as_deref());
    let admin_query = AdminQuery::default()
        .page(page)
        .search(query.search.clone())
        .filter("is_available", query.is_available.clone())
        .filter("difficulty_level", query.difficulty_level.clone())
        .filter("diet_type", query.diet_type.clone());

    let products = state
        .backend()
        .admin_list_products(&admin.access_token(), &admin_query)
        .await?;

    let pager = Pager::new(
        LIST_PATH,
        &products,
        page,
        &[
            ("search", query.search.as_deref()),
            ("is_available", query.is_available.as_deref()),
            ("difficulty_level", query.difficulty_level.as_deref()),
            ("diet_type", query.diet_type.as_deref()),
        ],
    );

    Ok(ProductsIndexTemplate {
        layout,
        products: products.results,
        pager,
        search: query.search.unwrap_or_default(),
        availability_options: options(
            [("true", "Available"), ("false", "Unavailable")],
            query.is_available.as_deref(),
        ),
        difficulty_options: options(
            DifficultyLevel::ALL.iter().map(|d| (d.as_str(), d.label())),
            query.difficulty_level.as_deref(),
        ),
        diet_options: options(
            DietType::ALL.iter().map(|d| (d.as_str(), d.label())),
            query.diet_type.as_deref(),
        ),
    })
}

/// Blank product form.
#[instrument(skip(state, _admin, layout))]
pub async fn new(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    layout: AdminLayout,
) -> Result<ProductFormTemplate> {
    let categories = state.backend().list_categories().await?;
    Ok(ProductFormTemplate::new(
        layout,
        "New product".to_string(),
        LIST_PATH.to_string(),
        ProductFields::from(&ProductInput::default()),
        FormErrors::default(),
        &categories,
    ))
}

/// Create a product.
#[instrument(skip(state, admin, session, layout, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let fields = ProductFields::from(&FormData::new(form));
    let errors = match fields.parse() {
        Ok(input) => match state
            .backend()
            .admin_create_product(&admin.access_token(), &input)
            .await
        {
            Ok(product) => {
                info!(product_id = %product.id, "Product created");
                set_flash(&session, Flash::success(format!("Created {}.", product.species_name)))
                    .await?;
                return Ok(Redirect::to(LIST_PATH).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let categories = state.backend().list_categories().await?;
    Ok(ProductFormTemplate::new(
        layout,
        "New product".to_string(),
        LIST_PATH.to_string(),
        fields,
        errors,
        &categories,
    )
    .into_response())
}

/// Edit form for an existing product.
#[instrument(skip(state, admin, layout), fields(product_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let token = admin.access_token();
    let (product, categories) = tokio::try_join!(
        state.backend().admin_get_product(&token, id),
        state.backend().list_categories(),
    )?;

    Ok(ProductFormTemplate::new(
        layout,
        format!("Edit {}", product.species_name),
        edit_path(id),
        ProductFields::from(&ProductInput::from(&product)),
        FormErrors::default(),
        &categories,
    ))
}

/// Update a product.
#[instrument(skip(state, admin, session, layout, form), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<ProductId>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let fields = ProductFields::from(&FormData::new(form));
    let errors = match fields.parse() {
        Ok(input) => match state
            .backend()
            .admin_update_product(&admin.access_token(), id, &input)
            .await
        {
            Ok(product) => {
                set_flash(&session, Flash::success(format!("Saved {}.", product.species_name)))
                    .await?;
                return Ok(Redirect::to(LIST_PATH).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let categories = state.backend().list_categories().await?;
    Ok(ProductFormTemplate::new(
        layout,
        format!("Edit {}", fields.species_name),
        edit_path(id),
        fields,
        errors,
        &categories,
    )
    .into_response())
}

/// Delete a product.
#[instrument(skip(state, admin, session), fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    state
        .backend()
        .admin_delete_product(&admin.access_token(), id)
        .await?;
    set_flash(&session, Flash::success("Product deleted.")).await?;
    Ok(Redirect::to(LIST_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn valid_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("species_name", "Cardinal Tetra"),
            ("scientific_name", "Paracheirodon axelrodi"),
            ("description", "Schooling fish with a red stripe."),
            ("price", "3.49"),
            ("stock_quantity", "120"),
            ("is_available", "on"),
            ("difficulty_level", "intermediate"),
            ("min_tank_size_gallons", "20"),
            ("ph_range_min", "4.5"),
            ("ph_range_max", "6.5"),
            ("temperature_range_min", "76"),
            ("temperature_range_max", "84"),
            ("diet_type", "omnivore"),
            ("care_instructions", "Soft, acidic water."),
            ("category_ids", "6c1f0d2e-2f1a-4b7e-9a3c-1d2e3f4a5b6c"),
        ]
    }

    #[test]
    fn test_valid_form_parses() {
        let input = ProductFields::from(&form(&valid_pairs())).parse().unwrap();
        assert_eq!(input.price, Price::from_cents(349));
        assert_eq!(input.stock_quantity, 120);
        assert!(input.is_available);
        assert_eq!(input.difficulty_level, DifficultyLevel::Intermediate);
        assert_eq!(input.ph_range_min, Some(Decimal::new(45, 1)));
        assert_eq!(input.category_ids.len(), 1);
    }

    #[test]
    fn test_negative_price_and_stock_rejected() {
        let mut pairs = valid_pairs();
        pairs.retain(|(k, _)| *k != "price" && *k != "stock_quantity");
        pairs.push(("price", "-2.00"));
        pairs.push(("stock_quantity", "-1"));
        let errors = ProductFields::from(&form(&pairs)).parse().unwrap_err();
        assert!(errors.contains_key("price"));
        assert!(errors.contains_key("stock_quantity"));
    }

    #[test]
    fn test_ph_and_temperature_ranges_checked() {
        let mut pairs = valid_pairs();
        pairs.retain(|(k, _)| !k.starts_with("ph_") && !k.starts_with("temperature_"));
        pairs.extend([
            ("ph_range_min", "7.5"),
            ("ph_range_max", "15"),
            ("temperature_range_min", "80"),
            ("temperature_range_max", "70"),
        ]);
        let errors = ProductFields::from(&form(&pairs)).parse().unwrap_err();
        assert_eq!(errors.get("ph_range_max").map(String::as_str), Some("pH must be between 0 and 14."));
        assert!(errors.contains_key("temperature_range_max"));
    }

    #[test]
    fn test_required_fields_and_tank_size() {
        let errors = ProductFields::from(&form(&[("price", "1.00"), ("stock_quantity", "1")]))
            .parse()
            .unwrap_err();
        for field in ["species_name", "description", "care_instructions", "min_tank_size_gallons"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_unticked_availability_is_false() {
        let mut pairs = valid_pairs();
        pairs.retain(|(k, _)| *k != "is_available");
        let input = ProductFields::from(&form(&pairs)).parse().unwrap();
        assert!(!input.is_available);
    }

    #[test]
    fn test_fields_round_trip_from_input() {
        let input = ProductFields::from(&form(&valid_pairs())).parse().unwrap();
        let fields = ProductFields::from(&input);
        assert_eq!(fields.price, "3.49");
        assert_eq!(fields.parse().unwrap(), input);
    }
}
