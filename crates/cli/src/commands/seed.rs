//! Seed the catalogue through the backend admin API.
//!
//! Reads categories and products from a YAML file, validates the whole file
//! locally, then signs in as an administrator and creates whatever is not
//! already there. Categories are matched by slug and products by species
//! name, so running the command twice creates nothing new.
//!
//! ```yaml
//! categories:
//!   - name: Tetras
//!     description: Small schooling fish.
//!   - name: Dwarf Cichlids
//!     parent: cichlids
//! products:
//!   - species_name: Neon Tetra
//!     scientific_name: Paracheirodon innesi
//!     description: A bright blue and red schooling fish.
//!     care_instructions: Keep in groups of six or more.
//!     price: "2.99"
//!     stock_quantity: 120
//!     difficulty_level: beginner
//!     diet_type: omnivore
//!     min_tank_size_gallons: 10
//!     ph_range_min: "6.0"
//!     ph_range_max: "7.0"
//!     categories: [tetras]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use freshwater_backend::{
    AdminQuery, BackendClient, BackendError, CategoryInput, MAX_ADMIN_PAGE_SIZE, ProductInput,
};
use freshwater_core::CategoryId;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::CommandError;

/// A seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A category entry. `parent` is the slug of another category.
#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

impl SeedCategory {
    /// Request body without the parent, which is resolved at seeding time.
    #[must_use]
    pub fn to_input(&self) -> CategoryInput {
        CategoryInput {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            display_order: self.display_order,
            ..CategoryInput::default()
        }
        .normalized()
    }
}

/// A product entry. `categories` lists category slugs.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: ProductInput,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// What a seeding run did.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub products_created: usize,
    pub products_skipped: usize,
    /// `(entry, message)` for entries the backend refused.
    pub errors: Vec<(String, String)>,
}

/// Check a catalogue before anything is sent.
///
/// Returns one message per problem; empty means the file is usable.
#[must_use]
pub fn validate_catalog(catalog: &SeedCatalog) -> Vec<String> {
    let mut errors = Vec::new();
    let mut slugs = HashSet::new();

    for category in &catalog.categories {
        let input = category.to_input();
        if let Err(fields) = input.validate() {
            for (field, message) in fields {
                errors.push(format!("category {:?}: {field}: {message}", category.name));
            }
        }
        if let Some(parent) = &category.parent
            && !slugs.contains(parent.as_str())
        {
            errors.push(format!(
                "category {:?}: parent {parent:?} must be listed before it",
                category.name
            ));
        }
        if !slugs.insert(input.slug.clone()) {
            errors.push(format!("category {:?}: duplicate slug {:?}", category.name, input.slug));
        }
    }

    let mut species = HashSet::new();
    for entry in &catalog.products {
        let name = &entry.product.species_name;
        if let Err(fields) = entry.product.validate() {
            for (field, message) in fields {
                errors.push(format!("product {name:?}: {field}: {message}"));
            }
        }
        if !species.insert(name.to_lowercase()) {
            errors.push(format!("product {name:?}: listed twice"));
        }
        for slug in &entry.categories {
            if !slugs.contains(slug.as_str()) {
                errors.push(format!("product {name:?}: unknown category {slug:?}"));
            }
        }
    }

    errors
}

/// Load and validate a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a catalogue, or fails
/// validation.
pub async fn load(path: &Path) -> Result<SeedCatalog, CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let catalog: SeedCatalog = serde_yaml::from_str(&content)?;
    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Parsed seed file"
    );

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Validation(errors.len()));
    }
    Ok(catalog)
}

/// Seed `catalog` as the admin identified by `email`.
///
/// # Errors
///
/// Returns an error if sign-in fails, the account is not an admin, or the
/// token stops being accepted. Refused individual entries are reported in
/// the summary instead.
pub async fn run(
    backend: &BackendClient,
    catalog: &SeedCatalog,
    email: &str,
    password: &SecretString,
) -> Result<SeedSummary, CommandError> {
    let auth = backend.login(email, password.expose_secret()).await?;
    if !auth.user.is_admin() {
        backend.logout(&auth.tokens.access, &auth.tokens.refresh).await;
        return Err(CommandError::NotAdmin(email.to_string()));
    }
    info!(email, "Signed in");

    let result = seed(backend, &auth.tokens.access, catalog).await;
    backend.logout(&auth.tokens.access, &auth.tokens.refresh).await;
    result
}

async fn seed(
    backend: &BackendClient,
    token: &SecretString,
    catalog: &SeedCatalog,
) -> Result<SeedSummary, CommandError> {
    let mut summary = SeedSummary::default();

    let all = AdminQuery {
        page_size: MAX_ADMIN_PAGE_SIZE,
        ..AdminQuery::default()
    };
    let mut category_ids: HashMap<String, CategoryId> = backend
        .admin_list_categories(token, &all)
        .await?
        .results
        .into_iter()
        .map(|c| (c.slug, c.id))
        .collect();

    for category in &catalog.categories {
        let mut input = category.to_input();
        if category_ids.contains_key(&input.slug) {
            summary.categories_skipped += 1;
            continue;
        }
        input.parent_category = category
            .parent
            .as_ref()
            .and_then(|slug| category_ids.get(slug).copied());

        match backend.admin_create_category(token, &input).await {
            Ok(created) => {
                info!(slug = %created.slug, "Created category");
                category_ids.insert(created.slug, created.id);
                summary.categories_created += 1;
            }
            Err(e) => record(&mut summary, &category.name, e)?,
        }
    }

    for entry in &catalog.products {
        let name = &entry.product.species_name;
        let query = AdminQuery::default().search(Some(name.clone()));
        let existing = backend.admin_list_products(token, &query).await?;
        if existing
            .results
            .iter()
            .any(|p| p.species_name.eq_ignore_ascii_case(name))
        {
            summary.products_skipped += 1;
            continue;
        }

        let mut input = entry.product.clone();
        input.category_ids = entry
            .categories
            .iter()
            .filter_map(|slug| category_ids.get(slug).copied())
            .collect();

        match backend.admin_create_product(token, &input).await {
            Ok(created) => {
                info!(product_id = %created.id, species = %name, "Created product");
                summary.products_created += 1;
            }
            Err(e) => record(&mut summary, name, e)?,
        }
    }

    Ok(summary)
}

/// Note a refused entry; a rejected token ends the run.
fn record(summary: &mut SeedSummary, entry: &str, e: BackendError) -> Result<(), CommandError> {
    if e.is_unauthorized() {
        return Err(e.into());
    }
    warn!(entry, error = %e, "Backend refused entry");
    summary.errors.push((entry.to_string(), e.user_message()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshwater_core::{DietType, DifficultyLevel, Price};

    use super::*;

    const CATALOG: &str = r#"
categories:
  - name: Tetras
    description: Small schooling fish.
  - name: Cichlids
  - name: Dwarf Cichlids
    parent: cichlids
products:
  - species_name: Neon Tetra
    scientific_name: Paracheirodon innesi
    description: A bright blue and red schooling fish.
    care_instructions: Keep in groups of six or more.
    price: "2.99"
    stock_quantity: 120
    difficulty_level: beginner
    diet_type: omnivore
    min_tank_size_gallons: 10
    ph_range_min: "6.0"
    ph_range_max: "7.0"
    categories: [tetras]
"#;

    #[test]
    fn test_catalog_parses_and_validates() {
        let catalog: SeedCatalog = serde_yaml::from_str(CATALOG).unwrap();
        assert_eq!(catalog.categories.len(), 3);
        let neon = catalog.products.first().unwrap();
        assert_eq!(neon.product.price, Price::from_cents(299));
        assert_eq!(neon.product.difficulty_level, DifficultyLevel::Beginner);
        assert_eq!(neon.product.diet_type, DietType::Omnivore);
        assert_eq!(neon.categories, vec!["tetras".to_string()]);
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_unknown_and_forward_references_rejected() {
        let yaml = r#"
categories:
  - name: Dwarf Cichlids
    parent: cichlids
  - name: Cichlids
products:
  - species_name: Kuhli Loach
    description: Eel-like bottom dweller.
    care_instructions: Soft sand substrate.
    price: "4.50"
    stock_quantity: 30
    difficulty_level: intermediate
    diet_type: carnivore
    min_tank_size_gallons: 20
    categories: [loaches]
"#;
        let catalog: SeedCatalog = serde_yaml::from_str(yaml).unwrap();
        let errors = validate_catalog(&catalog);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("must be listed before")));
        assert!(errors.iter().any(|e| e.contains("unknown category \"loaches\"")));
    }

    #[test]
    fn test_product_rules_apply_to_seed_entries() {
        let yaml = r#"
products:
  - species_name: Cardinal Tetra
    description: Deeper red than the neon.
    care_instructions: Soft acidic water.
    price: "3.49"
    stock_quantity: 60
    difficulty_level: intermediate
    diet_type: omnivore
    min_tank_size_gallons: 0
    ph_range_min: "7.5"
    ph_range_max: "5.5"
  - species_name: cardinal tetra
    description: Duplicate.
    care_instructions: Duplicate.
    price: "3.49"
    stock_quantity: 1
    difficulty_level: intermediate
    diet_type: omnivore
    min_tank_size_gallons: 10
"#;
        let catalog: SeedCatalog = serde_yaml::from_str(yaml).unwrap();
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("min_tank_size_gallons")));
        assert!(errors.iter().any(|e| e.contains("ph_range_max")));
        assert!(errors.iter().any(|e| e.contains("listed twice")));
    }

    #[tokio::test]
    async fn test_shipped_seed_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("seed/catalog.yaml");
        let catalog = load(&path).await.unwrap();
        assert!(!catalog.products.is_empty());
    }
}
