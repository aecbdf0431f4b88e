//! Admin API types.
//!
//! Admin list endpoints use page-number pagination (20 per page, at most
//! 100) and return slimmer rows than the public API.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use freshwater_core::slug::{is_slug, slugify};
use freshwater_core::{
    ArticleCategoryId, ArticleId, ArticleStatus, CategoryId, DietType, DifficultyLevel, Email,
    OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, UserId, UserRole,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    FieldErrors, Product, UserProfile, blank_as_none, default_true, max_len, null_as_empty,
    require, validate_password,
};

/// Default admin page size.
pub const ADMIN_PAGE_SIZE: u32 = 20;
/// Largest page size the backend allows.
pub const MAX_ADMIN_PAGE_SIZE: u32 = 100;

/// Paging, search and per-entity filters for an admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl Default for AdminQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: ADMIN_PAGE_SIZE,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl AdminQuery {
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    #[must_use]
    pub fn search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    /// Add a filter; blank values are dropped.
    #[must_use]
    pub fn filter(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.filters.insert(key.to_string(), value);
        }
        self
    }

    /// Query parameters sent to the backend.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            (
                "page_size".to_string(),
                self.page_size.clamp(1, MAX_ADMIN_PAGE_SIZE).to_string(),
            ),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Headline numbers on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub pending_orders: u64,
}

// =============================================================================
// Users
// =============================================================================

/// A user row, with the profile on detail responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl AdminUser {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Body for creating a user. The backend always assigns role `user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl AdminUserCreate {
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "username", &self.username);
        max_len(&mut errors, "username", &self.username, 150);
        if let Err(e) = Email::parse(&self.email) {
            errors.insert("email", e.to_string());
        }
        validate_password(&mut errors, &self.password, &self.password_confirm);
        max_len(&mut errors, "phone", &self.phone, 15);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Body for updating a user.
///
/// `role` is only sent when the operator tried to change it; the backend
/// refuses role changes with 403.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl AdminUserUpdate {
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = Email::parse(&self.email) {
            errors.insert("email", e.to_string());
        }
        max_len(&mut errors, "phone", &self.phone, 15);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// =============================================================================
// Products
// =============================================================================

/// A product row in the admin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProduct {
    pub id: ProductId,
    pub species_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scientific_name: String,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub difficulty_level: DifficultyLevel,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub primary_image_url: Option<String>,
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub species_name: String,
    #[serde(default)]
    pub scientific_name: String,
    pub description: String,
    pub price: Price,
    pub stock_quantity: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub difficulty_level: DifficultyLevel,
    pub min_tank_size_gallons: u32,
    #[serde(default)]
    pub ph_range_min: Option<Decimal>,
    #[serde(default)]
    pub ph_range_max: Option<Decimal>,
    #[serde(default)]
    pub temperature_range_min: Option<i32>,
    #[serde(default)]
    pub temperature_range_max: Option<i32>,
    #[serde(default)]
    pub max_size_inches: Option<Decimal>,
    #[serde(default)]
    pub lifespan_years: Option<u32>,
    pub diet_type: DietType,
    #[serde(default)]
    pub compatibility_notes: String,
    pub care_instructions: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub seo_description: String,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            species_name: String::new(),
            scientific_name: String::new(),
            description: String::new(),
            price: Price::ZERO,
            stock_quantity: 0,
            is_available: true,
            difficulty_level: DifficultyLevel::Beginner,
            min_tank_size_gallons: 10,
            ph_range_min: None,
            ph_range_max: None,
            temperature_range_min: None,
            temperature_range_max: None,
            max_size_inches: None,
            lifespan_years: None,
            diet_type: DietType::Omnivore,
            compatibility_notes: String::new(),
            care_instructions: String::new(),
            image_url: String::new(),
            seo_title: String::new(),
            seo_description: String::new(),
            category_ids: Vec::new(),
        }
    }
}

impl From<&Product> for ProductInput {
    fn from(p: &Product) -> Self {
        Self {
            species_name: p.species_name.clone(),
            scientific_name: p.scientific_name.clone(),
            description: p.description.clone(),
            price: p.price,
            stock_quantity: p.stock_quantity,
            is_available: p.is_available,
            difficulty_level: p.difficulty_level,
            min_tank_size_gallons: p.min_tank_size_gallons,
            ph_range_min: p.ph_range_min,
            ph_range_max: p.ph_range_max,
            temperature_range_min: p.temperature_range_min,
            temperature_range_max: p.temperature_range_max,
            max_size_inches: p.max_size_inches,
            lifespan_years: p.lifespan_years,
            diet_type: p.diet_type,
            compatibility_notes: p.compatibility_notes.clone(),
            care_instructions: p.care_instructions.clone(),
            image_url: p.image_url.clone().unwrap_or_default(),
            seo_title: p.seo_title.clone(),
            seo_description: p.seo_description.clone(),
            category_ids: p.categories.iter().map(|c| c.id).collect(),
        }
    }
}

impl ProductInput {
    /// Check the rules the backend enforces, so errors show before a round trip.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "species_name", &self.species_name);
        require(&mut errors, "description", &self.description);
        require(&mut errors, "care_instructions", &self.care_instructions);
        max_len(&mut errors, "species_name", &self.species_name, 100);
        max_len(&mut errors, "scientific_name", &self.scientific_name, 150);
        max_len(&mut errors, "seo_title", &self.seo_title, 60);
        max_len(&mut errors, "seo_description", &self.seo_description, 160);

        if self.min_tank_size_gallons < 1 {
            errors.insert("min_tank_size_gallons", "Tank size must be at least 1 gallon.".to_string());
        }

        let ph_scale = Decimal::ZERO..=Decimal::from(14);
        for (field, value) in [("ph_range_min", self.ph_range_min), ("ph_range_max", self.ph_range_max)] {
            if let Some(ph) = value
                && !ph_scale.contains(&ph)
            {
                errors.insert(field, "pH must be between 0 and 14.".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.ph_range_min, self.ph_range_max)
            && min > max
        {
            errors
                .entry("ph_range_max")
                .or_insert_with(|| "Maximum pH must not be below the minimum.".to_string());
        }
        if let (Some(min), Some(max)) = (self.temperature_range_min, self.temperature_range_max)
            && min > max
        {
            errors.insert(
                "temperature_range_max",
                "Maximum temperature must not be below the minimum.".to_string(),
            );
        }
        if let Some(size) = self.max_size_inches
            && size <= Decimal::ZERO
        {
            errors.insert("max_size_inches", "Size must be greater than 0.".to_string());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Parent reference: an id on list rows, `{id, name}` on detail responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    Id(CategoryId),
    Named { id: CategoryId, name: String },
}

impl ParentRef {
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        match self {
            Self::Id(id) | Self::Named { id, .. } => *id,
        }
    }
}

/// A category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCategory {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub parent_category: Option<ParentRef>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_category: Option<CategoryId>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Default for CategoryInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            parent_category: None,
            display_order: 0,
            is_active: true,
        }
    }
}

impl From<&AdminCategory> for CategoryInput {
    fn from(c: &AdminCategory) -> Self {
        Self {
            name: c.name.clone(),
            slug: c.slug.clone(),
            description: c.description.clone(),
            parent_category: c.parent_category.as_ref().map(ParentRef::id),
            display_order: c.display_order,
            is_active: c.is_active,
        }
    }
}

impl CategoryInput {
    /// Fill a blank slug from the name.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.slug = if self.slug.trim().is_empty() {
            slugify(&self.name)
        } else {
            self.slug.trim().to_string()
        };
        self
    }

    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name);
        max_len(&mut errors, "name", &self.name, 50);
        max_len(&mut errors, "slug", &self.slug, 50);
        if !is_slug(&self.slug) {
            errors
                .entry("slug")
                .or_insert_with(|| "Use lowercase letters, numbers and hyphens.".to_string());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// An order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOrder {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_name: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Price,
    #[serde(default)]
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Customer summary on an order detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOrderCustomer {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

/// A line on an order detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOrderItem {
    pub id: OrderItemId,
    #[serde(default)]
    pub product: Option<ProductId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

/// Address block on an order detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOrderAddress {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub street_address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub zip_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
}

/// A full order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOrderDetail {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub user: AdminOrderCustomer,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payment_method: String,
    pub total_amount: Price,
    #[serde(default)]
    pub shipping_amount: Price,
    #[serde(default)]
    pub tax_amount: Price,
    #[serde(default)]
    pub discount_amount: Price,
    #[serde(default)]
    pub items: Vec<AdminOrderItem>,
    #[serde(default)]
    pub shipping_address: Option<AdminOrderAddress>,
    #[serde(default)]
    pub billing_address: Option<AdminOrderAddress>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracking_number: String,
    #[serde(default)]
    pub estimated_delivery: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub order_notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for updating an order's fulfilment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub tracking_number: String,
    pub estimated_delivery: Option<NaiveDate>,
    pub order_notes: String,
}

impl From<&AdminOrderDetail> for OrderUpdate {
    fn from(o: &AdminOrderDetail) -> Self {
        Self {
            status: o.status,
            payment_status: o.payment_status,
            tracking_number: o.tracking_number.clone(),
            estimated_delivery: o.estimated_delivery,
            order_notes: o.order_notes.clone(),
        }
    }
}

impl OrderUpdate {
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        max_len(&mut errors, "tracking_number", &self.tracking_number, 50);
        if self.status == OrderStatus::Shipped && self.tracking_number.trim().is_empty() {
            errors.insert(
                "tracking_number",
                "A tracking number is required for shipped orders.".to_string(),
            );
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// =============================================================================
// Articles
// =============================================================================

/// An article row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminArticle {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author_name: String,
    pub status: ArticleStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `{id, name}` reference on admin article detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef<I> {
    pub id: I,
    #[serde(default)]
    pub name: String,
}

/// A full article as the admin API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminArticleDetail {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    pub category: NamedRef<ArticleCategoryId>,
    pub status: ArticleStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meta_description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub featured_image_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub featured_image_alt_text: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    /// Article category id.
    pub category: Option<ArticleCategoryId>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub featured_image_url: String,
    #[serde(default)]
    pub featured_image_alt_text: String,
}

impl From<&AdminArticleDetail> for ArticleInput {
    fn from(a: &AdminArticleDetail) -> Self {
        Self {
            title: a.title.clone(),
            slug: a.slug.clone(),
            content: a.content.clone(),
            excerpt: a.excerpt.clone(),
            category: Some(a.category.id),
            status: a.status,
            meta_title: a.meta_title.clone(),
            meta_description: a.meta_description.clone(),
            featured_image_url: a.featured_image_url.clone(),
            featured_image_alt_text: a.featured_image_alt_text.clone(),
        }
    }
}

impl ArticleInput {
    /// Fill a blank slug from the title.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.slug = if self.slug.trim().is_empty() {
            slugify(&self.title)
        } else {
            self.slug.trim().to_string()
        };
        self
    }

    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", &self.title);
        require(&mut errors, "content", &self.content);
        max_len(&mut errors, "title", &self.title, 200);
        max_len(&mut errors, "meta_title", &self.meta_title, 60);
        max_len(&mut errors, "meta_description", &self.meta_description, 160);
        if self.category.is_none() {
            errors.insert("category", "Choose a category.".to_string());
        }
        if !is_slug(&self.slug) {
            errors
                .entry("slug")
                .or_insert_with(|| "Use lowercase letters, numbers and hyphens.".to_string());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> ProductInput {
        ProductInput {
            species_name: "Bristlenose Pleco".to_string(),
            description: "Hardy algae eater.".to_string(),
            care_instructions: "Provide driftwood.".to_string(),
            price: Price::from_cents(899),
            stock_quantity: 25,
            ph_range_min: Some(Decimal::new(65, 1)),
            ph_range_max: Some(Decimal::new(75, 1)),
            temperature_range_min: Some(73),
            temperature_range_max: Some(81),
            diet_type: DietType::Herbivore,
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_admin_query_pairs() {
        let query = AdminQuery::default()
            .page(3)
            .search(Some("tetra".to_string()))
            .filter("is_available", Some("true".to_string()))
            .filter("difficulty_level", Some(String::new()));
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("page".to_string(), "3".to_string()),
                ("page_size".to_string(), "20".to_string()),
                ("search".to_string(), "tetra".to_string()),
                ("is_available".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_size_capped() {
        let query = AdminQuery {
            page_size: 500,
            ..AdminQuery::default()
        };
        assert!(query.to_query_pairs().contains(&("page_size".to_string(), "100".to_string())));
    }

    #[test]
    fn test_product_valid() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_product_required_fields_and_tank_size() {
        let form = ProductInput {
            min_tank_size_gallons: 0,
            ..ProductInput::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains_key("species_name"));
        assert!(errors.contains_key("description"));
        assert!(errors.contains_key("care_instructions"));
        assert!(errors.contains_key("min_tank_size_gallons"));
    }

    #[test]
    fn test_product_ph_out_of_scale_and_inverted() {
        let mut form = product();
        form.ph_range_min = Some(Decimal::from(15));
        assert!(form.validate().unwrap_err().contains_key("ph_range_min"));

        let mut form = product();
        form.ph_range_min = Some(Decimal::from(8));
        form.ph_range_max = Some(Decimal::from(6));
        assert!(form.validate().unwrap_err().contains_key("ph_range_max"));
    }

    #[test]
    fn test_product_temperature_inverted() {
        let mut form = product();
        form.temperature_range_min = Some(82);
        assert!(form.validate().unwrap_err().contains_key("temperature_range_max"));
    }

    #[test]
    fn test_category_slug_from_name() {
        let form = CategoryInput {
            name: " Goldfish & Koi ".to_string(),
            ..CategoryInput::default()
        }
        .normalized();
        assert_eq!(form.slug, "goldfish-koi");
        assert!(form.validate().is_ok());

        let bad = CategoryInput {
            name: "Cichlids".to_string(),
            slug: "Cichlids!".to_string(),
            ..CategoryInput::default()
        };
        assert!(bad.validate().unwrap_err().contains_key("slug"));
    }

    #[test]
    fn test_article_requires_category_and_content() {
        let form = ArticleInput {
            title: "Aquascaping with Stones".to_string(),
            ..ArticleInput::default()
        }
        .normalized();
        let errors = form.validate().unwrap_err();
        assert!(errors.contains_key("content"));
        assert!(errors.contains_key("category"));
        assert!(!errors.contains_key("slug"));
    }

    #[test]
    fn test_user_create_password_rules() {
        let form = AdminUserCreate {
            username: "shopkeeper".to_string(),
            email: "shop@aquatics.example".to_string(),
            password: "short".to_string(),
            password_confirm: "shorter".to_string(),
            ..AdminUserCreate::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("password_confirm"));
    }

    #[test]
    fn test_user_update_omits_unchanged_role() {
        let update = AdminUserUpdate {
            email: "shop@aquatics.example".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            is_active: true,
            role: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("role").is_none());
    }

    #[test]
    fn test_shipped_order_needs_tracking() {
        let update = OrderUpdate {
            status: OrderStatus::Shipped,
            payment_status: PaymentStatus::Paid,
            tracking_number: String::new(),
            estimated_delivery: None,
            order_notes: String::new(),
        };
        assert!(update.validate().unwrap_err().contains_key("tracking_number"));
    }

    #[test]
    fn test_parent_ref_forms() {
        let id: ParentRef = serde_json::from_str("\"0f8e2d1c-4b3a-4e5f-8a9b-1c2d3e4f5a6b\"").unwrap();
        let named: ParentRef = serde_json::from_str(
            r#"{"id": "0f8e2d1c-4b3a-4e5f-8a9b-1c2d3e4f5a6b", "name": "Community Fish"}"#,
        )
        .unwrap();
        assert_eq!(id.id(), named.id());
    }
}
