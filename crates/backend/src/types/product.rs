//! Catalogue types.

use chrono::{DateTime, Utc};
use freshwater_core::{CartProduct, CategoryId, DietType, DifficultyLevel, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{blank_as_none, default_true, null_as_empty};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_category: Option<CategoryId>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A fish species for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub species_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scientific_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub difficulty_level: DifficultyLevel,
    #[serde(default)]
    pub min_tank_size_gallons: u32,
    #[serde(default)]
    pub ph_range_min: Option<Decimal>,
    #[serde(default)]
    pub ph_range_max: Option<Decimal>,
    /// °F.
    #[serde(default)]
    pub temperature_range_min: Option<i32>,
    #[serde(default)]
    pub temperature_range_max: Option<i32>,
    #[serde(default)]
    pub max_size_inches: Option<Decimal>,
    #[serde(default)]
    pub lifespan_years: Option<u32>,
    pub diet_type: DietType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub compatibility_notes: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub care_instructions: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub seo_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub seo_description: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.is_available && self.stock_quantity > 0
    }

    /// The snapshot a cart line keeps.
    #[must_use]
    pub fn to_cart_product(&self) -> CartProduct {
        CartProduct {
            id: self.id,
            name: self.species_name.clone(),
            scientific_name: Some(self.scientific_name.clone()).filter(|s| !s.is_empty()),
            price: self.price,
            image_url: self.image_url.clone(),
        }
    }

    /// "6.5 - 7.5" when both ends are known.
    #[must_use]
    pub fn ph_range(&self) -> Option<String> {
        match (self.ph_range_min, self.ph_range_max) {
            (Some(min), Some(max)) => Some(format!("{} - {}", min.normalize(), max.normalize())),
            _ => None,
        }
    }

    /// "72°F - 78°F" when both ends are known.
    #[must_use]
    pub fn temperature_range(&self) -> Option<String> {
        match (self.temperature_range_min, self.temperature_range_max) {
            (Some(min), Some(max)) => Some(format!("{min}°F - {max}°F")),
            _ => None,
        }
    }

    /// Page title, preferring the SEO override.
    #[must_use]
    pub fn page_title(&self) -> &str {
        if self.seo_title.is_empty() {
            &self.species_name
        } else {
            &self.seo_title
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NEON_TETRA: &str = r#"{
        "id": "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11",
        "species_name": "Neon Tetra",
        "scientific_name": "Paracheirodon innesi",
        "description": "Small, peaceful schooling fish.",
        "price": "2.99",
        "stock_quantity": 150,
        "is_available": true,
        "difficulty_level": "beginner",
        "min_tank_size_gallons": 10,
        "ph_range_min": "5.8",
        "ph_range_max": "7.0",
        "temperature_range_min": 72,
        "temperature_range_max": 78,
        "max_size_inches": "1.5",
        "lifespan_years": 5,
        "diet_type": "omnivore",
        "compatibility_notes": "",
        "care_instructions": "Keep in groups of six or more.",
        "image_url": "",
        "additional_images": [],
        "seo_title": "",
        "seo_description": "",
        "categories": [{"id": "0f8e2d1c-4b3a-4e5f-8a9b-1c2d3e4f5a6b", "name": "Tetras & Barbs", "slug": "tetras-barbs", "description": "", "image_url": "", "parent_category": null, "display_order": 3, "is_active": true}],
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-01T12:00:00Z"
    }"#;

    #[test]
    fn test_deserialize_product() {
        let product: Product = serde_json::from_str(NEON_TETRA).unwrap();
        assert_eq!(product.species_name, "Neon Tetra");
        assert_eq!(product.price, Price::from_cents(299));
        assert_eq!(product.image_url, None);
        assert_eq!(product.categories.len(), 1);
        assert_eq!(product.ph_range().as_deref(), Some("5.8 - 7"));
        assert_eq!(product.temperature_range().as_deref(), Some("72°F - 78°F"));
        assert!(product.is_in_stock());
        assert_eq!(product.page_title(), "Neon Tetra");
    }

    #[test]
    fn test_to_cart_product() {
        let product: Product = serde_json::from_str(NEON_TETRA).unwrap();
        let snapshot = product.to_cart_product();
        assert_eq!(snapshot.id, product.id);
        assert_eq!(snapshot.name, "Neon Tetra");
        assert_eq!(snapshot.scientific_name.as_deref(), Some("Paracheirodon innesi"));
    }

    #[test]
    fn test_out_of_stock() {
        let mut product: Product = serde_json::from_str(NEON_TETRA).unwrap();
        product.stock_quantity = 0;
        assert!(!product.is_in_stock());
        product.stock_quantity = 3;
        product.is_available = false;
        assert!(!product.is_in_stock());
    }
}
