//! Product listing filter state and its query-string form.
//!
//! The listing page keeps every filter in the URL so results can be
//! bookmarked and shared. The same pairs are forwarded verbatim to the
//! backend's `/products/` endpoint, so the parameter names here are the
//! backend's names.

use rust_decimal::Decimal;
use serde::Serialize;
use url::form_urlencoded;

use crate::types::{DietType, DifficultyLevel};

/// Default upper bound of the price slider, in dollars.
pub const DEFAULT_MAX_PRICE: u32 = 50;
/// Default lower bound of the temperature slider, in °F.
pub const DEFAULT_TEMP_MIN: u32 = 0;
/// Default upper bound of the temperature slider, in °F.
pub const DEFAULT_TEMP_MAX: u32 = 100;
/// Default upper bound of the adult size slider, in inches.
pub const DEFAULT_MAX_SIZE: u32 = 50;
/// Upper bound of the pH scale.
pub const PH_SCALE_MAX: u32 = 14;

/// Filter state for the product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Minimum tank size in gallons (0 = any).
    pub min_tank_size: u32,
    pub ph_min: Decimal,
    pub ph_max: Decimal,
    pub temp_min: u32,
    pub temp_max: u32,
    pub diet_type: Option<DietType>,
    /// Maximum adult size in inches.
    pub max_size: u32,
    pub page: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            difficulty: None,
            min_price: Decimal::ZERO,
            max_price: Decimal::from(DEFAULT_MAX_PRICE),
            min_tank_size: 0,
            ph_min: Decimal::ZERO,
            ph_max: Decimal::from(PH_SCALE_MAX),
            temp_min: DEFAULT_TEMP_MIN,
            temp_max: DEFAULT_TEMP_MAX,
            diet_type: None,
            max_size: DEFAULT_MAX_SIZE,
            page: 1,
        }
    }
}

/// A filter currently narrowing the listing, rendered as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub label: String,
    /// Listing URL with this filter removed.
    pub remove_url: String,
}

impl ProductFilter {
    /// Parse filter state from a raw query string.
    ///
    /// Blank values are unset, unparseable values are ignored, pH is clamped
    /// to 0–14 and inverted ranges are swapped. Never fails.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut filter = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "search" => filter.search = Some(value.to_string()),
                "category" => filter.category = Some(value.to_string()),
                "difficulty" => {
                    if let Ok(level) = value.parse() {
                        filter.difficulty = Some(level);
                    }
                }
                "diet_type" => {
                    if let Ok(diet) = value.parse() {
                        filter.diet_type = Some(diet);
                    }
                }
                "min_price" => set_amount(&mut filter.min_price, value),
                "max_price" => set_amount(&mut filter.max_price, value),
                "ph_min" => set_amount(&mut filter.ph_min, value),
                "ph_max" => set_amount(&mut filter.ph_max, value),
                "min_tank_size" => set_whole(&mut filter.min_tank_size, value),
                "temp_min" => set_whole(&mut filter.temp_min, value),
                "temp_max" => set_whole(&mut filter.temp_max, value),
                "max_size" => set_whole(&mut filter.max_size, value),
                "page" => set_whole(&mut filter.page, value),
                _ => {}
            }
        }
        filter.normalized()
    }

    /// Apply clamping and range ordering.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let ph_cap = Decimal::from(PH_SCALE_MAX);
        self.ph_min = self.ph_min.clamp(Decimal::ZERO, ph_cap);
        self.ph_max = self.ph_max.clamp(Decimal::ZERO, ph_cap);
        if self.ph_min > self.ph_max {
            std::mem::swap(&mut self.ph_min, &mut self.ph_max);
        }
        if self.min_price > self.max_price {
            std::mem::swap(&mut self.min_price, &mut self.max_price);
        }
        if self.temp_min > self.temp_max {
            std::mem::swap(&mut self.temp_min, &mut self.temp_max);
        }
        self.page = self.page.max(1);
        self.search = self.search.filter(|s| !s.trim().is_empty());
        self.category = self.category.filter(|s| !s.trim().is_empty());
        self
    }

    /// Non-default fields as backend query parameters, in a fixed order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let defaults = Self::default();
        let mut pairs = Vec::new();

        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.as_str().to_string()));
        }
        if self.min_price != defaults.min_price {
            pairs.push(("min_price", decimal_param(self.min_price)));
        }
        if self.max_price != defaults.max_price {
            pairs.push(("max_price", decimal_param(self.max_price)));
        }
        if self.min_tank_size != defaults.min_tank_size {
            pairs.push(("min_tank_size", self.min_tank_size.to_string()));
        }
        if self.ph_min != defaults.ph_min {
            pairs.push(("ph_min", decimal_param(self.ph_min)));
        }
        if self.ph_max != defaults.ph_max {
            pairs.push(("ph_max", decimal_param(self.ph_max)));
        }
        if self.temp_min != defaults.temp_min {
            pairs.push(("temp_min", self.temp_min.to_string()));
        }
        if self.temp_max != defaults.temp_max {
            pairs.push(("temp_max", self.temp_max.to_string()));
        }
        if let Some(diet) = self.diet_type {
            pairs.push(("diet_type", diet.as_str().to_string()));
        }
        if self.max_size != defaults.max_size {
            pairs.push(("max_size", self.max_size.to_string()));
        }
        if self.page != defaults.page {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }

    /// Form-urlencoded query string; empty when every field is default.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// `base` with this filter's query string appended.
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        let query = self.query_string();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }

    /// The same filter on page 1.
    #[must_use]
    pub fn without_page(&self) -> Self {
        Self {
            page: 1,
            ..self.clone()
        }
    }

    /// The same filter on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Reset every field.
    #[must_use]
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Whether any field other than `page` narrows the listing.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.without_page() != Self::default()
    }

    /// Chips for every active filter, each linking to the listing without it.
    #[must_use]
    pub fn active_filters(&self, base: &str) -> Vec<ActiveFilter> {
        let defaults = Self::default();
        let base_filter = self.without_page();
        let mut chips = Vec::new();
        let mut push = |label: String, reset: &dyn Fn(&mut Self)| {
            let mut without = base_filter.clone();
            reset(&mut without);
            chips.push(ActiveFilter {
                label,
                remove_url: without.url(base),
            });
        };

        if let Some(search) = &self.search {
            push(format!("Search: {search}"), &|f| f.search = None);
        }
        if let Some(category) = &self.category {
            push(format!("Category: {category}"), &|f| f.category = None);
        }
        if let Some(difficulty) = self.difficulty {
            push(format!("Difficulty: {}", difficulty.label()), &|f| {
                f.difficulty = None;
            });
        }
        if self.min_price != defaults.min_price || self.max_price != defaults.max_price {
            push(
                format!(
                    "Price: ${} - ${}",
                    decimal_param(self.min_price),
                    decimal_param(self.max_price)
                ),
                &|f| {
                    f.min_price = defaults.min_price;
                    f.max_price = defaults.max_price;
                },
            );
        }
        if self.min_tank_size != defaults.min_tank_size {
            push(format!("Tank: {}+ gal", self.min_tank_size), &|f| {
                f.min_tank_size = defaults.min_tank_size;
            });
        }
        if self.ph_min != defaults.ph_min || self.ph_max != defaults.ph_max {
            push(
                format!(
                    "pH: {} - {}",
                    decimal_param(self.ph_min),
                    decimal_param(self.ph_max)
                ),
                &|f| {
                    f.ph_min = defaults.ph_min;
                    f.ph_max = defaults.ph_max;
                },
            );
        }
        if self.temp_min != defaults.temp_min || self.temp_max != defaults.temp_max {
            push(format!("Temp: {}°F - {}°F", self.temp_min, self.temp_max), &|f| {
                f.temp_min = defaults.temp_min;
                f.temp_max = defaults.temp_max;
            });
        }
        if let Some(diet) = self.diet_type {
            push(format!("Diet: {}", diet.label()), &|f| f.diet_type = None);
        }
        if self.max_size != defaults.max_size {
            push(format!("Max size: {} in", self.max_size), &|f| {
                f.max_size = defaults.max_size;
            });
        }
        chips
    }
}

fn set_amount(field: &mut Decimal, value: &str) {
    match value.parse::<Decimal>() {
        Ok(amount) if !amount.is_sign_negative() => *field = amount,
        _ => {}
    }
}

fn set_whole(field: &mut u32, value: &str) {
    if let Ok(n) = value.parse::<u32>() {
        *field = n;
    }
}

fn decimal_param(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_has_empty_query() {
        assert_eq!(ProductFilter::default().query_string(), "");
        assert_eq!(ProductFilter::default().url("/products"), "/products");
        assert!(!ProductFilter::default().is_filtered());
    }

    #[test]
    fn test_pairs_in_fixed_order() {
        let filter = ProductFilter {
            page: 2,
            max_size: 4,
            diet_type: Some(DietType::Omnivore),
            search: Some("tetra".to_string()),
            difficulty: Some(DifficultyLevel::Beginner),
            ph_min: Decimal::new(65, 1),
            ..ProductFilter::default()
        };
        let keys: Vec<_> = filter.to_query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["search", "difficulty", "ph_min", "diet_type", "max_size", "page"]
        );
        assert_eq!(
            filter.query_string(),
            "search=tetra&difficulty=beginner&ph_min=6.5&diet_type=omnivore&max_size=4&page=2"
        );
    }

    #[test]
    fn test_parse_is_lenient() {
        let filter = ProductFilter::from_query(
            "search=&min_price=abc&max_price=20&min_tank_size=-3&difficulty=expert&temp_min=72",
        );
        assert_eq!(filter.search, None);
        assert_eq!(filter.min_price, Decimal::ZERO);
        assert_eq!(filter.max_price, Decimal::from(20));
        assert_eq!(filter.min_tank_size, 0);
        assert_eq!(filter.difficulty, None);
        assert_eq!(filter.temp_min, 72);
    }

    #[test]
    fn test_parse_clamps_ph_and_swaps_ranges() {
        let filter = ProductFilter::from_query("ph_min=20&ph_max=6&min_price=30&max_price=10");
        assert_eq!(filter.ph_min, Decimal::from(6));
        assert_eq!(filter.ph_max, Decimal::from(14));
        assert_eq!(filter.min_price, Decimal::from(10));
        assert_eq!(filter.max_price, Decimal::from(30));
    }

    #[test]
    fn test_page_zero_becomes_one() {
        assert_eq!(ProductFilter::from_query("page=0").page, 1);
    }

    #[test]
    fn test_round_trip() {
        let filters = [
            ProductFilter::default(),
            ProductFilter::from_query("search=neon+tetra&category=tetras-barbs&page=3"),
            ProductFilter::from_query("ph_min=6.8&ph_max=7.2&temp_min=74&temp_max=80"),
            ProductFilter::from_query("min_price=2.50&max_price=12.99&diet_type=herbivore"),
            ProductFilter::from_query("min_tank_size=29&max_size=6&difficulty=advanced"),
        ];
        for filter in filters {
            let parsed = ProductFilter::from_query(&filter.query_string());
            assert_eq!(parsed, filter, "round trip of {}", filter.query_string());
        }
    }

    #[test]
    fn test_search_is_url_encoded() {
        let filter = ProductFilter::from_query("search=cory%20%26%20pleco");
        assert_eq!(filter.search.as_deref(), Some("cory & pleco"));
        assert_eq!(filter.query_string(), "search=cory+%26+pleco");
    }

    #[test]
    fn test_active_filter_chips() {
        let filter = ProductFilter::from_query("search=tetra&ph_min=6&page=4");
        let chips = filter.active_filters("/products");
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].label, "Search: tetra");
        assert_eq!(chips[0].remove_url, "/products?ph_min=6");
        assert_eq!(chips[1].label, "pH: 6 - 14");
        assert_eq!(chips[1].remove_url, "/products?search=tetra");
    }

    #[test]
    fn test_without_page_and_cleared() {
        let filter = ProductFilter::from_query("category=cichlids&page=5");
        assert_eq!(filter.without_page().query_string(), "category=cichlids");
        assert_eq!(filter.with_page(2).query_string(), "category=cichlids&page=2");
        assert!(filter.is_filtered());
        assert_eq!(ProductFilter::cleared(), ProductFilter::default());
    }
}
