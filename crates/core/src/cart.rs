//! Shopping cart state.
//!
//! The cart is a list of line items plus two derived fields, `total` and
//! `item_count`. Derived fields are recomputed after every mutation and on
//! deserialization, so a persisted cart can never disagree with its lines.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// The product data a cart line needs to render without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    /// Common species name.
    pub name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line id, `"{product_id}-{unix_millis}"`.
    pub id: String,
    pub product: CartProduct,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
}

impl CartItem {
    fn new(product: CartProduct, quantity: u32, now_millis: i64) -> Self {
        let unit_price = product.price;
        Self {
            id: format!("{}-{now_millis}", product.id),
            product,
            quantity,
            unit_price,
            total_price: unit_price * quantity,
        }
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total_price = self.unit_price * quantity;
    }
}

/// A product/quantity pair sent to the backend when placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Persisted shape of a cart; only the lines are trusted.
#[derive(Deserialize)]
struct CartRecord {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl From<CartRecord> for Cart {
    fn from(record: CartRecord) -> Self {
        let mut cart = Self {
            items: record
                .items
                .into_iter()
                .filter(|item| item.quantity > 0)
                .map(|mut item| {
                    item.set_quantity(item.quantity);
                    item
                })
                .collect(),
            total: Price::ZERO,
            item_count: 0,
        };
        cart.recompute();
        cart
    }
}

/// A visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartRecord")]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
    item_count: u32,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of all line totals.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn item_count(&self) -> u32 {
        self.item_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of a product already in the cart (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product.id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Add `quantity` of a product, incrementing an existing line if present.
    pub fn add_item(&mut self, product: CartProduct, quantity: u32) {
        self.add_item_at(product, quantity, Utc::now().timestamp_millis());
    }

    fn add_item_at(&mut self, product: CartProduct, quantity: u32, now_millis: i64) {
        if quantity == 0 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == product.id) {
            item.set_quantity(item.quantity.saturating_add(quantity));
        } else {
            self.items.push(CartItem::new(product, quantity, now_millis));
        }
        self.recompute();
    }

    /// Remove a product's line. Unknown products are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product.id != product_id);
        self.recompute();
    }

    /// Set a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.product.id == product_id) {
            item.set_quantity(quantity);
        }
        self.recompute();
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Lines in the shape the checkout endpoint expects.
    #[must_use]
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|item| CheckoutLine {
                product_id: item.product.id,
                quantity: item.quantity,
            })
            .collect()
    }

    fn recompute(&mut self) {
        self.total = self.items.iter().map(|item| item.total_price).sum();
        self.item_count = self
            .items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn neon_tetra() -> CartProduct {
        CartProduct {
            id: "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11".parse().unwrap(),
            name: "Neon Tetra".to_string(),
            scientific_name: Some("Paracheirodon innesi".to_string()),
            price: Price::from_cents(299),
            image_url: None,
        }
    }

    fn angelfish() -> CartProduct {
        CartProduct {
            id: "1b1f3c2e-8c61-4f7b-9d0a-5a3e2c6d7e88".parse().unwrap(),
            name: "Angelfish".to_string(),
            scientific_name: Some("Pterophyllum scalare".to_string()),
            price: Price::from_cents(1299),
            image_url: Some("https://img.example/angel.jpg".to_string()),
        }
    }

    #[test]
    fn test_adding_same_product_increments_line() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 2);
        cart.add_item(neon_tetra(), 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), Price::from_cents(1495));
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 10);
        cart.add_item(angelfish(), 2);

        let expected: Price = cart.items().iter().map(|i| i.unit_price * i.quantity).sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.total().display(), "$55.88");
        assert_eq!(cart.item_count(), 12);
    }

    #[test]
    fn test_line_id_format() {
        let mut cart = Cart::new();
        cart.add_item_at(neon_tetra(), 1, 1_700_000_000_123);
        assert_eq!(
            cart.items()[0].id,
            "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11-1700000000123"
        );
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 4);
        cart.add_item(angelfish(), 1);
        cart.update_quantity(neon_tetra().id, 0);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(neon_tetra().id), 0);
        assert_eq!(cart.total(), Price::from_cents(1299));
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add_item(angelfish(), 1);
        cart.update_quantity(angelfish().id, 3);
        assert_eq!(cart.quantity_of(angelfish().id), 3);
        assert_eq!(cart.total(), Price::from_cents(3897));
    }

    #[test]
    fn test_removing_last_item_zeroes_totals() {
        let mut cart = Cart::new();
        cart.add_item(angelfish(), 2);
        cart.remove_item(angelfish().id);

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 1);
        cart.add_item(angelfish(), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_checkout_lines() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 6);
        let lines = cart.checkout_lines();
        assert_eq!(
            lines,
            vec![CheckoutLine {
                product_id: neon_tetra().id,
                quantity: 6
            }]
        );
    }

    #[test]
    fn test_deserialize_recomputes_derived_fields() {
        let mut cart = Cart::new();
        cart.add_item(neon_tetra(), 2);
        let mut value = serde_json::to_value(&cart).unwrap();
        value["total"] = serde_json::json!("0.01");
        value["item_count"] = serde_json::json!(999);
        value["items"][0]["total_price"] = serde_json::json!("100.00");

        let restored: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(restored.total(), Price::from_cents(598));
        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.items()[0].total_price, Price::from_cents(598));
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_deserialize_missing_items_is_empty() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
    }
}
