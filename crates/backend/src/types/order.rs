//! Orders and checkout.

use chrono::{DateTime, NaiveDate, Utc};
use freshwater_core::{
    AddressId, CheckoutLine, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price,
};
use serde::{Deserialize, Serialize};

use super::{Address, Product, blank_as_none, null_as_empty};

/// Product fields frozen onto an order line when it was placed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub species_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scientific_name: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
}

/// A line on a customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    pub unit_price: Price,
    pub total_price: Price,
    #[serde(default)]
    pub product_snapshot: ProductSnapshot,
}

impl OrderItem {
    /// Name at the time of purchase, falling back to the live product.
    #[must_use]
    pub fn name(&self) -> &str {
        if !self.product_snapshot.species_name.is_empty() {
            &self.product_snapshot.species_name
        } else {
            self.product
                .as_ref()
                .map_or("Unknown product", |p| p.species_name.as_str())
        }
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// `FW` + date + sequence, e.g. `FW202405010001`.
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Price,
    #[serde(default)]
    pub shipping_amount: Price,
    #[serde(default)]
    pub tax_amount: Price,
    #[serde(default)]
    pub discount_amount: Price,
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub order_notes: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tracking_number: String,
    #[serde(default)]
    pub estimated_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of line totals before shipping, tax and discounts.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(|item| item.total_price).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Payment methods offered at checkout.
pub const PAYMENT_METHODS: &[(&str, &str)] = &[
    ("credit_card", "Credit card"),
    ("paypal", "PayPal"),
    ("bank_transfer", "Bank transfer"),
];

/// Body of `POST /orders/checkout/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    pub shipping_address_id: AddressId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address_id: Option<AddressId>,
    pub order_notes: String,
    pub payment_method: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_backend() {
        let json = r#"{
            "id": "3c1d2e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
            "order_number": "FW202405010001",
            "status": "processing",
            "total_amount": "20.97",
            "shipping_amount": "0.00",
            "tax_amount": "0.00",
            "discount_amount": "0.00",
            "payment_status": "paid",
            "payment_method": "credit_card",
            "shipping_address": null,
            "billing_address": null,
            "order_notes": "",
            "tracking_number": "",
            "estimated_delivery": "2024-05-08",
            "items": [{
                "id": "9a8b7c6d-5e4f-4a3b-2c1d-0e9f8a7b6c5d",
                "product": null,
                "quantity": 3,
                "unit_price": "6.99",
                "total_price": "20.97",
                "product_snapshot": {"species_name": "Cherry Barb", "scientific_name": "Puntius titteya", "price": "6.99", "image_url": ""}
            }],
            "created_at": "2024-05-01T12:00:00Z",
            "updated_at": "2024-05-01T12:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.subtotal(), Price::from_cents(2097));
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.items.first().unwrap().name(), "Cherry Barb");
        assert_eq!(order.estimated_delivery, NaiveDate::from_ymd_opt(2024, 5, 8));
    }

    #[test]
    fn test_checkout_request_omits_missing_billing_address() {
        let request = CheckoutRequest {
            items: vec![CheckoutLine {
                product_id: "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11".parse().unwrap(),
                quantity: 2,
            }],
            shipping_address_id: "1b1f3c2e-8c61-4f7b-9d0a-5a3e2c6d7e88".parse().unwrap(),
            billing_address_id: None,
            order_notes: String::new(),
            payment_method: "credit_card".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("billing_address_id").is_none());
        assert_eq!(value["items"][0]["quantity"], 2);
    }
}
