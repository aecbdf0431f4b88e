//! Type-safe price representation using decimal arithmetic.
//!
//! The backend serializes decimal fields as strings (`"12.50"`) but some
//! endpoints and seed files use plain JSON numbers, so [`Price`] accepts both
//! on the way in and always writes a string on the way out.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative USD amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The decimal amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0.round_dp(2))
    }

    /// Plain two-decimal form without currency symbol, for form inputs.
    #[must_use]
    pub fn to_plain(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('$');
        let amount =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(s.to_string()))?;
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_plain())
    }
}

/// Wire forms accepted for a price.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(s) => s,
            RawPrice::Number(n) => n.to_string(),
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        let price: Price = "2.99".parse().unwrap();
        assert_eq!(price.display(), "$2.99");
        let price: Price = "10".parse().unwrap();
        assert_eq!(price.display(), "$10.00");
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert_eq!("-1.00".parse::<Price>(), Err(PriceError::Negative));
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_parse_accepts_dollar_sign() {
        let price: Price = "$4.50".parse().unwrap();
        assert_eq!(price, Price::from_cents(450));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let price = Price::from_cents(299);
        assert_eq!((price * 3).display(), "$8.97");
        assert_eq!(price * 0, Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let prices = [Price::from_cents(100), Price::from_cents(250)];
        let total: Price = prices.iter().sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let from_str: Price = serde_json::from_str("\"12.50\"").unwrap();
        let from_num: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1999)).unwrap();
        assert_eq!(json, "\"19.99\"");
    }
}
