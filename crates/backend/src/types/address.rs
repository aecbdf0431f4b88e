//! Saved shipping and billing addresses.

use chrono::{DateTime, Utc};
use freshwater_core::{AddressId, AddressType};
use serde::{Deserialize, Serialize};

use super::{FieldErrors, max_len, null_as_empty, require};

/// A saved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    pub address_line_1: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Address {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Street lines, city, state and postal code on one line.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.address_line_1.as_str()];
        if !self.address_line_2.is_empty() {
            parts.push(&self.address_line_2);
        }
        format!(
            "{}, {}, {} {}, {}",
            parts.join(", "),
            self.city,
            self.state,
            self.postal_code,
            self.country
        )
    }

    /// The editable fields, for pre-filling a form.
    #[must_use]
    pub fn to_input(&self) -> AddressInput {
        AddressInput {
            address_type: self.address_type,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company: self.company.clone(),
            address_line_1: self.address_line_1.clone(),
            address_line_2: self.address_line_2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
            is_default: self.is_default,
        }
    }
}

/// Body for creating or replacing an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    pub address_line_1: String,
    #[serde(default)]
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

fn default_country() -> String {
    "US".to_string()
}

impl Default for AddressInput {
    fn default() -> Self {
        Self {
            address_type: AddressType::Shipping,
            first_name: String::new(),
            last_name: String::new(),
            company: String::new(),
            address_line_1: String::new(),
            address_line_2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: default_country(),
            phone: String::new(),
            is_default: false,
        }
    }
}

impl AddressInput {
    /// Trim every text field and upper-case the country code.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.company,
            &mut self.address_line_1,
            &mut self.address_line_2,
            &mut self.city,
            &mut self.state,
            &mut self.postal_code,
            &mut self.phone,
        ] {
            *field = field.trim().to_string();
        }
        self.country = self.country.trim().to_ascii_uppercase();
        self
    }

    /// Check column limits and required fields.
    ///
    /// # Errors
    ///
    /// Returns the failing fields with a message for each.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "first_name", &self.first_name);
        require(&mut errors, "last_name", &self.last_name);
        require(&mut errors, "address_line_1", &self.address_line_1);
        require(&mut errors, "city", &self.city);
        require(&mut errors, "state", &self.state);
        require(&mut errors, "postal_code", &self.postal_code);
        max_len(&mut errors, "first_name", &self.first_name, 30);
        max_len(&mut errors, "last_name", &self.last_name, 30);
        max_len(&mut errors, "company", &self.company, 50);
        max_len(&mut errors, "address_line_1", &self.address_line_1, 100);
        max_len(&mut errors, "address_line_2", &self.address_line_2, 100);
        max_len(&mut errors, "city", &self.city, 50);
        max_len(&mut errors, "state", &self.state, 50);
        max_len(&mut errors, "postal_code", &self.postal_code, 10);
        max_len(&mut errors, "phone", &self.phone, 15);
        if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.insert("country", "Use a two-letter country code.".to_string());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            first_name: " Rio ".to_string(),
            last_name: "Negro".to_string(),
            address_line_1: "12 Blackwater Ln".to_string(),
            city: "Manaus".to_string(),
            state: "AM".to_string(),
            postal_code: "69000".to_string(),
            country: "br".to_string(),
            ..AddressInput::default()
        }
    }

    #[test]
    fn test_normalized_input_is_valid() {
        let normalized = input().normalized();
        assert_eq!(normalized.first_name, "Rio");
        assert_eq!(normalized.country, "BR");
        assert!(normalized.validate().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let errors = AddressInput::default().validate().unwrap_err();
        for field in ["first_name", "last_name", "address_line_1", "city", "state", "postal_code"] {
            assert!(errors.contains_key(field), "{field} should be required");
        }
        assert!(!errors.contains_key("country"));
    }

    #[test]
    fn test_postal_code_too_long() {
        let mut form = input().normalized();
        form.postal_code = "12345-67890".to_string();
        assert!(form.validate().unwrap_err().contains_key("postal_code"));
    }

    #[test]
    fn test_one_line() {
        let address: Address = serde_json::from_str(
            r#"{"id": "1b1f3c2e-8c61-4f7b-9d0a-5a3e2c6d7e88", "address_type": "shipping",
                "first_name": "Rio", "last_name": "Negro", "company": "",
                "address_line_1": "12 Blackwater Ln", "address_line_2": "Unit 4",
                "city": "Manaus", "state": "AM", "postal_code": "69000", "country": "BR",
                "phone": "", "is_default": true, "created_at": "2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(address.one_line(), "12 Blackwater Ln, Unit 4, Manaus, AM 69000, BR");
        assert_eq!(address.full_name(), "Rio Negro");
        assert_eq!(address.to_input().address_type, AddressType::Shipping);
    }
}
