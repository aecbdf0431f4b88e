//! Email addresses entered on sign-up and admin user forms.
//!
//! The backend does the authoritative check; this catches the obvious
//! mistakes before a round trip. Messages are shown next to the form field.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an address was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required.")]
    Empty,
    #[error("Email must be at most {max} characters.")]
    TooLong { max: usize },
    #[error("Enter an email address like name@example.com.")]
    MissingAtSymbol,
    #[error("Email may contain only one @.")]
    MultipleAtSymbols,
    #[error("Enter the part before the @.")]
    EmptyLocalPart,
    #[error("Enter the domain after the @.")]
    EmptyDomain,
}

/// A trimmed address with exactly one `@` and text on both sides of it.
///
/// ```
/// use freshwater_core::Email;
///
/// let email = Email::parse("  keeper@aquatics.example ").unwrap();
/// assert_eq!(email.as_str(), "keeper@aquatics.example");
/// assert_eq!(email.domain(), "aquatics.example");
///
/// assert!(Email::parse("keeper@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and trim an address.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let email = input.trim();
        if email.is_empty() {
            return Err(EmailError::Empty);
        }
        if email.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = email.split_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::MultipleAtSymbols);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(email.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for ok in [
            "keeper@aquatics.example",
            "first.last+tank@reef.example.co.uk",
            "a@b.c",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejections_name_the_problem() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("guppy.example"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("a@b@c.example"), Err(EmailError::MultipleAtSymbols));
        assert_eq!(Email::parse("@reef.example"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("guppy@"), Err(EmailError::EmptyDomain));

        let long = format!("{}@aquatics.example", "a".repeat(250));
        assert_eq!(Email::parse(&long), Err(EmailError::TooLong { max: 254 }));
    }

    #[test]
    fn test_messages_read_as_form_errors() {
        assert_eq!(EmailError::Empty.to_string(), "Email is required.");
        assert_eq!(
            EmailError::TooLong { max: 254 }.to_string(),
            "Email must be at most 254 characters."
        );
    }

    #[test]
    fn test_trims_and_splits() {
        let email = Email::parse("  diver@reef.example  ").unwrap();
        assert_eq!(email.to_string(), "diver@reef.example");
        assert_eq!(email.domain(), "reef.example");
    }

    #[test]
    fn test_deserializing_validates() {
        let email: Email = serde_json::from_str("\"keeper@aquatics.example\"").unwrap();
        assert_eq!(email.as_str(), "keeper@aquatics.example");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"keeper@aquatics.example\"");
        assert!(serde_json::from_str::<Email>("\"not-an-address\"").is_err());
    }
}
