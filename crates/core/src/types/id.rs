//! Newtype IDs for type-safe entity references.
//!
//! The backend identifies every entity with a UUID. Use the `define_id!`
//! macro to create wrappers that prevent accidentally mixing IDs from
//! different entity types.

use uuid::Uuid;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_uuid()`
/// - `From<Uuid>`, `Into<Uuid>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use freshwater_core::define_id;
/// define_id!(TankId);
/// define_id!(FilterId);
///
/// let tank = TankId::new(uuid::Uuid::nil());
/// let parsed: TankId = "00000000-0000-0000-0000-000000000000".parse().unwrap();
/// assert_eq!(tank, parsed);
///
/// // These are different types, so this won't compile:
/// // let _: TankId = FilterId::new(uuid::Uuid::nil());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create a new ID from a UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(AddressId);
define_id!(ArticleId);
define_id!(ArticleCategoryId);

impl ProductId {
    /// Generate a random product ID (used for fixtures and seeding).
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_uuid() {
        let uuid = Uuid::parse_str("7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11").unwrap();
        let id = ProductId::new(uuid);
        assert_eq!(id.to_string(), "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11");
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn test_id_from_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<OrderId>().is_err());
        assert!("".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id: UserId = "7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"7d6c0f5e-3a44-4a8e-9a55-3e8f2b2f9c11\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ProductId::random(), ProductId::random());
    }
}
