//! Status and classification enums shared by the storefront and admin.
//!
//! Every enum serializes to the lowercase value the backend uses, exposes
//! a human label for templates, and parses back from the wire value so
//! form posts and query strings can be validated in one place.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($wire:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The value the backend sends and accepts.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Account role. Only `Admin` may use the admin console.
    UserRole as "role" {
        User => ("user", "Customer"),
        Admin => ("admin", "Administrator"),
    }
}

wire_enum! {
    /// Hobbyist experience recorded on the customer profile.
    ExperienceLevel as "experience level" {
        Beginner => ("beginner", "Beginner"),
        Intermediate => ("intermediate", "Intermediate"),
        Advanced => ("advanced", "Advanced"),
    }
}

wire_enum! {
    /// Care difficulty of a species.
    DifficultyLevel as "difficulty level" {
        Beginner => ("beginner", "Beginner"),
        Intermediate => ("intermediate", "Intermediate"),
        Advanced => ("advanced", "Advanced"),
    }
}

wire_enum! {
    /// What a species eats.
    DietType as "diet type" {
        Herbivore => ("herbivore", "Herbivore"),
        Carnivore => ("carnivore", "Carnivore"),
        Omnivore => ("omnivore", "Omnivore"),
    }
}

wire_enum! {
    /// Fulfilment status of an order.
    OrderStatus as "order status" {
        Pending => ("pending", "Pending"),
        Confirmed => ("confirmed", "Confirmed"),
        Processing => ("processing", "Processing"),
        Shipped => ("shipped", "Shipped"),
        Delivered => ("delivered", "Delivered"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

wire_enum! {
    /// Payment state of an order.
    PaymentStatus as "payment status" {
        Pending => ("pending", "Pending"),
        Paid => ("paid", "Paid"),
        Failed => ("failed", "Failed"),
        Refunded => ("refunded", "Refunded"),
    }
}

wire_enum! {
    /// Publication state of an article.
    ArticleStatus as "article status" {
        Draft => ("draft", "Draft"),
        Published => ("published", "Published"),
    }
}

wire_enum! {
    /// Purpose of a saved address.
    AddressType as "address type" {
        Shipping => ("shipping", "Shipping"),
        Billing => ("billing", "Billing"),
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl OrderStatus {
    /// Whether the customer-facing order can still change.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Delivered | Self::Cancelled)
    }
}
