//! Session-backed cart store.
//!
//! The cart lives in the visitor's session under [`keys::CART`], so it
//! survives reloads and sign-in. Every mutation goes through
//! [`freshwater_core::Cart`], which keeps totals derived from the lines.

use freshwater_backend::{BackendClient, BackendError, Product};
use freshwater_core::{Cart, ProductId};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::models::keys;

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("{0} is not available")]
    Unavailable(String),

    #[error("only {available} of {name} in stock")]
    InsufficientStock { name: String, available: u32 },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl CartError {
    /// Message to flash to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuantity => "Please choose a quantity of at least 1.".to_string(),
            Self::Unavailable(name) => format!("{name} is currently unavailable."),
            Self::InsufficientStock { name, available: 0 } => {
                format!("{name} is out of stock.")
            }
            Self::InsufficientStock { name, available } => {
                format!("Only {available} {name} available. Please choose a smaller quantity.")
            }
            Self::Backend(e) if e.is_not_found() => {
                "That product is no longer available.".to_string()
            }
            Self::Backend(e) => e.user_message(),
            Self::Session(_) => "We couldn't update your cart. Please try again.".to_string(),
        }
    }
}

/// Reject a line total the product cannot cover.
///
/// # Errors
///
/// Returns [`CartError::Unavailable`] for withdrawn products and
/// [`CartError::InsufficientStock`] when `wanted` exceeds the stock.
pub fn check_stock(product: &Product, wanted: u32) -> Result<(), CartError> {
    if !product.is_available {
        return Err(CartError::Unavailable(product.species_name.clone()));
    }
    if wanted > product.stock_quantity {
        return Err(CartError::InsufficientStock {
            name: product.species_name.clone(),
            available: product.stock_quantity,
        });
    }
    Ok(())
}

/// Cart state for one visitor.
pub struct CartStore<'a> {
    session: &'a Session,
}

impl<'a> CartStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The stored cart, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn load(&self) -> Result<Cart, CartError> {
        Ok(self
            .session
            .get::<Cart>(keys::CART)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartError> {
        self.session.insert(keys::CART, cart).await?;
        Ok(())
    }

    /// Add a product after checking it is still on sale and in stock.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] describing why the product cannot be added.
    #[instrument(skip(self, backend), fields(product_id = %product_id))]
    pub async fn add(
        &self,
        backend: &BackendClient,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let product = backend.get_product(product_id).await?;
        let mut cart = self.load().await?;
        check_stock(&product, cart.quantity_of(product_id).saturating_add(quantity))?;

        cart.add_item(product.to_cart_product(), quantity);
        self.save(&cart).await?;
        debug!(item_count = cart.item_count(), "Added to cart");
        Ok(cart)
    }

    /// Set a line's quantity; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] when the new quantity exceeds the stock.
    #[instrument(skip(self, backend), fields(product_id = %product_id))]
    pub async fn update(
        &self,
        backend: &BackendClient,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        if quantity > cart.quantity_of(product_id) {
            let product = backend.get_product(product_id).await?;
            check_stock(&product, quantity)?;
        }
        cart.update_quantity(product_id, quantity);
        self.save(&cart).await?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.remove_item(product_id);
        self.save(&cart).await?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear(&self) -> Result<(), CartError> {
        self.session.remove::<Cart>(keys::CART).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshwater_core::{DietType, DifficultyLevel, Price};

    use super::*;

    fn product(stock: u32, available: bool) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": ProductId::random(),
            "species_name": "Cardinal Tetra",
            "price": "2.99",
            "stock_quantity": stock,
            "is_available": available,
            "difficulty_level": DifficultyLevel::Beginner,
            "diet_type": DietType::Omnivore,
        }))
        .unwrap()
    }

    #[test]
    fn test_check_stock() {
        let tetra = product(10, true);
        assert_eq!(tetra.price, Price::from_cents(299));
        assert!(check_stock(&tetra, 10).is_ok());
        assert!(matches!(
            check_stock(&tetra, 11),
            Err(CartError::InsufficientStock { available: 10, .. })
        ));
    }

    #[test]
    fn test_check_stock_unavailable() {
        let err = check_stock(&product(10, false), 1).unwrap_err();
        assert!(matches!(err, CartError::Unavailable(_)));
        assert_eq!(err.user_message(), "Cardinal Tetra is currently unavailable.");
    }

    #[test]
    fn test_out_of_stock_message() {
        let err = check_stock(&product(0, true), 1).unwrap_err();
        assert_eq!(err.user_message(), "Cardinal Tetra is out of stock.");
    }

    #[test]
    fn test_not_found_message() {
        let err = CartError::Backend(BackendError::NotFound("gone".to_string()));
        assert_eq!(err.user_message(), "That product is no longer available.");
    }
}
