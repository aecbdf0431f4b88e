//! Data every page layout needs: who is signed in, the cart badge and any
//! pending flash message.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use freshwater_core::Cart;
use tower_sessions::Session;

use super::{AuthSession, Flash, keys};

/// Header, badge and flash state for `base.html`.
#[derive(Debug, Clone, Default)]
pub struct LayoutContext {
    pub user_name: Option<String>,
    pub cart_count: u32,
    pub flash: Option<Flash>,
}

impl<S> FromRequestParts<S> for LayoutContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    /// Never fails; a missing or unreadable session renders as anonymous.
    /// Extracting consumes the pending flash message.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self::default());
        };

        let user_name = session
            .get::<AuthSession>(keys::AUTH)
            .await
            .ok()
            .flatten()
            .map(|auth| auth.user.display_name());
        let cart_count = session
            .get::<Cart>(keys::CART)
            .await
            .ok()
            .flatten()
            .map_or(0, |cart| cart.item_count());
        let flash = session.remove::<Flash>(keys::FLASH).await.ok().flatten();

        Ok(Self {
            user_name,
            cart_count,
            flash,
        })
    }
}

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set_flash(
    session: &Session,
    flash: Flash,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, flash).await
}
