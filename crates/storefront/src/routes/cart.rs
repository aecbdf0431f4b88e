//! Cart route handlers.
//!
//! Mutations are plain form posts that redirect back with a flash message.
//! Stock problems are shown to the shopper rather than rendered as error
//! pages; only session failures and rejected tokens escape as [`AppError`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::BackendError;
use freshwater_core::{Cart, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::safe_next;
use crate::models::{Flash, LayoutContext, set_flash};
use crate::services::{CartError, CartStore};
use crate::state::AppState;

const CART_PATH: &str = "/cart";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    /// Where to go afterwards; defaults to the cart.
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: LayoutContext,
    pub cart: Cart,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Turn a cart error into a flash message, passing through the errors that
/// need a full error response.
async fn flash_cart_error(session: &Session, error: CartError) -> Result<()> {
    match error {
        CartError::Session(e) => Err(AppError::Session(e)),
        CartError::Backend(e) if e.is_unauthorized() => Err(AppError::Backend(e)),
        CartError::Backend(BackendError::Http(e)) => {
            Err(AppError::Backend(BackendError::Http(e)))
        }
        other => {
            set_flash(session, Flash::error(other.user_message())).await?;
            Ok(())
        }
    }
}

/// Display the cart page.
#[instrument(skip(session, layout))]
pub async fn show(session: Session, layout: LayoutContext) -> Result<CartShowTemplate> {
    let cart = CartStore::new(&session).load().await?;
    Ok(CartShowTemplate { layout, cart })
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    let target = safe_next(form.return_to.as_deref(), CART_PATH).to_string();
    let store = CartStore::new(&session);

    match store.add(state.backend(), form.product_id, quantity).await {
        Ok(cart) => {
            let name = cart
                .items()
                .iter()
                .find(|item| item.product.id == form.product_id)
                .map_or_else(|| "Item".to_string(), |item| item.product.name.clone());
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", &form.product_id.to_string())]),
            );
            set_flash(&session, Flash::success(format!("{name} added to your cart."))).await?;
        }
        Err(e) => flash_cart_error(&session, e).await?,
    }

    Ok(Redirect::to(&target).into_response())
}

/// Change a line's quantity; zero removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let store = CartStore::new(&session);
    if let Err(e) = store
        .update(state.backend(), form.product_id, form.quantity)
        .await
    {
        flash_cart_error(&session, e).await?;
    }
    Ok(Redirect::to(CART_PATH))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    CartStore::new(&session).remove(form.product_id).await?;
    set_flash(&session, Flash::info("Item removed from your cart.")).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    CartStore::new(&session).clear().await?;
    set_flash(&session, Flash::info("Your cart is now empty.")).await?;
    Ok(Redirect::to(CART_PATH))
}

/// Cart count badge fragment.
pub async fn count(session: Session) -> CartCountTemplate {
    let count = CartStore::new(&session)
        .load()
        .await
        .map_or(0, |cart| cart.item_count());
    CartCountTemplate { count }
}
