//! Checkout route handlers.
//!
//! Checkout needs a signed-in customer, a non-empty cart and a saved
//! shipping address. The order is placed through the backend, which checks
//! stock again; on success the cart is cleared.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{Address, CheckoutRequest, PAYMENT_METHODS};
use freshwater_core::{AddressId, AddressType, Cart};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Flash, FormErrors, LayoutContext, SelectOption, set_flash};
use crate::services::CartStore;
use crate::state::AppState;

/// Checkout form data. Ids arrive as strings so a blank billing choice
/// means "same as shipping".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub shipping_address_id: String,
    #[serde(default)]
    pub billing_address_id: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub order_notes: String,
}

impl CheckoutForm {
    /// Build the backend request, or report the fields that are wrong.
    fn to_request(&self, cart: &Cart) -> std::result::Result<CheckoutRequest, FormErrors> {
        let mut fields = freshwater_backend::FieldErrors::new();

        let shipping = self.shipping_address_id.trim().parse::<AddressId>().ok();
        if shipping.is_none() {
            fields.insert("shipping_address_id", "Choose a shipping address.".to_string());
        }
        let billing = match self.billing_address_id.trim() {
            "" => None,
            raw => match raw.parse::<AddressId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    fields.insert("billing_address_id", "Choose a billing address.".to_string());
                    None
                }
            },
        };
        if !PAYMENT_METHODS
            .iter()
            .any(|(value, _)| *value == self.payment_method)
        {
            fields.insert("payment_method", "Choose a payment method.".to_string());
        }

        match shipping {
            Some(shipping_address_id) if fields.is_empty() => Ok(CheckoutRequest {
                items: cart.checkout_lines(),
                shipping_address_id,
                billing_address_id: billing,
                order_notes: self.order_notes.trim().to_string(),
                payment_method: self.payment_method.clone(),
            }),
            _ => Err(FormErrors::from_fields(fields)),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: LayoutContext,
    pub cart: Cart,
    pub shipping_addresses: Vec<SelectOption>,
    pub billing_addresses: Vec<SelectOption>,
    pub payment_methods: Vec<SelectOption>,
    pub form: CheckoutForm,
    pub errors: FormErrors,
}

impl CheckoutTemplate {
    fn new(
        layout: LayoutContext,
        cart: Cart,
        addresses: &[Address],
        form: CheckoutForm,
        errors: FormErrors,
    ) -> Self {
        let options = |kind: AddressType, selected: &str| {
            addresses
                .iter()
                .filter(|a| a.address_type == kind)
                .map(|a| {
                    let id = a.id.to_string();
                    let chosen = if selected.is_empty() {
                        a.is_default
                    } else {
                        id == selected
                    };
                    SelectOption::new(
                        &id,
                        &format!("{} - {}", a.full_name(), a.one_line()),
                        chosen,
                    )
                })
                .collect::<Vec<_>>()
        };
        let payment_methods = PAYMENT_METHODS
            .iter()
            .enumerate()
            .map(|(i, (value, label))| {
                let selected = if form.payment_method.is_empty() {
                    i == 0
                } else {
                    form.payment_method == *value
                };
                SelectOption::new(value, label, selected)
            })
            .collect();

        Self {
            layout,
            cart,
            shipping_addresses: options(AddressType::Shipping, &form.shipping_address_id),
            billing_addresses: options(AddressType::Billing, &form.billing_address_id),
            payment_methods,
            form,
            errors,
        }
    }
}

/// Display the checkout summary.
#[instrument(skip(state, session, auth, layout))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
) -> Result<Response> {
    let cart = CartStore::new(&session).load().await?;
    if cart.is_empty() {
        set_flash(&session, Flash::info("Your cart is empty.")).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    let addresses = state
        .backend()
        .list_addresses(&auth.access_token())
        .await?;

    Ok(CheckoutTemplate::new(
        layout,
        cart,
        &addresses,
        CheckoutForm::default(),
        FormErrors::default(),
    )
    .into_response())
}

/// Place the order.
#[instrument(skip(state, session, auth, layout, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let store = CartStore::new(&session);
    let cart = store.load().await?;
    if cart.is_empty() {
        set_flash(&session, Flash::info("Your cart is empty.")).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    let backend = state.backend();
    let token = auth.access_token();

    let request = match form.to_request(&cart) {
        Ok(request) => request,
        Err(errors) => {
            let addresses = backend.list_addresses(&token).await?;
            return Ok(CheckoutTemplate::new(layout, cart, &addresses, form, errors).into_response());
        }
    };

    match backend.checkout(&token, &request).await {
        Ok(order) => {
            store.clear().await?;
            info!(order_number = %order.order_number, "Order placed");
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_number", order.order_number.as_str())]),
            );
            set_flash(
                &session,
                Flash::success(format!(
                    "Thank you! Order {} has been placed.",
                    order.order_number
                )),
            )
            .await?;
            Ok(Redirect::to(&format!("/account/orders/{}", order.id)).into_response())
        }
        Err(e) if e.is_unauthorized() || e.status().is_none_or(|s| s >= 500) => {
            Err(AppError::Backend(e))
        }
        Err(e) => {
            let addresses = backend.list_addresses(&token).await?;
            Ok(
                CheckoutTemplate::new(layout, cart, &addresses, form, FormErrors::from_backend(&e))
                    .into_response(),
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freshwater_core::{CartProduct, Price, ProductId};

    use super::*;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(
            CartProduct {
                id: ProductId::random(),
                name: "Honey Gourami".to_string(),
                scientific_name: None,
                price: Price::from_cents(599),
                image_url: None,
            },
            2,
        );
        cart
    }

    #[test]
    fn test_valid_form_builds_request() {
        let form = CheckoutForm {
            shipping_address_id: "1b1f3c2e-8c61-4f7b-9d0a-5a3e2c6d7e88".to_string(),
            billing_address_id: String::new(),
            payment_method: "paypal".to_string(),
            order_notes: "  Leave at the door  ".to_string(),
        };
        let request = form.to_request(&cart()).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items.first().unwrap().quantity, 2);
        assert!(request.billing_address_id.is_none());
        assert_eq!(request.order_notes, "Leave at the door");
    }

    #[test]
    fn test_missing_address_and_bad_payment_method() {
        let form = CheckoutForm {
            payment_method: "cash".to_string(),
            ..CheckoutForm::default()
        };
        let errors = form.to_request(&cart()).unwrap_err();
        assert!(errors.field("shipping_address_id").is_some());
        assert!(errors.field("payment_method").is_some());
    }
}
