//! Account route handlers.
//!
//! Every route here requires a signed-in customer. Calls are made with the
//! stored access token; a rejected token surfaces as an [`AppError`] that
//! clears the auth record and sends the visitor to the login page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{
    Address, AddressInput, BackendError, FieldErrors, Order, UpdateMeRequest, User, UserProfile,
    UserUpdate,
};
use freshwater_core::{AddressId, AddressType, ExperienceLevel, OrderId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Flash, FormErrors, LayoutContext, SelectOption, set_flash};
use crate::services::AuthStore;
use crate::state::AppState;

/// Backend errors that belong on the form rather than an error page.
const fn is_form_error(error: &BackendError) -> bool {
    matches!(error, BackendError::Api { status, .. } if *status < 500)
}

// =============================================================================
// Profile
// =============================================================================

/// Profile form data.
///
/// Checkboxes are absent when unticked; numbers arrive as text so a blank
/// tank size means "not set".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub preferred_tank_size: String,
    pub newsletter_subscribed: Option<String>,
    pub marketing_emails: Option<String>,
}

impl ProfileForm {
    fn from_account(user: &User, profile: &UserProfile) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            experience_level: profile
                .experience_level
                .map(|level| level.as_str().to_string())
                .unwrap_or_default(),
            preferred_tank_size: profile
                .preferred_tank_size
                .map(|size| size.to_string())
                .unwrap_or_default(),
            newsletter_subscribed: profile.newsletter_subscribed.then(|| "true".to_string()),
            marketing_emails: profile.marketing_emails.then(|| "true".to_string()),
        }
    }

    fn to_request(&self) -> std::result::Result<UpdateMeRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let experience_level = match self.experience_level.trim() {
            "" => None,
            raw => raw.parse::<ExperienceLevel>().map_or_else(
                |_| {
                    errors.insert("experience_level", "Choose an experience level.".to_string());
                    None
                },
                Some,
            ),
        };
        let preferred_tank_size = match self.preferred_tank_size.trim() {
            "" => None,
            raw => match raw.parse::<u32>() {
                Ok(size) if size >= 1 => Some(size),
                _ => {
                    errors.insert(
                        "preferred_tank_size",
                        "Tank size must be a whole number of gallons.".to_string(),
                    );
                    None
                }
            },
        };

        let request = UpdateMeRequest {
            user: UserUpdate {
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                phone: self.phone.trim().to_string(),
            },
            profile: UserProfile {
                experience_level,
                preferred_tank_size,
                newsletter_subscribed: self.newsletter_subscribed.is_some(),
                marketing_emails: self.marketing_emails.is_some(),
            },
        };
        if let Err(more) = request.validate() {
            errors.extend(more);
        }

        if errors.is_empty() { Ok(request) } else { Err(errors) }
    }

    fn experience_options(&self) -> Vec<SelectOption> {
        ExperienceLevel::ALL
            .iter()
            .map(|level| {
                SelectOption::new(
                    level.as_str(),
                    level.label(),
                    self.experience_level == level.as_str(),
                )
            })
            .collect()
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: LayoutContext,
    pub user: User,
    pub form: ProfileForm,
    pub experience_levels: Vec<SelectOption>,
    pub errors: FormErrors,
}

impl ProfileTemplate {
    fn new(layout: LayoutContext, user: User, form: ProfileForm, errors: FormErrors) -> Self {
        Self {
            layout,
            user,
            experience_levels: form.experience_options(),
            form,
            errors,
        }
    }
}

/// Display the profile page.
#[instrument(skip(state, auth, layout))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
) -> Result<ProfileTemplate> {
    let me = state.backend().me(&auth.access_token()).await?;
    let form = ProfileForm::from_account(&me.user, &me.profile);
    Ok(ProfileTemplate::new(layout, me.user, form, FormErrors::default()))
}

/// Save profile changes.
#[instrument(skip(state, session, auth, layout, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let request = match form.to_request() {
        Ok(request) => request,
        Err(fields) => {
            return Ok(ProfileTemplate::new(
                layout,
                auth.user,
                form,
                FormErrors::from_fields(fields),
            )
            .into_response());
        }
    };

    match state
        .backend()
        .update_me(&auth.access_token(), &request)
        .await
    {
        Ok(me) => {
            AuthStore::new(&session, state.backend())
                .set_user(me.user)
                .await?;
            set_flash(&session, Flash::success("Your profile has been updated.")).await?;
            Ok(Redirect::to("/account").into_response())
        }
        Err(e) if is_form_error(&e) => Ok(ProfileTemplate::new(
            layout,
            auth.user,
            form,
            FormErrors::from_backend(&e),
        )
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Query parameters for paged listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: LayoutContext,
    pub orders: Vec<Order>,
    pub page: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub layout: LayoutContext,
    pub order: Order,
}

/// Display the order history.
#[instrument(skip(state, auth, layout))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Query(query): Query<PageQuery>,
) -> Result<OrdersTemplate> {
    let page = query.page.unwrap_or(1).max(1);
    let orders = state
        .backend()
        .list_orders(&auth.access_token(), page)
        .await?;

    Ok(OrdersTemplate {
        layout,
        page,
        previous_page: orders.previous_page(),
        next_page: orders.next_page(),
        orders: orders.results,
    })
}

/// Display one order.
#[instrument(skip(state, auth, layout))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Path(id): Path<String>,
) -> Result<OrderTemplate> {
    let id: OrderId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("order {id}")))?;
    let order = state
        .backend()
        .get_order(&auth.access_token(), id)
        .await?;
    Ok(OrderTemplate { layout, order })
}

// =============================================================================
// Addresses
// =============================================================================

fn address_type_options(selected: AddressType) -> Vec<SelectOption> {
    AddressType::ALL
        .iter()
        .map(|kind| SelectOption::new(kind.as_str(), kind.label(), *kind == selected))
        .collect()
}

/// Address book template: saved addresses plus the "add address" form.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub layout: LayoutContext,
    pub addresses: Vec<Address>,
    pub form: AddressInput,
    pub address_types: Vec<SelectOption>,
    pub errors: FormErrors,
}

impl AddressesTemplate {
    fn new(
        layout: LayoutContext,
        addresses: Vec<Address>,
        form: AddressInput,
        errors: FormErrors,
    ) -> Self {
        Self {
            layout,
            addresses,
            address_types: address_type_options(form.address_type),
            form,
            errors,
        }
    }
}

/// Edit address template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_edit.html")]
pub struct AddressEditTemplate {
    pub layout: LayoutContext,
    pub id: AddressId,
    pub form: AddressInput,
    pub address_types: Vec<SelectOption>,
    pub errors: FormErrors,
}

impl AddressEditTemplate {
    fn new(layout: LayoutContext, id: AddressId, form: AddressInput, errors: FormErrors) -> Self {
        Self {
            layout,
            id,
            address_types: address_type_options(form.address_type),
            form,
            errors,
        }
    }
}

fn parse_address_id(raw: &str) -> Result<AddressId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("address {raw}")))
}

/// Display the address book.
#[instrument(skip(state, auth, layout))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
) -> Result<AddressesTemplate> {
    let addresses = state
        .backend()
        .list_addresses(&auth.access_token())
        .await?;
    Ok(AddressesTemplate::new(
        layout,
        addresses,
        AddressInput::default(),
        FormErrors::default(),
    ))
}

/// Save a new address.
#[instrument(skip(state, session, auth, layout, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Form(form): Form<AddressInput>,
) -> Result<Response> {
    let backend = state.backend();
    let token = auth.access_token();
    let form = form.normalized();

    let errors = match form.validate() {
        Err(fields) => FormErrors::from_fields(fields),
        Ok(()) => match backend.create_address(&token, &form).await {
            Ok(_) => {
                set_flash(&session, Flash::success("Address saved.")).await?;
                return Ok(Redirect::to("/account/addresses").into_response());
            }
            Err(e) if is_form_error(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
    };

    let addresses = backend.list_addresses(&token).await?;
    Ok(AddressesTemplate::new(layout, addresses, form, errors).into_response())
}

/// Display the edit form for one address.
#[instrument(skip(state, auth, layout))]
pub async fn edit_address(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Path(id): Path<String>,
) -> Result<AddressEditTemplate> {
    let id = parse_address_id(&id)?;
    let address = state
        .backend()
        .list_addresses(&auth.access_token())
        .await?
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))?;

    Ok(AddressEditTemplate::new(
        layout,
        id,
        address.to_input(),
        FormErrors::default(),
    ))
}

/// Replace an address.
#[instrument(skip(state, session, auth, layout, form))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    layout: LayoutContext,
    Path(id): Path<String>,
    Form(form): Form<AddressInput>,
) -> Result<Response> {
    let id = parse_address_id(&id)?;
    let form = form.normalized();

    let errors = match form.validate() {
        Err(fields) => FormErrors::from_fields(fields),
        Ok(()) => match state
            .backend()
            .update_address(&auth.access_token(), id, &form)
            .await
        {
            Ok(_) => {
                set_flash(&session, Flash::success("Address updated.")).await?;
                return Ok(Redirect::to("/account/addresses").into_response());
            }
            Err(e) if is_form_error(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
    };

    Ok(AddressEditTemplate::new(layout, id, form, errors).into_response())
}

/// Delete an address.
#[instrument(skip(state, session, auth))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_address_id(&id)?;
    match state
        .backend()
        .delete_address(&auth.access_token(), id)
        .await
    {
        Ok(()) => set_flash(&session, Flash::info("Address removed.")).await?,
        Err(e) if is_form_error(&e) => {
            set_flash(&session, Flash::error(e.user_message())).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/account/addresses"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_form_parses_optional_fields() {
        let form = ProfileForm {
            first_name: " Ada ".to_string(),
            experience_level: "intermediate".to_string(),
            preferred_tank_size: "55".to_string(),
            newsletter_subscribed: Some("true".to_string()),
            ..ProfileForm::default()
        };
        let request = form.to_request().unwrap();
        assert_eq!(request.user.first_name, "Ada");
        assert_eq!(
            request.profile.experience_level,
            Some(ExperienceLevel::Intermediate)
        );
        assert_eq!(request.profile.preferred_tank_size, Some(55));
        assert!(request.profile.newsletter_subscribed);
        assert!(!request.profile.marketing_emails);
    }

    #[test]
    fn test_profile_form_blank_means_unset() {
        let request = ProfileForm::default().to_request().unwrap();
        assert_eq!(request.profile.experience_level, None);
        assert_eq!(request.profile.preferred_tank_size, None);
    }

    #[test]
    fn test_profile_form_rejects_bad_tank_size() {
        let form = ProfileForm {
            preferred_tank_size: "big".to_string(),
            ..ProfileForm::default()
        };
        let errors = form.to_request().unwrap_err();
        assert!(errors.contains_key("preferred_tank_size"));
    }

    #[test]
    fn test_server_errors_are_not_form_errors() {
        assert!(is_form_error(&BackendError::Api {
            status: 400,
            message: "bad".to_string(),
            details: None,
        }));
        assert!(!is_form_error(&BackendError::Server {
            status: 500,
            message: "boom".to_string(),
        }));
        assert!(!is_form_error(&BackendError::NotFound("gone".to_string())));
    }
}
