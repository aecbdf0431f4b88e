//! Authentication route handlers.
//!
//! Sign-in, registration, sign-out and token refresh. Failed submissions
//! re-render the form with the visitor's input and inline errors; the
//! password is never echoed back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::RegisterRequest;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::safe_next;
use crate::models::{Flash, FormErrors, LayoutContext, set_flash};
use crate::services::{AuthError, AuthStore};
use crate::state::AppState;

const AFTER_LOGIN: &str = "/account";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<RegisterForm> for RegisterRequest {
    fn from(form: RegisterForm) -> Self {
        Self {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password,
            password_confirm: form.password_confirm,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
        }
    }
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Hidden field carrying the post-action target.
#[derive(Debug, Deserialize)]
pub struct NextForm {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: LayoutContext,
    pub email: String,
    pub next: String,
    pub errors: FormErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: LayoutContext,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub errors: FormErrors,
}

impl RegisterTemplate {
    fn blank(layout: LayoutContext) -> Self {
        Self {
            layout,
            username: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            errors: FormErrors::default(),
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(layout: LayoutContext, Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        layout,
        email: String::new(),
        next: safe_next(query.next.as_deref(), AFTER_LOGIN).to_string(),
        errors: FormErrors::default(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: LayoutContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref(), AFTER_LOGIN).to_string();
    let store = AuthStore::new(&session, state.backend());

    match store.login(&form.email, &form.password).await {
        Ok(auth) => {
            set_flash(
                &session,
                Flash::success(format!("Welcome back, {}!", auth.user.display_name())),
            )
            .await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err(e @ (AuthError::Session(_) | AuthError::NotSignedIn)) => Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                layout,
                email: form.email.trim().to_string(),
                next,
                errors: FormErrors::from_auth(&e),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(layout: LayoutContext) -> RegisterTemplate {
    RegisterTemplate::blank(layout)
}

/// Handle registration form submission.
///
/// A successful registration signs the visitor in straight away.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    layout: LayoutContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let request = RegisterRequest::from(form);
    let store = AuthStore::new(&session, state.backend());

    match store.register(&request).await {
        Ok(auth) => {
            set_flash(
                &session,
                Flash::success(format!(
                    "Welcome to Freshwater Aquatics, {}!",
                    auth.user.display_name()
                )),
            )
            .await?;
            Ok(Redirect::to(AFTER_LOGIN).into_response())
        }
        Err(e @ (AuthError::Session(_) | AuthError::NotSignedIn)) => Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Registration failed");
            Ok(RegisterTemplate {
                layout,
                username: request.username,
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                errors: FormErrors::from_auth(&e),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Logout / Refresh
// =============================================================================

/// Sign out. Always succeeds from the visitor's point of view.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    AuthStore::new(&session, state.backend()).logout().await?;
    set_flash(&session, Flash::info("You have been signed out.")).await?;
    Ok(Redirect::to("/"))
}

/// Exchange the refresh token for a new access token.
#[instrument(skip(state, session, form))]
pub async fn refresh(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NextForm>,
) -> Result<Redirect> {
    let next = safe_next(form.next.as_deref(), AFTER_LOGIN).to_string();

    match AuthStore::new(&session, state.backend()).refresh().await {
        Ok(_) => Ok(Redirect::to(&next)),
        Err(AuthError::NotSignedIn) => Ok(Redirect::to(&crate::middleware::login_url(&next))),
        Err(AuthError::Backend(e)) if e.is_unauthorized() => {
            set_flash(
                &session,
                Flash::info("Your session has expired. Please sign in again."),
            )
            .await?;
            Ok(Redirect::to(&crate::middleware::login_url(&next)))
        }
        Err(e) => Err(AppError::from(e)),
    }
}
