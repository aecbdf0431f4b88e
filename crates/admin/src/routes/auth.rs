//! Admin sign-in and sign-out.
//!
//! The console has no accounts of its own: operators sign in with their
//! backend credentials and only `admin`-role users are let in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalAdmin;
use crate::models::form::is_inline;
use crate::models::{AdminLayout, CurrentAdmin, Flash, FormErrors, keys, set_flash};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: AdminLayout,
    pub email: String,
    pub errors: FormErrors,
}

/// Display the login page; signed-in admins go straight to the dashboard.
pub async fn login_page(OptionalAdmin(admin): OptionalAdmin, layout: AdminLayout) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        layout,
        email: String::new(),
        errors: FormErrors::default(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Non-admin accounts are refused with 403 and nothing is stored in the
/// session; their freshly issued tokens are revoked best-effort.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: AdminLayout,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let render = |layout: AdminLayout, email: String, errors: FormErrors| LoginTemplate {
        layout,
        email,
        errors,
    };

    if email.is_empty() || form.password.is_empty() {
        let errors = FormErrors::message("Email and password are required.");
        return Ok((StatusCode::BAD_REQUEST, render(layout, email, errors)).into_response());
    }

    let response = match state.backend().login(&email, &form.password).await {
        Ok(response) => response,
        Err(e) if e.is_unauthorized() => {
            warn!("Admin login rejected: invalid credentials");
            let errors = FormErrors::message("Invalid email or password.");
            return Ok((StatusCode::UNAUTHORIZED, render(layout, email, errors)).into_response());
        }
        Err(e) if is_inline(&e) => {
            let errors = FormErrors::from_backend(&e);
            return Ok((StatusCode::BAD_REQUEST, render(layout, email, errors)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let Some(admin) = CurrentAdmin::from_login(&response) else {
        warn!(user_id = %response.user.id, "Non-admin account refused");
        state
            .backend()
            .logout(&response.tokens.access, &response.tokens.refresh)
            .await;
        let errors =
            FormErrors::message("Access denied. This console is for administrators only.");
        return Ok((StatusCode::FORBIDDEN, render(layout, email, errors)).into_response());
    };

    // Fresh session id on privilege change
    session.cycle_id().await?;
    session.insert(keys::CURRENT_ADMIN, &admin).await?;
    set_sentry_user(&admin.id, Some(&admin.email));
    info!(admin_id = %admin.id, "Admin signed in");

    set_flash(&session, Flash::success(format!("Welcome back, {}.", admin.name))).await?;
    Ok(Redirect::to("/").into_response())
}

/// Sign out: revoke the refresh token best-effort, then forget everything.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAdmin(admin): OptionalAdmin,
) -> Result<Redirect> {
    if let Some(admin) = admin {
        state
            .backend()
            .logout(&admin.access_token(), &admin.refresh_token())
            .await;
        info!(admin_id = %admin.id, "Admin signed out");
    }

    session.flush().await?;
    clear_sentry_user();
    set_flash(&session, Flash::info("You have been signed out.")).await?;
    Ok(Redirect::to(crate::error::LOGIN_PATH))
}
