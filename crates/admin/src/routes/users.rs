//! User management.
//!
//! The backend refuses role changes and self-deletion with 403. Both are
//! surfaced to the operator rather than treated as failures of the console.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use freshwater_backend::{
    AdminQuery, AdminUser, AdminUserCreate, AdminUserUpdate, BackendError, FieldErrors,
    UserProfile,
};
use freshwater_core::{ExperienceLevel, UserId, UserRole};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::form::{checkbox, is_inline, options, page_number, parse_optional};
use crate::models::{AdminLayout, Flash, FormErrors, Pager, SelectOption, set_flash};
use crate::state::AppState;

const LIST_PATH: &str = "/users";

// =============================================================================
// Query / Form Types
// =============================================================================

/// Search and filters for the user list.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<String>,
}

/// New user form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub is_active: Option<String>,
}

impl From<&NewUserForm> for AdminUserCreate {
    fn from(form: &NewUserForm) -> Self {
        Self {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
            password_confirm: form.password_confirm.clone(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            is_active: checkbox(form.is_active.as_deref()),
        }
    }
}

/// Edit user form. `current_role` is the role the page was rendered with,
/// so a role is only sent when the operator changed it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditUserForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub is_active: Option<String>,
    pub role: Option<UserRole>,
    pub current_role: Option<UserRole>,
}

impl EditUserForm {
    fn from_user(user: &AdminUser) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            is_active: user.is_active.then(|| "on".to_string()),
            role: Some(user.role),
            current_role: Some(user.role),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        checkbox(self.is_active.as_deref())
    }

    /// The update body; `role` is only present when it changed.
    #[must_use]
    pub fn to_update(&self) -> AdminUserUpdate {
        let role = match (self.role, self.current_role) {
            (Some(role), Some(current)) if role != current => Some(role),
            (Some(role), None) => Some(role),
            _ => None,
        };
        AdminUserUpdate {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            is_active: self.is_active(),
            role,
        }
    }
}

/// Hobbyist profile form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub preferred_tank_size: String,
    pub newsletter_subscribed: Option<String>,
    pub marketing_emails: Option<String>,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn parse(&self) -> std::result::Result<UserProfile, FieldErrors> {
        let mut errors = FieldErrors::new();
        let profile = UserProfile {
            experience_level: parse_optional::<ExperienceLevel>(
                &mut errors,
                "experience_level",
                &self.experience_level,
                "Choose an experience level.",
            ),
            preferred_tank_size: parse_optional(
                &mut errors,
                "preferred_tank_size",
                &self.preferred_tank_size,
                "Enter a whole number of gallons.",
            ),
            newsletter_subscribed: checkbox(self.newsletter_subscribed.as_deref()),
            marketing_emails: checkbox(self.marketing_emails.as_deref()),
        };
        if errors.is_empty() { Ok(profile) } else { Err(errors) }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub layout: AdminLayout,
    pub users: Vec<AdminUser>,
    pub pager: Pager,
    pub search: String,
    pub role_options: Vec<SelectOption>,
    pub status_options: Vec<SelectOption>,
}

/// New user template.
#[derive(Template, WebTemplate)]
#[template(path = "users/new.html")]
pub struct NewUserTemplate {
    pub layout: AdminLayout,
    pub form: NewUserForm,
    pub errors: FormErrors,
}

/// Edit user template: account and profile forms side by side.
#[derive(Template, WebTemplate)]
#[template(path = "users/edit.html")]
pub struct EditUserTemplate {
    pub layout: AdminLayout,
    pub user: AdminUser,
    pub is_self: bool,
    pub form: EditUserForm,
    pub errors: FormErrors,
    pub role_options: Vec<SelectOption>,
    pub profile: UserProfile,
    pub tank_size: String,
    pub experience_options: Vec<SelectOption>,
    pub profile_errors: FormErrors,
}

impl EditUserTemplate {
    fn new(layout: AdminLayout, admin_id: UserId, user: AdminUser) -> Self {
        let form = EditUserForm::from_user(&user);
        let profile = user.profile.clone().unwrap_or_default();
        Self::with_forms(layout, admin_id, user, form, profile)
    }

    fn with_forms(
        layout: AdminLayout,
        admin_id: UserId,
        user: AdminUser,
        form: EditUserForm,
        profile: UserProfile,
    ) -> Self {
        let role = form.role.unwrap_or(user.role);
        Self {
            layout,
            is_self: user.id == admin_id,
            role_options: options(
                UserRole::ALL.iter().map(|r| (r.as_str(), r.label())),
                Some(role.as_str()),
            ),
            tank_size: profile
                .preferred_tank_size
                .map(|gallons| gallons.to_string())
                .unwrap_or_default(),
            experience_options: options(
                ExperienceLevel::ALL.iter().map(|l| (l.as_str(), l.label())),
                profile.experience_level.as_ref().map(ExperienceLevel::as_str),
            ),
            user,
            form,
            errors: FormErrors::default(),
            profile,
            profile_errors: FormErrors::default(),
        }
    }
}

fn edit_path(id: UserId) -> String {
    format!("{LIST_PATH}/{id}")
}

// =============================================================================
// Handlers
// =============================================================================

/// User list with search, filters and paging.
#[instrument(skip(state, admin, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Query(query): Query<UserListQuery>,
) -> Result<UsersIndexTemplate> {
    let page = page_number(query.page.as_deref());
    let admin_query = AdminQuery::default()
        .page(page)
        .search(query.search.clone())
        .filter("role", query.role.clone())
        .filter("is_active", query.is_active.clone());

    let users = state
        .backend()
        .admin_list_users(&admin.access_token(), &admin_query)
        .await?;

    let pager = Pager::new(
        LIST_PATH,
        &users,
        page,
        &[
            ("search", query.search.as_deref()),
            ("role", query.role.as_deref()),
            ("is_active", query.is_active.as_deref()),
        ],
    );

    Ok(UsersIndexTemplate {
        layout,
        users: users.results,
        pager,
        search: query.search.unwrap_or_default(),
        role_options: options(
            UserRole::ALL.iter().map(|r| (r.as_str(), r.label())),
            query.role.as_deref(),
        ),
        status_options: options(
            [("true", "Active"), ("false", "Inactive")],
            query.is_active.as_deref(),
        ),
    })
}

/// Blank user form.
pub async fn new(RequireAdmin(_admin): RequireAdmin, layout: AdminLayout) -> NewUserTemplate {
    NewUserTemplate {
        layout,
        form: NewUserForm {
            is_active: Some("on".to_string()),
            ..NewUserForm::default()
        },
        errors: FormErrors::default(),
    }
}

/// Create a customer account. The password is never echoed back.
#[instrument(skip(state, admin, session, layout, form), fields(email = %form.email))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Form(form): Form<NewUserForm>,
) -> Result<Response> {
    let input = AdminUserCreate::from(&form);
    let errors = match input.validate() {
        Ok(()) => match state
            .backend()
            .admin_create_user(&admin.access_token(), &input)
            .await
        {
            Ok(user) => {
                info!(user_id = %user.id, "User created");
                set_flash(&session, Flash::success(format!("Created {}.", user.email))).await?;
                return Ok(Redirect::to(&edit_path(user.id)).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    Ok(NewUserTemplate {
        layout,
        form: NewUserForm {
            password: String::new(),
            password_confirm: String::new(),
            ..form
        },
        errors,
    }
    .into_response())
}

/// Account and profile forms for one user.
#[instrument(skip(state, admin, layout), fields(user_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Path(id): Path<UserId>,
) -> Result<EditUserTemplate> {
    let user = state
        .backend()
        .admin_get_user(&admin.access_token(), id)
        .await?;
    Ok(EditUserTemplate::new(layout, admin.id, user))
}

/// Update account fields; a refused role change is shown on the form.
#[instrument(skip(state, admin, session, layout, form), fields(user_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<UserId>,
    Form(form): Form<EditUserForm>,
) -> Result<Response> {
    let token = admin.access_token();
    let update = form.to_update();

    let errors = match update.validate() {
        Ok(()) => match state.backend().admin_update_user(&token, id, &update).await {
            Ok(user) => {
                set_flash(&session, Flash::success(format!("Saved {}.", user.email))).await?;
                return Ok(Redirect::to(&edit_path(id)).into_response());
            }
            Err(BackendError::Forbidden(message)) => {
                warn!("Backend refused user update");
                FormErrors::message(message)
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let user = state.backend().admin_get_user(&token, id).await?;
    let profile = user.profile.clone().unwrap_or_default();
    let mut page = EditUserTemplate::with_forms(layout, admin.id, user, form, profile);
    page.errors = errors;
    Ok(page.into_response())
}

/// Update the hobbyist profile.
#[instrument(skip(state, admin, session, layout, form), fields(user_id = %id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<UserId>,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let token = admin.access_token();
    let errors = match form.parse() {
        Ok(profile) => match state
            .backend()
            .admin_update_user_profile(&token, id, &profile)
            .await
        {
            Ok(_) => {
                set_flash(&session, Flash::success("Profile saved.")).await?;
                return Ok(Redirect::to(&edit_path(id)).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let user = state.backend().admin_get_user(&token, id).await?;
    let mut page = EditUserTemplate::new(layout, admin.id, user);
    page.tank_size = form.preferred_tank_size.trim().to_string();
    page.profile_errors = errors;
    Ok(page.into_response())
}

/// Delete a user. Deleting your own account is refused by the backend and
/// reported as a flash message.
#[instrument(skip(state, admin, session), fields(user_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    match state
        .backend()
        .admin_delete_user(&admin.access_token(), id)
        .await
    {
        Ok(()) => {
            set_flash(&session, Flash::success("User deleted.")).await?;
            Ok(Redirect::to(LIST_PATH))
        }
        Err(BackendError::Forbidden(message)) => {
            warn!("Backend refused user deletion");
            set_flash(&session, Flash::error(message)).await?;
            Ok(Redirect::to(&edit_path(id)))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_only_sent_when_changed() {
        let mut form = EditUserForm {
            email: "guppy@aquatics.example".to_string(),
            role: Some(UserRole::User),
            current_role: Some(UserRole::User),
            ..EditUserForm::default()
        };
        assert_eq!(form.to_update().role, None);

        form.role = Some(UserRole::Admin);
        assert_eq!(form.to_update().role, Some(UserRole::Admin));
    }

    #[test]
    fn test_unticked_active_box_deactivates() {
        let form = EditUserForm {
            email: "guppy@aquatics.example".to_string(),
            ..EditUserForm::default()
        };
        assert!(!form.to_update().is_active);
    }

    #[test]
    fn test_short_password_rejected_before_backend() {
        let form = NewUserForm {
            username: "molly".to_string(),
            email: "molly@aquatics.example".to_string(),
            password: "short".to_string(),
            password_confirm: "short".to_string(),
            ..NewUserForm::default()
        };
        let errors = AdminUserCreate::from(&form).validate().unwrap_err();
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn test_profile_form_parses() {
        let form = ProfileForm {
            experience_level: "advanced".to_string(),
            preferred_tank_size: "75".to_string(),
            newsletter_subscribed: Some("on".to_string()),
            marketing_emails: None,
        };
        let profile = form.parse().unwrap();
        assert_eq!(profile.experience_level, Some(ExperienceLevel::Advanced));
        assert_eq!(profile.preferred_tank_size, Some(75));
        assert!(profile.newsletter_subscribed);
        assert!(!profile.marketing_emails);

        let bad = ProfileForm {
            preferred_tank_size: "lots".to_string(),
            ..ProfileForm::default()
        };
        assert!(bad.parse().unwrap_err().contains_key("preferred_tank_size"));
    }
}
