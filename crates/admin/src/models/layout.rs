//! Header, navigation and flash state for `base.html`.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use tower_sessions::Session;

use super::{CurrentAdmin, Flash, keys};

/// Data every admin page layout needs.
#[derive(Debug, Clone, Default)]
pub struct AdminLayout {
    pub name: String,
    pub email: String,
    pub current_path: String,
    pub flash: Option<Flash>,
}

impl AdminLayout {
    /// Whether the nav entry for `section` should be highlighted.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        if section == "/" {
            return self.current_path == "/";
        }
        self.current_path == section
            || self
                .current_path
                .strip_prefix(section)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl<S> FromRequestParts<S> for AdminLayout
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    /// Never fails. Extracting consumes the pending flash message.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested section routers see a stripped URI.
        let current_path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0)
            .path()
            .to_string();
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self {
                current_path,
                ..Self::default()
            });
        };

        let admin = session
            .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten();
        let flash = session.remove::<Flash>(keys::FLASH).await.ok().flatten();

        Ok(Self {
            name: admin.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            email: admin.map(|a| a.email).unwrap_or_default(),
            current_path,
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn layout(path: &str) -> AdminLayout {
        AdminLayout {
            current_path: path.to_string(),
            ..AdminLayout::default()
        }
    }

    #[test]
    fn test_nav_highlighting() {
        assert!(layout("/").is_active("/"));
        assert!(!layout("/products").is_active("/"));
        assert!(layout("/products").is_active("/products"));
        assert!(layout("/products/3f9a/edit").is_active("/products"));
        assert!(!layout("/products-archive").is_active("/products"));
    }

    #[tokio::test]
    async fn test_current_path_includes_nested_section() {
        let (mut parts, ()) = Request::builder()
            .uri("/42/edit")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(OriginalUri("/orders/42/edit".parse().unwrap()));

        let Ok(layout) = AdminLayout::from_request_parts(&mut parts, &()).await;
        assert_eq!(layout.current_path, "/orders/42/edit");
        assert!(layout.is_active("/orders"));
        assert!(!layout.is_active("/"));
    }
}
