//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use freshwater_backend::{AdminQuery, AdminOrder, DashboardStats};
use freshwater_core::OrderStatus;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::AdminLayout;
use crate::state::AppState;

/// Orders shown in the "needs attention" panel.
const RECENT_PENDING: usize = 5;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: AdminLayout,
    pub stats: DashboardStats,
    pub pending_orders: Vec<AdminOrder>,
}

/// Dashboard page handler.
#[instrument(skip(state, admin, layout))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
) -> Result<DashboardTemplate> {
    let token = admin.access_token();
    let pending = AdminQuery::default().filter("status", Some(OrderStatus::Pending.as_str().to_string()));

    let (stats, pending) = tokio::try_join!(
        state.backend().dashboard_stats(&token),
        state.backend().admin_list_orders(&token, &pending),
    )?;

    Ok(DashboardTemplate {
        layout,
        stats,
        pending_orders: pending.results.into_iter().take(RECENT_PENDING).collect(),
    })
}
