//! Order list, detail and fulfilment updates.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use freshwater_backend::{AdminOrder, AdminOrderDetail, AdminQuery, FieldErrors, OrderUpdate};
use freshwater_core::{OrderId, OrderStatus, PaymentStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::form::{is_inline, options, page_number, parse_optional, parse_required};
use crate::models::{AdminLayout, Flash, FormErrors, Pager, SelectOption, set_flash};
use crate::state::AppState;

const LIST_PATH: &str = "/orders";

/// Search and filters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// Fulfilment form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub estimated_delivery: String,
    #[serde(default)]
    pub order_notes: String,
}

impl From<&OrderUpdate> for OrderForm {
    fn from(update: &OrderUpdate) -> Self {
        Self {
            status: update.status.as_str().to_string(),
            payment_status: update.payment_status.as_str().to_string(),
            tracking_number: update.tracking_number.clone(),
            estimated_delivery: update
                .estimated_delivery
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            order_notes: update.order_notes.clone(),
        }
    }
}

impl OrderForm {
    /// Parse into an update, applying the shipped-needs-tracking rule.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn parse(&self) -> std::result::Result<OrderUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let update = OrderUpdate {
            status: parse_required(
                &mut errors,
                "status",
                &self.status,
                OrderStatus::Pending,
                "Choose a status.",
            ),
            payment_status: parse_required(
                &mut errors,
                "payment_status",
                &self.payment_status,
                PaymentStatus::Pending,
                "Choose a payment status.",
            ),
            tracking_number: self.tracking_number.trim().to_string(),
            estimated_delivery: parse_optional::<NaiveDate>(
                &mut errors,
                "estimated_delivery",
                &self.estimated_delivery,
                "Use the format YYYY-MM-DD.",
            ),
            order_notes: self.order_notes.trim().to_string(),
        };
        if let Err(invalid) = update.validate() {
            for (field, message) in invalid {
                errors.entry(field).or_insert(message);
            }
        }
        if errors.is_empty() { Ok(update) } else { Err(errors) }
    }
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: AdminLayout,
    pub orders: Vec<AdminOrder>,
    pub pager: Pager,
    pub search: String,
    pub status_options: Vec<SelectOption>,
    pub payment_options: Vec<SelectOption>,
}

/// Order detail with the fulfilment form.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: AdminLayout,
    pub order: AdminOrderDetail,
    pub form: OrderForm,
    pub errors: FormErrors,
    pub status_options: Vec<SelectOption>,
    pub payment_options: Vec<SelectOption>,
}

impl OrderShowTemplate {
    fn new(layout: AdminLayout, order: AdminOrderDetail, form: OrderForm, errors: FormErrors) -> Self {
        Self {
            layout,
            status_options: status_options(Some(&form.status)),
            payment_options: payment_options(Some(&form.payment_status)),
            order,
            form,
            errors,
        }
    }
}

fn status_options(selected: Option<&str>) -> Vec<SelectOption> {
    options(OrderStatus::ALL.iter().map(|s| (s.as_str(), s.label())), selected)
}

fn payment_options(selected: Option<&str>) -> Vec<SelectOption> {
    options(PaymentStatus::ALL.iter().map(|s| (s.as_str(), s.label())), selected)
}

/// Order list with search, filters and paging.
#[instrument(skip(state, admin, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Query(query): Query<OrderListQuery>,
) -> Result<OrdersIndexTemplate> {
    let page = page_number(query.page.as_deref());
    let admin_query = AdminQuery::default()
        .page(page)
        .search(query.search.clone())
        .filter("status", query.status.clone())
        .filter("payment_status", query.payment_status.clone());

    let orders = state
        .backend()
        .admin_list_orders(&admin.access_token(), &admin_query)
        .await?;

    let pager = Pager::new(
        LIST_PATH,
        &orders,
        page,
        &[
            ("search", query.search.as_deref()),
            ("status", query.status.as_deref()),
            ("payment_status", query.payment_status.as_deref()),
        ],
    );

    Ok(OrdersIndexTemplate {
        layout,
        orders: orders.results,
        pager,
        search: query.search.unwrap_or_default(),
        status_options: status_options(query.status.as_deref()),
        payment_options: payment_options(query.payment_status.as_deref()),
    })
}

/// One order with items, addresses and the fulfilment form.
#[instrument(skip(state, admin, layout), fields(order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    layout: AdminLayout,
    Path(id): Path<OrderId>,
) -> Result<OrderShowTemplate> {
    let order = state
        .backend()
        .admin_get_order(&admin.access_token(), id)
        .await?;
    let form = OrderForm::from(&OrderUpdate::from(&order));
    Ok(OrderShowTemplate::new(layout, order, form, FormErrors::default()))
}

/// Apply a fulfilment update.
#[instrument(skip(state, admin, session, layout, form), fields(order_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let token = admin.access_token();
    let errors = match form.parse() {
        Ok(update) => match state.backend().admin_update_order(&token, id, &update).await {
            Ok(order) => {
                info!(order_number = %order.order_number, status = %order.status, "Order updated");
                set_flash(
                    &session,
                    Flash::success(format!("Order {} updated.", order.order_number)),
                )
                .await?;
                return Ok(Redirect::to(&format!("{LIST_PATH}/{id}")).into_response());
            }
            Err(e) if is_inline(&e) => FormErrors::from_backend(&e),
            Err(e) => return Err(e.into()),
        },
        Err(invalid) => FormErrors::from_fields(invalid),
    };

    let order = state.backend().admin_get_order(&token, id).await?;
    Ok(OrderShowTemplate::new(layout, order, form, errors).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(status: &str, tracking: &str) -> OrderForm {
        OrderForm {
            status: status.to_string(),
            payment_status: "paid".to_string(),
            tracking_number: tracking.to_string(),
            ..OrderForm::default()
        }
    }

    #[test]
    fn test_shipped_requires_tracking_number() {
        let errors = form("shipped", "  ").parse().unwrap_err();
        assert!(errors.contains_key("tracking_number"));

        let update = form("shipped", "1Z999AA10123456784").parse().unwrap();
        assert_eq!(update.status, OrderStatus::Shipped);
        assert_eq!(update.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_delivery_date_parsing() {
        let mut ok = form("processing", "");
        ok.estimated_delivery = "2026-11-02".to_string();
        let update = ok.parse().unwrap();
        assert_eq!(
            update.estimated_delivery,
            NaiveDate::from_ymd_opt(2026, 11, 2)
        );

        let mut bad = form("processing", "");
        bad.estimated_delivery = "next week".to_string();
        assert!(bad.parse().unwrap_err().contains_key("estimated_delivery"));
    }

    #[test]
    fn test_unknown_status_is_field_error() {
        let errors = form("lost_at_sea", "").parse().unwrap_err();
        assert!(errors.contains_key("status"));
    }

    #[test]
    fn test_form_prefills_from_update() {
        let update = OrderUpdate {
            status: OrderStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            tracking_number: String::new(),
            estimated_delivery: NaiveDate::from_ymd_opt(2026, 12, 24),
            order_notes: "Pack with heat pack".to_string(),
        };
        let form = OrderForm::from(&update);
        assert_eq!(form.status, "confirmed");
        assert_eq!(form.estimated_delivery, "2026-12-24");
    }
}
