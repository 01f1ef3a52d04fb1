//! Admin dashboard with the read-only order listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::backend::types::OrderRecord;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::views::{Nav, format_amount};
use crate::state::AppState;

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub customer_id: String,
    pub total: String,
    pub status: String,
}

impl OrderView {
    fn from_record(order: &OrderRecord, currency: &str) -> Self {
        Self {
            id: order.id.clone(),
            customer_id: order.customer_id.clone(),
            total: format_amount(order.total, currency),
            status: order.status.clone(),
        }
    }
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/panel.html")]
pub struct PanelTemplate {
    pub nav: Option<Nav>,
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
}

/// Dashboard: management links plus the order list.
#[instrument(skip(state, user))]
pub async fn show(State(state): State<AppState>, RequireAdmin(user): RequireAdmin) -> PanelTemplate {
    let currency = state.config().currency.code();

    let (orders, error) = match state.backend().orders_all(&user.access_token).await {
        Ok(orders) => (
            orders
                .iter()
                .map(|o| OrderView::from_record(o, currency))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::error!("Loading orders failed: {e}");
            (Vec::new(), Some("Loading orders failed.".to_string()))
        }
    };

    PanelTemplate {
        nav: Some(Nav::from(&user)),
        orders,
        error,
    }
}
