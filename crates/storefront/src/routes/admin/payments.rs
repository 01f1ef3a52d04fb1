//! Payment listing (read-only).

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::backend::types::PaymentRecord;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::views::Nav;
use crate::state::AppState;

/// Payment display data.
#[derive(Clone)]
pub struct PaymentView {
    /// Processor charge id when confirmed, otherwise the record id.
    pub reference: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub email: String,
}

impl From<&PaymentRecord> for PaymentView {
    fn from(payment: &PaymentRecord) -> Self {
        Self {
            reference: payment
                .payment_id
                .clone()
                .unwrap_or_else(|| payment.id.clone()),
            amount: format!("{:.2}", payment.amount),
            currency: payment.currency.clone(),
            status: payment.status.to_string(),
            email: if payment.email.is_empty() {
                "N/A".to_string()
            } else {
                payment.email.clone()
            },
        }
    }
}

/// Payments page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/payments.html")]
pub struct PaymentsTemplate {
    pub nav: Option<Nav>,
    pub payments: Vec<PaymentView>,
    pub error: Option<String>,
}

/// List all payments.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> PaymentsTemplate {
    let (payments, error) = match state.backend().payments_all(&user.access_token).await {
        Ok(payments) => (payments.iter().map(PaymentView::from).collect(), None),
        Err(e) => {
            tracing::error!("Loading payments failed: {e}");
            (Vec::new(), Some("Loading payments failed.".to_string()))
        }
    };

    PaymentsTemplate {
        nav: Some(Nav::from(&user)),
        payments,
        error,
    }
}
