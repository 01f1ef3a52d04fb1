//! Checkout route handler.
//!
//! Drives one [`CheckoutAttempt`](crate::services::checkout::CheckoutAttempt)
//! through its states, performing the network effects between transitions.
//! Failures are terminal for the attempt and surface back on the cart page;
//! a resubmission starts a fresh attempt with a fresh payment record.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{RequireAuth, clear_current_user};
use crate::services::cart::CartState;
use crate::services::checkout::{CheckoutAttempt, CheckoutError};
use crate::state::AppState;

/// Checkout form data. The hosted card fields tokenize the card in the
/// browser; only the single-use token reaches this handler.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub card_token: String,
}

/// Run one checkout attempt for the session user's cart.
#[instrument(skip(state, session, user, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    if form.card_token.is_empty() {
        return Ok(Redirect::to("/shopping-cart?error=missing_card").into_response());
    }

    // Always start from the authoritative cart.
    let cart = CartState::from_record(
        state
            .backend()
            .cart(&user.access_token, user.user_id.as_str())
            .await?,
    );

    let mut attempt = CheckoutAttempt::new(state.config().currency);

    match attempt.submit(&cart) {
        Err(CheckoutError::EmptyCart) => {
            return Ok(Redirect::to("/shopping-cart?error=empty_cart").into_response());
        }
        other => other?,
    }

    let now = Utc::now();
    if attempt.session_validated(&user, now).is_err() {
        // The token went stale between page load and submission.
        let _ = clear_current_user(&session).await;
        return Ok(Redirect::to("/login?error=session").into_response());
    }

    // Create the PENDING payment record; its amount is the cart total and it
    // is in the books before the processor is ever contacted.
    let draft = attempt.payment_draft(now)?;
    let intent = match state
        .backend()
        .payment_create(&user.access_token, &draft)
        .await
    {
        Ok(intent) => intent,
        Err(e) => {
            let err = attempt.intent_failed(&e.to_string());
            tracing::error!("Checkout intent creation failed: {err}");
            return Ok(Redirect::to("/shopping-cart?error=payment_start").into_response());
        }
    };

    let client_secret = attempt.intent_created(intent)?;

    // Confirm with the processor. A decline is terminal: the payment record
    // stays PENDING and the cart is untouched.
    let charge = match state
        .processor()
        .confirm_card_payment(&client_secret, &form.card_token)
        .await
    {
        Ok(charge) => charge,
        Err(e) => {
            let err = attempt.declined(&e.to_string());
            tracing::warn!("Checkout declined: {err}");
            return Ok(Redirect::to("/shopping-cart?error=payment_failed").into_response());
        }
    };

    // Mark the payment COMPLETED with the processor identifiers, clear the
    // cart, and send the user home.
    let finalization = attempt.confirmed(charge)?;
    let payment_id = attempt
        .payment()
        .map(|p| p.id.clone())
        .unwrap_or_default();

    state
        .backend()
        .payment_finalize(&user.access_token, &payment_id, &finalization)
        .await?;

    state
        .backend()
        .cart_clear(&user.access_token, user.user_id.as_str())
        .await?;

    attempt.finalized()?;

    tracing::info!(
        amount = %attempt.amount(),
        transaction_id = %finalization.transaction_id,
        "Checkout completed"
    );

    Ok(Redirect::to("/").into_response())
}
