//! Checkout attempt state machine.
//!
//! One attempt sequences: session validation, payment-intent creation on the
//! backend (a `PENDING` payment record carrying the processor client secret),
//! card confirmation with the processor, and finalization (payment marked
//! `COMPLETED`, cart cleared). The machine itself is pure - the route handler
//! performs the network calls and feeds the results in - which keeps every
//! transition testable without I/O.
//!
//! There is no automatic retry anywhere: a failed attempt is terminal and a
//! resubmission starts a new attempt with a new payment record. A declined
//! confirmation leaves the already-created payment record `PENDING` and the
//! cart untouched.

use chrono::{DateTime, Utc};
use lumora_core::{CurrencyCode, PaymentStatus};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::backend::types::{PaymentDraft, PaymentFinalization, PaymentIntent, PaymentRecord};
use crate::models::CurrentUser;
use crate::payments::ProcessorCharge;
use crate::services::cart::CartState;

/// Failures of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Submission with an empty cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// Missing or expired session at validation time.
    #[error("you must be logged in to pay")]
    Unauthenticated,

    /// The backend refused to create the payment intent.
    #[error("payment could not be started: {0}")]
    IntentFailed(String),

    /// The processor refused the charge.
    #[error("payment failed: {0}")]
    Declined(String),

    /// An event arrived in a state that does not accept it.
    #[error("checkout event {event} is not valid in state {state}")]
    OutOfOrder {
        state: &'static str,
        event: &'static str,
    },
}

/// States of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing submitted yet.
    Idle,
    /// Submitted; the session is being checked.
    ValidatingSession,
    /// Creating the `PENDING` payment record on the backend.
    CreatingIntent,
    /// Confirming the card token with the processor.
    ConfirmingWithProcessor,
    /// Marking the payment `COMPLETED` and clearing the cart.
    Finalizing,
    /// Terminal: the payment went through.
    Completed,
    /// Terminal: the attempt failed; the user must resubmit.
    Failed(String),
}

impl CheckoutState {
    const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ValidatingSession => "ValidatingSession",
            Self::CreatingIntent => "CreatingIntent",
            Self::ConfirmingWithProcessor => "ConfirmingWithProcessor",
            Self::Finalizing => "Finalizing",
            Self::Completed => "Completed",
            Self::Failed(_) => "Failed",
        }
    }
}

/// One checkout attempt.
#[derive(Debug, Clone)]
pub struct CheckoutAttempt {
    state: CheckoutState,
    currency: CurrencyCode,
    amount: Decimal,
    user_id: Option<String>,
    email: Option<String>,
    payment: Option<PaymentRecord>,
}

impl CheckoutAttempt {
    /// A fresh, idle attempt in the deployment currency.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            state: CheckoutState::Idle,
            currency,
            amount: Decimal::ZERO,
            user_id: None,
            email: None,
            payment: None,
        }
    }

    fn expect(&self, wanted: &CheckoutState, event: &'static str) -> Result<(), CheckoutError> {
        if self.state == *wanted {
            Ok(())
        } else {
            Err(CheckoutError::OutOfOrder {
                state: self.state.name(),
                event,
            })
        }
    }

    /// The user submitted the payment form: capture the cart total.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] (the attempt stays idle) or an
    /// out-of-order error.
    pub fn submit(&mut self, cart: &CartState) -> Result<(), CheckoutError> {
        self.expect(&CheckoutState::Idle, "submit")?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.amount = cart.total();
        self.state = CheckoutState::ValidatingSession;
        Ok(())
    }

    /// Validate the session. An expired token sends the attempt back to idle
    /// so the user can be prompted to log in.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Unauthenticated`] or an out-of-order error.
    pub fn session_validated(
        &mut self,
        user: &CurrentUser,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        self.expect(&CheckoutState::ValidatingSession, "session_validated")?;

        if user.is_expired(now) {
            self.state = CheckoutState::Idle;
            return Err(CheckoutError::Unauthenticated);
        }

        self.user_id = Some(user.user_id.as_str().to_string());
        self.email = Some(user.email.clone());
        self.state = CheckoutState::CreatingIntent;
        Ok(())
    }

    /// The payload for the backend payment-create call: the full cart total,
    /// `PENDING`, in the deployment currency. Built before anything is sent
    /// to the processor.
    ///
    /// # Errors
    ///
    /// Returns an out-of-order error outside `CreatingIntent`.
    pub fn payment_draft(&self, now: DateTime<Utc>) -> Result<PaymentDraft, CheckoutError> {
        self.expect(&CheckoutState::CreatingIntent, "payment_draft")?;

        let (Some(user_id), Some(email)) = (self.user_id.as_ref(), self.email.as_ref()) else {
            return Err(CheckoutError::OutOfOrder {
                state: self.state.name(),
                event: "payment_draft",
            });
        };

        Ok(PaymentDraft {
            amount: self.amount,
            currency: self.currency.code().to_string(),
            payment_method: "card".to_string(),
            status: PaymentStatus::Pending,
            user_id: user_id.clone(),
            email: email.clone(),
            created_at: now,
        })
    }

    /// The backend accepted the draft; hold the `PENDING` record and hand the
    /// client secret back for the confirmation step.
    ///
    /// # Errors
    ///
    /// Returns an out-of-order error outside `CreatingIntent`.
    pub fn intent_created(&mut self, intent: PaymentIntent) -> Result<String, CheckoutError> {
        self.expect(&CheckoutState::CreatingIntent, "intent_created")?;
        self.payment = Some(intent.payment);
        self.state = CheckoutState::ConfirmingWithProcessor;
        Ok(intent.client_secret)
    }

    /// The backend refused to create the intent. Terminal.
    pub fn intent_failed(&mut self, reason: &str) -> CheckoutError {
        self.state = CheckoutState::Failed(reason.to_string());
        CheckoutError::IntentFailed(reason.to_string())
    }

    /// The processor confirmed the charge: produce the finalization payload
    /// carrying the processor identifiers verbatim.
    ///
    /// # Errors
    ///
    /// Returns an out-of-order error outside `ConfirmingWithProcessor`.
    pub fn confirmed(
        &mut self,
        charge: ProcessorCharge,
    ) -> Result<PaymentFinalization, CheckoutError> {
        self.expect(&CheckoutState::ConfirmingWithProcessor, "confirmed")?;
        self.state = CheckoutState::Finalizing;
        Ok(PaymentFinalization {
            status: PaymentStatus::Completed,
            transaction_id: charge.transaction_id,
            payment_id: charge.charge_id,
        })
    }

    /// The processor refused the charge. Terminal; the `PENDING` payment
    /// record is left as-is and never reused.
    pub fn declined(&mut self, reason: &str) -> CheckoutError {
        self.state = CheckoutState::Failed(reason.to_string());
        CheckoutError::Declined(reason.to_string())
    }

    /// Payment marked `COMPLETED` and cart cleared.
    ///
    /// # Errors
    ///
    /// Returns an out-of-order error outside `Finalizing`.
    pub fn finalized(&mut self) -> Result<(), CheckoutError> {
        self.expect(&CheckoutState::Finalizing, "finalized")?;
        self.state = CheckoutState::Completed;
        Ok(())
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// The captured cart total.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The backend payment record created for this attempt, if any.
    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentRecord> {
        self.payment.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::types::Product;
    use lumora_core::{Role, UserId, UserStatus};

    fn cart_totalling_45_50() -> CartState {
        let mut cart = CartState::default();
        cart.set_quantity(
            Product {
                id: "PROD1".to_string(),
                name: "Lip Gloss".to_string(),
                price: Decimal::new(1550, 2),
                currency: "LKR".to_string(),
                category: "Lips".to_string(),
                description: String::new(),
                image: String::new(),
            },
            2,
        )
        .unwrap();
        cart.set_quantity(
            Product {
                id: "PROD2".to_string(),
                name: "Rose Balm".to_string(),
                price: Decimal::new(1450, 2),
                currency: "LKR".to_string(),
                category: "Lips".to_string(),
                description: String::new(),
                image: String::new(),
            },
            1,
        )
        .unwrap();
        cart
    }

    fn user(expires_at: DateTime<Utc>) -> CurrentUser {
        CurrentUser {
            user_id: UserId::new("USR1"),
            username: "amara".to_string(),
            email: "amara@example.com".to_string(),
            role: Role::Customer,
            status: UserStatus::Active,
            image: String::new(),
            access_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    fn pending_intent() -> PaymentIntent {
        PaymentIntent {
            client_secret: "cs_123".to_string(),
            payment: PaymentRecord {
                id: "PAY1".to_string(),
                amount: Decimal::new(4550, 2),
                currency: "LKR".to_string(),
                payment_method: "card".to_string(),
                status: PaymentStatus::Pending,
                user_id: "USR1".to_string(),
                email: "amara@example.com".to_string(),
                transaction_id: None,
                payment_id: None,
            },
        }
    }

    #[test]
    fn test_intent_amount_is_cart_total_before_any_processor_step() {
        let now = Utc::now();
        let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
        attempt.submit(&cart_totalling_45_50()).unwrap();
        attempt
            .session_validated(&user(now + chrono::Duration::hours(1)), now)
            .unwrap();

        let draft = attempt.payment_draft(now).unwrap();
        assert_eq!(draft.amount, Decimal::new(4550, 2));
        assert_eq!(draft.currency, "LKR");
        assert_eq!(draft.status, PaymentStatus::Pending);
        assert_eq!(draft.payment_method, "card");
        // No processor interaction is possible yet: confirming now is out of order.
        assert!(matches!(
            attempt.clone().confirmed(ProcessorCharge {
                transaction_id: "tx".to_string(),
                charge_id: None,
            }),
            Err(CheckoutError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_empty_cart_rejected_and_attempt_stays_idle() {
        let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
        assert_eq!(
            attempt.submit(&CartState::default()),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(*attempt.state(), CheckoutState::Idle);
    }

    #[test]
    fn test_expired_session_returns_to_idle() {
        let now = Utc::now();
        let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
        attempt.submit(&cart_totalling_45_50()).unwrap();

        let result = attempt.session_validated(&user(now - chrono::Duration::minutes(1)), now);
        assert_eq!(result, Err(CheckoutError::Unauthenticated));
        assert_eq!(*attempt.state(), CheckoutState::Idle);
    }

    #[test]
    fn test_decline_leaves_payment_pending_and_cart_untouched() {
        let now = Utc::now();
        let cart = cart_totalling_45_50();
        let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
        attempt.submit(&cart).unwrap();
        attempt
            .session_validated(&user(now + chrono::Duration::hours(1)), now)
            .unwrap();
        attempt.payment_draft(now).unwrap();
        let secret = attempt.intent_created(pending_intent()).unwrap();
        assert_eq!(secret, "cs_123");

        let err = attempt.declined("card declined");
        assert_eq!(err, CheckoutError::Declined("card declined".to_string()));
        assert_eq!(
            *attempt.state(),
            CheckoutState::Failed("card declined".to_string())
        );
        // The pending record is left exactly as created...
        assert_eq!(attempt.payment().unwrap().status, PaymentStatus::Pending);
        // ...and the cart was never cleared.
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_successful_attempt_carries_processor_ids_verbatim() {
        let now = Utc::now();
        let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
        attempt.submit(&cart_totalling_45_50()).unwrap();
        attempt
            .session_validated(&user(now + chrono::Duration::hours(1)), now)
            .unwrap();
        attempt.payment_draft(now).unwrap();
        attempt.intent_created(pending_intent()).unwrap();

        let finalization = attempt
            .confirmed(ProcessorCharge {
                transaction_id: "pi_9f3a".to_string(),
                charge_id: Some("ch_77".to_string()),
            })
            .unwrap();

        assert_eq!(finalization.status, PaymentStatus::Completed);
        assert_eq!(finalization.transaction_id, "pi_9f3a");
        assert_eq!(finalization.payment_id.as_deref(), Some("ch_77"));

        attempt.finalized().unwrap();
        assert_eq!(*attempt.state(), CheckoutState::Completed);
    }

    #[test]
    fn test_events_out_of_order_are_rejected() {
        let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
        assert!(matches!(
            attempt.intent_created(pending_intent()),
            Err(CheckoutError::OutOfOrder { .. })
        ));
        assert!(matches!(
            attempt.finalized(),
            Err(CheckoutError::OutOfOrder { .. })
        ));
        // A second submit on a moved-on attempt is also rejected.
        attempt.submit(&cart_totalling_45_50()).unwrap();
        assert!(matches!(
            attempt.submit(&cart_totalling_45_50()),
            Err(CheckoutError::OutOfOrder { .. })
        ));
    }
}
