//! Integration tests for the checkout attempt state machine.
//!
//! The machine is pure; these tests drive it with canned network results and
//! assert the ordering and failure guarantees the payment flow depends on.

use chrono::{Duration, Utc};
use lumora_core::{CurrencyCode, PaymentStatus, Role, UserId, UserStatus};
use lumora_storefront::backend::types::{PaymentIntent, PaymentRecord, Product};
use lumora_storefront::models::CurrentUser;
use lumora_storefront::payments::ProcessorCharge;
use lumora_storefront::services::cart::CartState;
use lumora_storefront::services::checkout::{CheckoutAttempt, CheckoutError, CheckoutState};
use rust_decimal::Decimal;

fn cart() -> CartState {
    let mut cart = CartState::default();
    cart.set_quantity(
        Product {
            id: "PROD1".to_string(),
            name: "Lip Gloss".to_string(),
            price: Decimal::new(4550, 2),
            currency: "LKR".to_string(),
            category: "Lips".to_string(),
            description: String::new(),
            image: String::new(),
        },
        1,
    )
    .expect("seed cart");
    cart
}

fn active_user() -> CurrentUser {
    CurrentUser {
        user_id: UserId::new("USR1"),
        username: "amara".to_string(),
        email: "amara@example.com".to_string(),
        role: Role::Customer,
        status: UserStatus::Active,
        image: String::new(),
        access_token: "token".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

fn intent() -> PaymentIntent {
    PaymentIntent {
        client_secret: "cs_secret".to_string(),
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
fn test_intent_carries_the_cart_total_before_confirmation() {
    let now = Utc::now();
    let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
    attempt.submit(&cart()).expect("submit");
    attempt
        .session_validated(&active_user(), now)
        .expect("session ok");

    // The draft is available - and must be sent - before the processor can
    // even be addressed: there is no client secret yet.
    let draft = attempt.payment_draft(now).expect("draft");
    assert_eq!(draft.amount, Decimal::new(4550, 2));
    assert_eq!(draft.currency, "LKR");
    assert_eq!(draft.status, PaymentStatus::Pending);
}

#[test]
fn test_processor_failure_keeps_payment_pending_and_cart_intact() {
    let now = Utc::now();
    let cart = cart();
    let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
    attempt.submit(&cart).expect("submit");
    attempt
        .session_validated(&active_user(), now)
        .expect("session ok");
    attempt.payment_draft(now).expect("draft");
    attempt.intent_created(intent()).expect("intent");

    let err = attempt.declined("insufficient funds");
    assert_eq!(err, CheckoutError::Declined("insufficient funds".to_string()));

    assert!(matches!(attempt.state(), CheckoutState::Failed(_)));
    let payment = attempt.payment().expect("pending record exists");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.transaction_id, None);
    assert!(!cart.is_empty(), "a failed attempt never clears the cart");
}

#[test]
fn test_completed_attempt_round_trips_processor_ids() {
    let now = Utc::now();
    let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
    attempt.submit(&cart()).expect("submit");
    attempt
        .session_validated(&active_user(), now)
        .expect("session ok");
    attempt.payment_draft(now).expect("draft");
    let secret = attempt.intent_created(intent()).expect("intent");
    assert_eq!(secret, "cs_secret");

    let finalization = attempt
        .confirmed(ProcessorCharge {
            transaction_id: "pi_7Hx".to_string(),
            charge_id: Some("ch_41".to_string()),
        })
        .expect("confirm");

    // Byte-for-byte: the processor's identifiers flow into the update
    // payload untouched.
    assert_eq!(finalization.transaction_id, "pi_7Hx");
    assert_eq!(finalization.payment_id.as_deref(), Some("ch_41"));
    assert_eq!(finalization.status, PaymentStatus::Completed);

    attempt.finalized().expect("finalize");
    assert_eq!(*attempt.state(), CheckoutState::Completed);
}

#[test]
fn test_expired_session_aborts_before_any_payment_exists() {
    let now = Utc::now();
    let mut expired = active_user();
    expired.expires_at = now - Duration::minutes(5);

    let mut attempt = CheckoutAttempt::new(CurrencyCode::LKR);
    attempt.submit(&cart()).expect("submit");

    assert_eq!(
        attempt.session_validated(&expired, now),
        Err(CheckoutError::Unauthenticated)
    );
    assert_eq!(*attempt.state(), CheckoutState::Idle);
    assert!(attempt.payment().is_none(), "no payment record was created");
}

#[test]
fn test_each_attempt_is_fresh_after_failure() {
    let now = Utc::now();
    let mut first = CheckoutAttempt::new(CurrencyCode::LKR);
    first.submit(&cart()).expect("submit");
    first
        .session_validated(&active_user(), now)
        .expect("session ok");
    first.payment_draft(now).expect("draft");
    first.intent_created(intent()).expect("intent");
    first.declined("card declined");

    // The failed attempt is dead: no event revives it.
    assert!(matches!(
        first.intent_created(intent()),
        Err(CheckoutError::OutOfOrder { .. })
    ));

    // A resubmission is a brand-new attempt with no reused payment record.
    let mut second = CheckoutAttempt::new(CurrencyCode::LKR);
    second.submit(&cart()).expect("submit");
    assert!(second.payment().is_none());
}
