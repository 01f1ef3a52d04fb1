//! Integration tests for the data-access boundaries: product id validation,
//! category normalization, and session claim decoding.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use lumora_core::{ProductId, Role, UserStatus};
use lumora_storefront::backend::conversions::{
    UNKNOWN_CATEGORY, canonical_category_name, convert_product,
};
use lumora_storefront::backend::types::{Category, CategoryRef};
use lumora_storefront::services::auth::{AuthError, TokenClaims, decode_claims};
use serde_json::json;

fn categories() -> Vec<Category> {
    vec![Category {
        id: "CAT1".to_string(),
        name: "Lips".to_string(),
        description: String::new(),
        image: String::new(),
    }]
}

// =============================================================================
// Product id format
// =============================================================================

#[test]
fn test_update_id_format_is_enforced_locally() {
    // The exact failure the update path must catch before any network call.
    assert!(ProductId::parse("abc").is_err());

    assert!(ProductId::parse("PROD12").is_ok());
    assert!(ProductId::parse("PROD").is_err());
    assert!(ProductId::parse("PROD1x").is_err());
}

// =============================================================================
// Category normalization
// =============================================================================

#[test]
fn test_both_category_representations_normalize_identically() {
    let cats = categories();

    let from_id = canonical_category_name(Some(&CategoryRef::Name("CAT1".to_string())), &cats);
    let from_object = convert_product(
        json!({
            "id": "PROD1",
            "name": "Lip Gloss",
            "price": 10,
            "category": {"id": "CAT1", "name": "Lips"},
        }),
        &cats,
    )
    .expect("valid product")
    .category;

    assert_eq!(from_id, "Lips");
    assert_eq!(from_object, "Lips");
}

#[test]
fn test_unresolvable_category_gets_placeholder_not_error() {
    let name = canonical_category_name(Some(&CategoryRef::Name("CAT404".to_string())), &categories());
    assert_eq!(name, UNKNOWN_CATEGORY);
}

#[test]
fn test_malformed_product_records_are_dropped() {
    assert!(convert_product(json!({"name": "No id", "price": 3}), &[]).is_none());
    assert!(convert_product(json!(42), &[]).is_none());
}

// =============================================================================
// Session claims
// =============================================================================

fn token(status: UserStatus, exp_offset_secs: i64) -> String {
    let claims = TokenClaims {
        sub: "USR1".to_string(),
        username: "amara".to_string(),
        email: "amara@example.com".to_string(),
        role: Role::Customer,
        status,
        exp: Utc::now().timestamp() + exp_offset_secs,
        iat: Utc::now().timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-signing-key"),
    )
    .expect("encode token")
}

#[test]
fn test_inactive_status_is_visible_in_decoded_claims() {
    let claims = decode_claims(&token(UserStatus::Inactive, 3600)).expect("decode");
    assert_eq!(claims.status, UserStatus::Inactive);
    assert!(!claims.status.is_active(), "login must reject this account");
}

#[test]
fn test_expired_token_is_rejected_at_decode_time() {
    assert!(matches!(
        decode_claims(&token(UserStatus::Active, -3600)),
        Err(AuthError::Expired)
    ));
}
