//! Integration tests for the cart container and the product filter engine.
//!
//! These verify the invariants the shopping flows depend on: line uniqueness
//! per product id, the quantity floor of 1, and the filter engine's
//! deterministic narrowing.

use lumora_storefront::backend::types::Product;
use lumora_storefront::services::cart::{CartError, CartState};
use lumora_storefront::services::filter::{ALL_CATEGORIES, ProductFilter, filter_products};
use rust_decimal::Decimal;

fn product(id: &str, name: &str, category: &str, price: Decimal) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        currency: "LKR".to_string(),
        category: category.to_string(),
        description: String::new(),
        image: String::new(),
    }
}

// =============================================================================
// Cart container
// =============================================================================

#[test]
fn test_cart_uniqueness_holds_across_operation_sequences() {
    let mut cart = CartState::default();
    let gloss = product("PROD1", "Lip Gloss", "Lips", Decimal::from(10));
    let serum = product("PROD2", "Rose Serum", "Skincare", Decimal::from(32));

    cart.set_quantity(gloss.clone(), 1).expect("add gloss");
    cart.set_quantity(serum, 2).expect("add serum");
    cart.set_quantity(gloss, 4).expect("re-add gloss replaces count");
    cart.increment("PROD2").expect("bump serum");
    cart.decrement("PROD1").expect("drop gloss");

    assert_eq!(cart.len(), 2, "one line per product id");
    assert_eq!(cart.quantity_of("PROD1"), Some(3));
    assert_eq!(cart.quantity_of("PROD2"), Some(3));
}

#[test]
fn test_cart_decrement_at_one_is_rejected_not_zeroed() {
    let mut cart = CartState::default();
    cart.set_quantity(product("PROD1", "Lip Gloss", "Lips", Decimal::from(10)), 1)
        .expect("add");

    assert_eq!(cart.decrement("PROD1"), Err(CartError::QuantityFloor));
    assert_eq!(
        cart.quantity_of("PROD1"),
        Some(1),
        "the line survives at count 1; it is never stored as zero"
    );
}

#[test]
fn test_cart_total_matches_line_sums() {
    let mut cart = CartState::default();
    cart.set_quantity(
        product("PROD1", "Lip Gloss", "Lips", Decimal::new(1550, 2)),
        2,
    )
    .expect("add");
    cart.set_quantity(
        product("PROD2", "Rose Balm", "Lips", Decimal::new(1450, 2)),
        1,
    )
    .expect("add");

    assert_eq!(cart.total(), Decimal::new(4550, 2));

    cart.remove("PROD1").expect("remove");
    assert_eq!(cart.total(), Decimal::new(1450, 2));

    cart.clear();
    assert_eq!(cart.total(), Decimal::ZERO);
    assert!(cart.is_empty());
}

// =============================================================================
// Filter engine
// =============================================================================

fn catalog() -> Vec<Product> {
    vec![
        product("PROD1", "Lip Gloss", "Lips", Decimal::from(10)),
        product("PROD2", "Rose Serum", "Skincare", Decimal::from(32)),
        product("PROD3", "Lip Liner", "Lips", Decimal::from(18)),
    ]
}

#[test]
fn test_filter_all_categories_and_empty_name_is_identity() {
    let products = catalog();
    let filter = ProductFilter {
        category: ALL_CATEGORIES.to_string(),
        ..ProductFilter::default()
    };

    assert_eq!(
        filter_products(&products, &filter),
        products,
        "full input, unchanged order"
    );
}

#[test]
fn test_filter_name_substring_case_insensitive() {
    let products = vec![product("PROD1", "Lip Gloss", "Lips", Decimal::from(10))];
    let filter = ProductFilter {
        name: "lip".to_string(),
        ..ProductFilter::default()
    };

    let matched = filter_products(&products, &filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "Lip Gloss");
}

#[test]
fn test_filter_inverted_price_bounds_yield_nothing() {
    let filter = ProductFilter {
        min_price: Some(Decimal::from(20)),
        max_price: Some(Decimal::from(10)),
        ..ProductFilter::default()
    };

    assert!(filter_products(&catalog(), &filter).is_empty());
}

#[test]
fn test_filter_is_pure() {
    let products = catalog();
    let filter = ProductFilter {
        category: "Lips".to_string(),
        name: "liner".to_string(),
        min_price: None,
        max_price: Some(Decimal::from(20)),
    };

    let first = filter_products(&products, &filter);
    let second = filter_products(&products, &filter);
    assert_eq!(first, second, "same input, same output");
    assert_eq!(products, catalog(), "input is never mutated");
}
