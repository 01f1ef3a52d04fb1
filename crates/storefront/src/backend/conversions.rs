//! Record-by-record conversion of backend JSON into wire types.
//!
//! Listings are fetched as raw JSON arrays and converted one element at a
//! time: a record that is missing required fields or carries the wrong shape
//! is dropped (with a debug log) instead of failing the whole response.
//! Category references are normalized here, at the data-access boundary, so
//! the dual backend representation never reaches view logic.

use serde::Deserialize;
use serde_json::Value;

use super::types::{Cart, CartItem, Category, CategoryRef, OrderRecord, PaymentRecord, Product, UserRecord};

/// Display name used when a product's category reference cannot be resolved.
pub const UNKNOWN_CATEGORY: &str = "Unknown category";

/// Raw product record as the backend sends it (category still dual-shaped).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    id: String,
    name: String,
    price: rust_decimal::Decimal,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    category: Option<CategoryRef>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCartItem {
    product: Value,
    item_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCart {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    items: Vec<Value>,
}

/// Resolve a raw category reference to the canonical category name.
///
/// Bare strings may hold either a category id or already the name; both are
/// looked up against the loaded category list. An embedded object carries the
/// name directly.
pub fn canonical_category_name(raw: Option<&CategoryRef>, categories: &[Category]) -> String {
    match raw {
        Some(CategoryRef::Embedded(embedded)) => embedded.name.clone(),
        Some(CategoryRef::Name(value)) => categories
            .iter()
            .find(|cat| cat.name == *value || cat.id == *value)
            .map_or_else(|| UNKNOWN_CATEGORY.to_string(), |cat| cat.name.clone()),
        None => UNKNOWN_CATEGORY.to_string(),
    }
}

/// Convert one product record, or drop it.
///
/// Records without an id or a name are unusable for any view and are
/// excluded rather than surfaced as errors.
pub fn convert_product(value: Value, categories: &[Category]) -> Option<Product> {
    let raw: RawProduct = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("Dropping malformed product record: {e}");
            return None;
        }
    };

    if raw.id.is_empty() || raw.name.is_empty() {
        tracing::debug!("Dropping product record without id or name");
        return None;
    }

    Some(Product {
        category: canonical_category_name(raw.category.as_ref(), categories),
        id: raw.id,
        name: raw.name,
        price: raw.price,
        currency: raw.currency,
        description: raw.description,
        image: raw.image,
    })
}

/// Convert one category record, or drop it.
pub fn convert_category(value: Value) -> Option<Category> {
    let category: Category = match serde_json::from_value(value) {
        Ok(category) => category,
        Err(e) => {
            tracing::debug!("Dropping malformed category record: {e}");
            return None;
        }
    };

    if category.id.is_empty() || category.name.is_empty() {
        return None;
    }

    Some(category)
}

/// Convert a cart response, dropping malformed lines.
pub fn convert_cart(value: Value, categories: &[Category]) -> Cart {
    let raw: RawCart = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("Dropping malformed cart record: {e}");
            return Cart::default();
        }
    };

    let items = raw
        .items
        .into_iter()
        .filter_map(|line| {
            let raw_line: RawCartItem = serde_json::from_value(line).ok()?;
            let product = convert_product(raw_line.product, categories)?;
            Some(CartItem {
                product,
                item_count: raw_line.item_count,
            })
        })
        .collect();

    Cart {
        user_id: raw.user_id,
        items,
    }
}

/// Convert one user record, or drop it.
pub fn convert_user(value: Value) -> Option<UserRecord> {
    let user: UserRecord = serde_json::from_value(value).ok()?;
    if user.user_id.is_empty() {
        return None;
    }
    Some(user)
}

/// Convert one payment record, or drop it.
pub fn convert_payment(value: Value) -> Option<PaymentRecord> {
    serde_json::from_value(value)
        .map_err(|e| tracing::debug!("Dropping malformed payment record: {e}"))
        .ok()
}

/// Convert one order record, or drop it.
pub fn convert_order(value: Value) -> Option<OrderRecord> {
    serde_json::from_value(value)
        .map_err(|e| tracing::debug!("Dropping malformed order record: {e}"))
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: "CAT1".to_string(),
                name: "Lips".to_string(),
                description: String::new(),
                image: String::new(),
            },
            Category {
                id: "CAT2".to_string(),
                name: "Skincare".to_string(),
                description: String::new(),
                image: String::new(),
            },
        ]
    }

    #[test]
    fn test_category_by_id_and_by_name_normalize_to_same_name() {
        let cats = categories();
        let by_id = canonical_category_name(Some(&CategoryRef::Name("CAT1".to_string())), &cats);
        let by_name = canonical_category_name(Some(&CategoryRef::Name("Lips".to_string())), &cats);
        let embedded = canonical_category_name(
            Some(&CategoryRef::Embedded(super::super::types::EmbeddedCategory {
                id: Some("CAT1".to_string()),
                name: "Lips".to_string(),
            })),
            &cats,
        );

        assert_eq!(by_id, "Lips");
        assert_eq!(by_name, "Lips");
        assert_eq!(embedded, "Lips");
    }

    #[test]
    fn test_unresolvable_category() {
        let cats = categories();
        assert_eq!(
            canonical_category_name(Some(&CategoryRef::Name("CAT99".to_string())), &cats),
            UNKNOWN_CATEGORY
        );
        assert_eq!(canonical_category_name(None, &cats), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_convert_product_embedded_category_object() {
        let value = json!({
            "id": "PROD1",
            "name": "Lip Gloss",
            "price": 10,
            "currency": "LKR",
            "category": {"id": "CAT1", "name": "Lips"},
        });

        let product = convert_product(value, &categories()).unwrap();
        assert_eq!(product.category, "Lips");
        assert_eq!(product.price, rust_decimal::Decimal::from(10));
    }

    #[test]
    fn test_convert_product_drops_malformed() {
        // Missing name entirely
        assert!(convert_product(json!({"id": "PROD1", "price": 5}), &[]).is_none());
        // Empty id
        assert!(
            convert_product(
                json!({"id": "", "name": "Thing", "price": 5}),
                &[]
            )
            .is_none()
        );
        // Not even an object
        assert!(convert_product(json!("nope"), &[]).is_none());
    }

    #[test]
    fn test_convert_cart_drops_malformed_lines() {
        let value = json!({
            "userId": "USR1",
            "items": [
                {"product": {"id": "PROD1", "name": "Lip Gloss", "price": 10, "category": "Lips"}, "itemCount": 2},
                {"product": {"id": "", "name": "", "price": 0}, "itemCount": 1},
                {"broken": true},
            ],
        });

        let cart = convert_cart(value, &categories());
        assert_eq!(cart.user_id, "USR1");
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product.id, "PROD1");
        assert_eq!(cart.items[0].item_count, 2);
    }
}
