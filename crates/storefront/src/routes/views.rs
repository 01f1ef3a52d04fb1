//! View structs shared across page templates.
//!
//! Templates stay dumb: money is formatted here, role checks become plain
//! booleans, and nothing backend-shaped leaks into the HTML layer.

use lumora_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

use crate::backend::types::Product;
use crate::models::CurrentUser;
use crate::services::cart::CartState;

/// Navbar display data.
#[derive(Clone)]
pub struct Nav {
    pub username: String,
    pub image: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for Nav {
    fn from(user: &CurrentUser) -> Self {
        Self {
            username: user.username.clone(),
            image: user.image.clone(),
            is_admin: user.is_admin(),
        }
    }
}

/// Format a money amount with two decimal places and its currency code.
///
/// Recognized currency codes go through [`Price`]; anything else (product
/// records carry the code as free text) is formatted as-is.
#[must_use]
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    match currency.parse::<CurrencyCode>() {
        Ok(code) => Price::new(amount, code).to_string(),
        Err(_) => format!("{amount:.2} {currency}"),
    }
}

/// Product display data.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub description: String,
    pub image: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: format_amount(product.price, &product.currency),
            category: product.category.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
        }
    }
}

/// Cart line display data.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart display data.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub count: u32,
}

impl CartView {
    /// Render cart state for templates; the total is shown in the
    /// deployment's checkout currency.
    #[must_use]
    pub fn from_state(cart: &CartState, checkout_currency: &str) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|line| CartItemView {
                product_id: line.product.id.clone(),
                name: line.product.name.clone(),
                unit_price: format_amount(line.product.price, &line.product.currency),
                quantity: line.item_count,
                line_total: format_amount(
                    line.product.price * Decimal::from(line.item_count),
                    &line.product.currency,
                ),
            })
            .collect();

        Self {
            items,
            total: format_amount(cart.total(), checkout_currency),
            count: cart.items().iter().map(|line| line.item_count).sum(),
        }
    }

    /// An empty cart.
    #[must_use]
    pub fn empty(checkout_currency: &str) -> Self {
        Self {
            items: Vec::new(),
            total: format_amount(Decimal::ZERO, checkout_currency),
            count: 0,
        }
    }
}
