//! In-memory cart state container.
//!
//! The backend owns the durable cart; this container mirrors one fetched
//! response and applies the quantity rules locally so the route layer knows
//! what value to push. Invariants:
//!
//! - at most one line per distinct product id
//! - every line's count is >= 1; a decrement at the floor is rejected with a
//!   user-facing notice, never stored as zero (removal is only ever the
//!   explicit remove operation)
//!
//! Every mutation the route layer performs is pushed to the backend and the
//! cart is then re-fetched, so this state is never trusted across requests.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::backend::types::{Cart, CartItem, Product};

/// Cart rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// An operation would take a line's count below 1.
    #[error("item count cannot be less than 1")]
    QuantityFloor,

    /// The addressed product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(String),
}

/// One user's cart, mirrored from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    /// Build cart state from a backend cart response.
    ///
    /// Lines whose product lacks an id or a name are dropped; lines with a
    /// zero count (which the backend should never store) are dropped too.
    #[must_use]
    pub fn from_record(cart: Cart) -> Self {
        let mut state = Self::default();
        state.replace_all(cart.items);
        state
    }

    /// Replace the whole state with a freshly fetched cart.
    pub fn replace_all(&mut self, items: Vec<CartItem>) {
        self.items = items
            .into_iter()
            .filter(|line| {
                !line.product.id.is_empty() && !line.product.name.is_empty() && line.item_count >= 1
            })
            .collect();
        self.dedupe();
    }

    /// Keep the first line per product id. Backend responses should already
    /// be unique; this guards the invariant against a misbehaving record.
    fn dedupe(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.items.len());
        self.items.retain(|line| {
            if seen.iter().any(|id| *id == line.product.id) {
                false
            } else {
                seen.push(line.product.id.clone());
                true
            }
        });
    }

    /// Set the absolute quantity for a product: replaces the count of an
    /// existing line, or appends a new one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityFloor`] for a zero count.
    pub fn set_quantity(&mut self, product: Product, count: u32) -> Result<(), CartError> {
        if count == 0 {
            return Err(CartError::QuantityFloor);
        }

        if let Some(line) = self.items.iter_mut().find(|l| l.product.id == product.id) {
            line.item_count = count;
        } else {
            self.items.push(CartItem {
                product,
                item_count: count,
            });
        }
        Ok(())
    }

    /// Increase a line's count by one. Returns the new count (the value to
    /// push to the backend).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line matches.
    pub fn increment(&mut self, product_id: &str) -> Result<u32, CartError> {
        let line = self
            .items
            .iter_mut()
            .find(|l| l.product.id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.to_string()))?;
        line.item_count += 1;
        Ok(line.item_count)
    }

    /// Decrease a line's count by one. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityFloor`] when the line is already at 1
    /// (the line is left untouched), or [`CartError::NotInCart`].
    pub fn decrement(&mut self, product_id: &str) -> Result<u32, CartError> {
        let line = self
            .items
            .iter_mut()
            .find(|l| l.product.id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.to_string()))?;

        if line.item_count <= 1 {
            return Err(CartError::QuantityFloor);
        }
        line.item_count -= 1;
        Ok(line.item_count)
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line matches.
    pub fn remove(&mut self, product_id: &str) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|l| l.product.id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Empty the cart (after a successful checkout).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price * count` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|line| line.product.price * Decimal::from(line.item_count))
            .sum()
    }

    /// Current count for a product, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> Option<u32> {
        self.items
            .iter()
            .find(|l| l.product.id == product_id)
            .map(|l| l.item_count)
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            currency: "LKR".to_string(),
            category: "Lips".to_string(),
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn test_no_duplicate_lines_after_operation_sequence() {
        let mut cart = CartState::default();
        cart.set_quantity(product("PROD1", 10), 1).unwrap();
        cart.set_quantity(product("PROD2", 20), 2).unwrap();
        cart.set_quantity(product("PROD1", 10), 5).unwrap();
        cart.increment("PROD1").unwrap();
        cart.decrement("PROD2").unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of("PROD1"), Some(6));
        assert_eq!(cart.quantity_of("PROD2"), Some(1));
    }

    #[test]
    fn test_set_quantity_zero_rejected() {
        let mut cart = CartState::default();
        assert_eq!(
            cart.set_quantity(product("PROD1", 10), 0),
            Err(CartError::QuantityFloor)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_at_floor_rejected_and_line_kept() {
        let mut cart = CartState::default();
        cart.set_quantity(product("PROD1", 10), 1).unwrap();

        assert_eq!(cart.decrement("PROD1"), Err(CartError::QuantityFloor));
        // The line must survive the rejected decrement with its count intact.
        assert_eq!(cart.quantity_of("PROD1"), Some(1));
    }

    #[test]
    fn test_increment_unknown_product() {
        let mut cart = CartState::default();
        assert_eq!(
            cart.increment("PROD9"),
            Err(CartError::NotInCart("PROD9".to_string()))
        );
    }

    #[test]
    fn test_remove_then_total() {
        let mut cart = CartState::default();
        cart.set_quantity(product("PROD1", 10), 2).unwrap();
        cart.set_quantity(product("PROD2", 5), 3).unwrap();
        assert_eq!(cart.total(), Decimal::from(35));

        cart.remove("PROD2").unwrap();
        assert_eq!(cart.total(), Decimal::from(20));
        assert_eq!(cart.remove("PROD2"), Err(CartError::NotInCart("PROD2".to_string())));
    }

    #[test]
    fn test_total_with_fractional_prices() {
        let mut cart = CartState::default();
        let mut gloss = product("PROD1", 0);
        gloss.price = Decimal::new(1550, 2); // 15.50
        let mut balm = product("PROD2", 0);
        balm.price = Decimal::new(1500, 2); // 15.00

        cart.set_quantity(gloss, 2).unwrap();
        cart.set_quantity(balm, 1).unwrap();
        assert_eq!(cart.total(), Decimal::new(4650, 2));
    }

    #[test]
    fn test_replace_all_drops_malformed_and_duplicate_lines() {
        let mut cart = CartState::default();
        cart.replace_all(vec![
            CartItem {
                product: product("PROD1", 10),
                item_count: 2,
            },
            CartItem {
                product: product("", 10),
                item_count: 1,
            },
            CartItem {
                product: product("PROD1", 10),
                item_count: 9,
            },
            CartItem {
                product: product("PROD3", 10),
                item_count: 0,
            },
        ]);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("PROD1"), Some(2));
    }
}
