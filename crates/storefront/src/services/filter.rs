//! Product filter engine.
//!
//! A pure function over a product collection: deterministic, side-effect
//! free, and cheap enough to run on every page render. Both the storefront
//! grid and the admin product list go through it.

use rust_decimal::Decimal;

use crate::backend::types::Product;

/// Category filter value meaning "do not filter by category".
pub const ALL_CATEGORIES: &str = "All";

/// A filter specification from the browse/manage screens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Exact category name; empty or [`ALL_CATEGORIES`] passes everything.
    pub category: String,
    /// Case-insensitive name substring; empty passes everything.
    pub name: String,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        let matches_category = self.category.is_empty()
            || self.category == ALL_CATEGORIES
            || product.category == self.category;

        let matches_name = self.name.is_empty()
            || product
                .name
                .to_lowercase()
                .contains(&self.name.to_lowercase());

        let matches_min = self.min_price.is_none_or(|min| product.price >= min);
        let matches_max = self.max_price.is_none_or(|max| product.price <= max);

        matches_category && matches_name && matches_min && matches_max
    }
}

/// Narrow a product collection by category, name substring, and price range.
///
/// Malformed records (missing id or name) are excluded rather than matched;
/// input order is preserved.
#[must_use]
pub fn filter_products(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|p| !p.id.is_empty() && !p.name.is_empty())
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

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

    fn catalog() -> Vec<Product> {
        vec![
            product("PROD1", "Lip Gloss", "Lips", Decimal::from(10)),
            product("PROD2", "Rose Serum", "Skincare", Decimal::from(32)),
            product("PROD3", "Lip Liner", "Lips", Decimal::from(18)),
        ]
    }

    #[test]
    fn test_all_and_empty_name_returns_input_unchanged() {
        let products = catalog();
        let filter = ProductFilter {
            category: ALL_CATEGORIES.to_string(),
            ..ProductFilter::default()
        };

        assert_eq!(filter_products(&products, &filter), products);
    }

    #[test]
    fn test_name_substring_is_case_insensitive() {
        let products = vec![product("PROD1", "Lip Gloss", "Lips", Decimal::from(10))];
        let filter = ProductFilter {
            name: "lip".to_string(),
            ..ProductFilter::default()
        };

        let result = filter_products(&products, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Lip Gloss");
    }

    #[test]
    fn test_category_must_match_exactly() {
        let filter = ProductFilter {
            category: "Lips".to_string(),
            ..ProductFilter::default()
        };

        let result = filter_products(&catalog(), &filter);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.category == "Lips"));
    }

    #[test]
    fn test_inclusive_price_bounds() {
        let filter = ProductFilter {
            min_price: Some(Decimal::from(18)),
            max_price: Some(Decimal::from(32)),
            ..ProductFilter::default()
        };

        let result = filter_products(&catalog(), &filter);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "PROD2");
        assert_eq!(result[1].id, "PROD3");
    }

    #[test]
    fn test_inverted_bounds_match_nothing() {
        let filter = ProductFilter {
            min_price: Some(Decimal::from(20)),
            max_price: Some(Decimal::from(10)),
            ..ProductFilter::default()
        };

        assert!(filter_products(&catalog(), &filter).is_empty());
    }

    #[test]
    fn test_absent_bound_does_not_constrain() {
        let filter = ProductFilter {
            min_price: Some(Decimal::from(18)),
            ..ProductFilter::default()
        };

        let result = filter_products(&catalog(), &filter);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_malformed_records_excluded() {
        let mut products = catalog();
        products.push(product("", "Ghost", "Lips", Decimal::from(1)));
        products.push(product("PROD9", "", "Lips", Decimal::from(1)));

        let result = filter_products(&products, &ProductFilter::default());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_filters_combine() {
        let filter = ProductFilter {
            category: "Lips".to_string(),
            name: "LINER".to_string(),
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::from(20)),
        };

        let result = filter_products(&catalog(), &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "PROD3");
    }
}
