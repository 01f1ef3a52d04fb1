//! Cache value wrapper for the backend list caches.

use super::types::{Category, Product};

/// Values stored in the backend client's list cache.
#[derive(Clone)]
pub enum CacheValue {
    /// Cached product listing.
    Products(Vec<Product>),
    /// Cached category listing.
    Categories(Vec<Category>),
}
