//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend assigns string identifiers to every entity. The
//! `define_id!` macro wraps them so a `UserId` can never be passed where a
//! `CategoryId` is expected. Product ids additionally carry a server-side
//! format (`PROD` followed by digits) that must be enforced locally before an
//! update call leaves the process, so [`ProductId`] is a validated parse
//! rather than a plain wrapper.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use lumora_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("USR1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = OrderId::new("ORD1");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Server-assigned entity IDs
define_id!(UserId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(PaymentId);

/// Error returned when a product id fails format validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProductIdError {
    /// The input string is empty.
    #[error("product id cannot be empty")]
    Empty,
    /// The input does not match `PROD<digits>`.
    #[error("invalid product id format: {0:?} (expected PROD<digits>)")]
    Malformed(String),
}

/// A validated product identifier.
///
/// The backend assigns product ids as `PROD` followed by one or more digits
/// (`PROD1`, `PROD42`, ...). Update and delete calls address products by this
/// id in the URL path, so an id that fails the pattern is rejected here,
/// before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    const PREFIX: &'static str = "PROD";

    /// Parse a `ProductId`, enforcing the `PROD<digits>` format.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError`] if the input is empty or does not match the
    /// expected format.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }

        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| ProductIdError::Malformed(s.to_owned()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProductIdError::Malformed(s.to_owned()));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    define_id!(WidgetId);

    #[test]
    fn test_defined_id_roundtrip() {
        let id = WidgetId::new("W1");
        assert_eq!(id.as_str(), "W1");
        assert_eq!(format!("{id}"), "W1");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"W1\"");
        let back: WidgetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_product_id_valid() {
        assert!(ProductId::parse("PROD1").is_ok());
        assert!(ProductId::parse("PROD0042").is_ok());
        let id = ProductId::parse("PROD7").unwrap();
        assert_eq!(id.as_str(), "PROD7");
    }

    #[test]
    fn test_product_id_empty() {
        assert!(matches!(ProductId::parse(""), Err(ProductIdError::Empty)));
    }

    #[test]
    fn test_product_id_wrong_prefix() {
        assert!(matches!(
            ProductId::parse("abc"),
            Err(ProductIdError::Malformed(_))
        ));
        assert!(matches!(
            ProductId::parse("prod12"),
            Err(ProductIdError::Malformed(_))
        ));
    }

    #[test]
    fn test_product_id_missing_or_bad_digits() {
        assert!(ProductId::parse("PROD").is_err());
        assert!(ProductId::parse("PROD12x").is_err());
        assert!(ProductId::parse("PROD 12").is_err());
    }

    #[test]
    fn test_product_id_from_str() {
        let id: ProductId = "PROD3".parse().unwrap();
        assert_eq!(id.as_str(), "PROD3");
        assert!("3PROD".parse::<ProductId>().is_err());
    }
}
