//! Wire types for the commerce backend REST API.
//!
//! The backend speaks camelCase JSON. Everything list-shaped is converted
//! record-by-record (see [`super::conversions`]) so one malformed record
//! never takes a whole listing down.

use chrono::{DateTime, Utc};
use lumora_core::{PaymentStatus, Role, UserStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A catalog product, normalized for view logic.
///
/// `category` always holds the canonical category *name*; the backend's dual
/// representation (bare string vs embedded object) is resolved at conversion
/// time and never reaches handlers or templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// The backend stores a product's category either as a bare string (an id or
/// a name) or as an embedded `{id, name}` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryRef {
    /// Embedded category object.
    Embedded(EmbeddedCategory),
    /// Bare id-or-name string.
    Name(String),
}

/// Embedded category object inside a product record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedCategory {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Payload for product create/update calls.
///
/// The backend schema stores the category by *name*, so the admin form's
/// category id selection is resolved before this is built.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub category: String,
    pub description: String,
    pub image: String,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// Payload for category create/update calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub image: String,
}

// =============================================================================
// Cart
// =============================================================================

/// A user's server-persisted cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// One `(product, quantity)` cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub item_count: u32,
}

/// Payload for the cart item upsert call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: String,
    pub item_count: u32,
}

// =============================================================================
// Users & auth
// =============================================================================

/// A user record as returned by the user service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub image: String,
}

/// Payload for user create/update calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub image: String,
    pub status: UserStatus,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub user: UserRecord,
}

// =============================================================================
// Payments & orders
// =============================================================================

/// A payment record as persisted by the payment service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    /// Set only after processor confirmation.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Processor-side charge id, set only after confirmation.
    #[serde(default)]
    pub payment_id: Option<String>,
}

/// Payload for creating a new `PENDING` payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Response of the payment create call: the persisted record plus the
/// processor client secret authorizing the confirmation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment: PaymentRecord,
}

/// Payload for marking a payment `COMPLETED` after processor confirmation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFinalization {
    pub status: PaymentStatus,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

/// An order, read-only in this application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub status: String,
}

// =============================================================================
// Upload tickets
// =============================================================================

/// Request body of `POST /api/cloudinary/signature`.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureRequest {
    pub timestamp: i64,
}

/// A backend-issued signed upload ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSignature {
    pub signature: String,
}
