//! Commerce backend REST API client.
//!
//! Every durable piece of state (catalog, carts, users, payments, orders)
//! lives behind this API; the storefront is a presentation layer over it.
//! Product and category listings are cached with `moka` (5-minute TTL) and
//! invalidated on admin mutations. Cart and payment calls are never cached.

mod cache;
pub mod conversions;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use lumora_core::ProductId;
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::BackendConfig;
use cache::CacheValue;
use conversions::{
    convert_cart, convert_category, convert_order, convert_payment, convert_product, convert_user,
};
use types::{
    Cart, CartItemInput, Category, CategoryInput, LoginResponse, OrderRecord, PaymentDraft,
    PaymentFinalization, PaymentIntent, PaymentRecord, ProductInput, Product, SignatureRequest,
    UploadSignature, UserInput, UserRecord,
};

const CACHE_KEY_PRODUCTS: &str = "products";
const CACHE_KEY_CATEGORIES: &str = "categories";

/// Errors returned by the backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access token missing, expired, or revoked upstream.
    #[error("backend rejected the access token")]
    Unauthorized,
}

/// Client for the commerce backend REST API.
///
/// Cheaply cloneable; holds the HTTP client and the list caches.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode the response body as JSON.
    ///
    /// Empty 2xx bodies decode to `Value::Null` (delete endpoints often
    /// return nothing).
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }

        let text = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(
                text.chars().take(200).collect::<String>(),
            ));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(BackendError::Parse)
    }

    async fn get_json(&self, path: &str, bearer: Option<&str>) -> Result<Value, BackendError> {
        let mut request = self.inner.client.get(self.url(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<Value, BackendError> {
        let mut request = self.inner.client.post(self.url(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    async fn put_json<B: Serialize + Sync>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<Value, BackendError> {
        let mut request = self.inner.client.put(self.url(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    async fn delete(&self, path: &str, bearer: Option<&str>) -> Result<Value, BackendError> {
        let mut request = self.inner.client.delete(self.url(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    /// Check backend reachability (used by the readiness probe).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.get_json("/health", None).await.map(|_| ())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Get the full product listing, normalized and cached.
    ///
    /// Malformed records are excluded rather than failing the listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_all(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(CACHE_KEY_PRODUCTS).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        // Categories are needed to normalize the dual category representation.
        let categories = self.categories_all().await?;

        let value = self.get_json("/products/all", None).await?;
        let products: Vec<Product> = value
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| convert_product(record, &categories))
            .collect();

        self.inner
            .cache
            .insert(
                CACHE_KEY_PRODUCTS.to_string(),
                CacheValue::Products(products.clone()),
            )
            .await;

        Ok(products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, product), fields(name = %product.name))]
    pub async fn product_save(
        &self,
        bearer: &str,
        product: &ProductInput,
    ) -> Result<(), BackendError> {
        self.post_json("/products/save", Some(bearer), product)
            .await?;
        self.invalidate_products().await;
        Ok(())
    }

    /// Update a product. The id has already passed `PROD<digits>` validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, product), fields(id = %id))]
    pub async fn product_update(
        &self,
        bearer: &str,
        id: &ProductId,
        product: &ProductInput,
    ) -> Result<(), BackendError> {
        self.put_json(&format!("/products/update/{id}"), Some(bearer), product)
            .await?;
        self.invalidate_products().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// The cached listing is updated with the id *passed to this call*, never
    /// an id from the response body - delete responses may omit it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(id = %id))]
    pub async fn product_delete(&self, bearer: &str, id: &str) -> Result<(), BackendError> {
        self.delete(&format!("/products/delete/{id}"), Some(bearer))
            .await?;

        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(CACHE_KEY_PRODUCTS).await
        {
            let remaining: Vec<Product> =
                products.into_iter().filter(|p| p.id != id).collect();
            self.inner
                .cache
                .insert(
                    CACHE_KEY_PRODUCTS.to_string(),
                    CacheValue::Products(remaining),
                )
                .await;
        }

        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Get the full category listing, cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories_all(&self) -> Result<Vec<Category>, BackendError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(CACHE_KEY_CATEGORIES).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let value = self.get_json("/categories/all", None).await?;
        let categories: Vec<Category> = value
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_category)
            .collect();

        self.inner
            .cache
            .insert(
                CACHE_KEY_CATEGORIES.to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, category), fields(name = %category.name))]
    pub async fn category_save(
        &self,
        bearer: &str,
        category: &CategoryInput,
    ) -> Result<(), BackendError> {
        self.post_json("/categories/save", Some(bearer), category)
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, category), fields(id = %id))]
    pub async fn category_update(
        &self,
        bearer: &str,
        id: &str,
        category: &CategoryInput,
    ) -> Result<(), BackendError> {
        self.put_json(&format!("/categories/update/{id}"), Some(bearer), category)
            .await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a category.
    ///
    /// As with products, the cached entry is removed by the id passed here.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(id = %id))]
    pub async fn category_delete(&self, bearer: &str, id: &str) -> Result<(), BackendError> {
        self.delete(&format!("/categories/delete/{id}"), Some(bearer))
            .await?;

        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(CACHE_KEY_CATEGORIES).await
        {
            let remaining: Vec<Category> =
                categories.into_iter().filter(|c| c.id != id).collect();
            self.inner
                .cache
                .insert(
                    CACHE_KEY_CATEGORIES.to_string(),
                    CacheValue::Categories(remaining),
                )
                .await;
        }
        // Product records referencing the category must re-normalize.
        self.inner.cache.invalidate(CACHE_KEY_PRODUCTS).await;

        Ok(())
    }

    // =========================================================================
    // Auth & users
    // =========================================================================

    /// Authenticate against the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, BackendError> {
        #[derive(Serialize)]
        struct Credentials<'a> {
            username: &'a str,
            password: &'a str,
        }

        let value = self
            .post_json("/auth/login", None, &Credentials { username, password })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: &UserInput) -> Result<(), BackendError> {
        self.post_json("/users/save", None, user).await?;
        Ok(())
    }

    /// Update an existing user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, user), fields(id = %id))]
    pub async fn user_update(
        &self,
        bearer: &str,
        id: &str,
        user: &UserInput,
    ) -> Result<(), BackendError> {
        self.put_json(&format!("/users/update/{id}"), Some(bearer), user)
            .await?;
        Ok(())
    }

    /// List all users (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer))]
    pub async fn users_all(&self, bearer: &str) -> Result<Vec<UserRecord>, BackendError> {
        let value = self.get_json("/users/all", Some(bearer)).await?;
        Ok(value
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_user)
            .collect())
    }

    /// Flip a user between active and inactive (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(id = %id))]
    pub async fn user_toggle_status(
        &self,
        bearer: &str,
        id: &str,
    ) -> Result<UserRecord, BackendError> {
        let value = self
            .put_json(&format!("/users/toggle/{id}"), Some(bearer), &Value::Null)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a password-reset OTP to the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn send_otp(&self, email: &str) -> Result<(), BackendError> {
        #[derive(Serialize)]
        struct SendOtp<'a> {
            email: &'a str,
        }

        self.post_json("/users/send-otp", None, &SendOtp { email })
            .await?;
        Ok(())
    }

    /// Reset a password with a previously delivered OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the OTP is rejected or the request fails.
    #[instrument(skip(self, otp, new_password), fields(email = %email))]
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ResetPassword<'a> {
            email: &'a str,
            otp: &'a str,
            new_password: &'a str,
        }

        self.post_json(
            "/users/reset-password",
            None,
            &ResetPassword {
                email,
                otp,
                new_password,
            },
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Cart (never cached - mutable state)
    // =========================================================================

    /// Fetch the authoritative cart for a user.
    ///
    /// A user without a cart record yet gets an empty cart, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(user_id = %user_id))]
    pub async fn cart(&self, bearer: &str, user_id: &str) -> Result<Cart, BackendError> {
        let categories = self.categories_all().await?;
        match self.get_json(&format!("/cart/{user_id}"), Some(bearer)).await {
            Ok(value) => Ok(convert_cart(value, &categories)),
            Err(BackendError::NotFound(_)) => Ok(Cart {
                user_id: user_id.to_string(),
                items: Vec::new(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Upsert one cart line (sets the absolute quantity).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(user_id = %user_id, product_id = %product_id, item_count))]
    pub async fn cart_set_item(
        &self,
        bearer: &str,
        user_id: &str,
        product_id: &str,
        item_count: u32,
    ) -> Result<(), BackendError> {
        let input = CartItemInput {
            product_id: product_id.to_string(),
            item_count,
        };
        self.put_json(&format!("/cart/{user_id}/items"), Some(bearer), &input)
            .await?;
        Ok(())
    }

    /// Remove one cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn cart_remove_item(
        &self,
        bearer: &str,
        user_id: &str,
        product_id: &str,
    ) -> Result<(), BackendError> {
        self.delete(
            &format!("/cart/{user_id}/items/{product_id}"),
            Some(bearer),
        )
        .await?;
        Ok(())
    }

    /// Empty a user's cart (invoked after successful checkout).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer), fields(user_id = %user_id))]
    pub async fn cart_clear(&self, bearer: &str, user_id: &str) -> Result<(), BackendError> {
        self.delete(&format!("/cart/{user_id}"), Some(bearer)).await?;
        Ok(())
    }

    // =========================================================================
    // Payments & orders
    // =========================================================================

    /// Create a `PENDING` payment record; the response carries the processor
    /// client secret for the confirmation step.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, draft), fields(amount = %draft.amount))]
    pub async fn payment_create(
        &self,
        bearer: &str,
        draft: &PaymentDraft,
    ) -> Result<PaymentIntent, BackendError> {
        let value = self.post_json("/payments/save", Some(bearer), draft).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Mark a payment `COMPLETED` with the processor's identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer, finalization), fields(id = %id))]
    pub async fn payment_finalize(
        &self,
        bearer: &str,
        id: &str,
        finalization: &PaymentFinalization,
    ) -> Result<PaymentRecord, BackendError> {
        let value = self
            .put_json(&format!("/payments/update/{id}"), Some(bearer), finalization)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// List all payments (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer))]
    pub async fn payments_all(&self, bearer: &str) -> Result<Vec<PaymentRecord>, BackendError> {
        let value = self.get_json("/payments/all", Some(bearer)).await?;
        Ok(value
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_payment)
            .collect())
    }

    /// List all orders (admin only, read-only).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, bearer))]
    pub async fn orders_all(&self, bearer: &str) -> Result<Vec<OrderRecord>, BackendError> {
        let value = self.get_json("/orders/all", Some(bearer)).await?;
        Ok(value
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(convert_order)
            .collect())
    }

    // =========================================================================
    // Upload tickets
    // =========================================================================

    /// Request a signed upload ticket for a direct image-host upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn upload_signature(&self, timestamp: i64) -> Result<UploadSignature, BackendError> {
        let value = self
            .post_json("/api/cloudinary/signature", None, &SignatureRequest { timestamp })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Cache management
    // =========================================================================

    /// Drop the cached product listing.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate(CACHE_KEY_PRODUCTS).await;
    }

    /// Drop both cached listings.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(CACHE_KEY_PRODUCTS).await;
        self.inner.cache.invalidate(CACHE_KEY_CATEGORIES).await;
    }
}
