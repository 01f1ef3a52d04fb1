//! Cart route handlers.
//!
//! Quantity mutations use HTMX fragments. Every mutation follows the same
//! discipline: fetch the authoritative cart, apply the rule locally to get
//! the value to push, push it, then **re-fetch** before rendering. The local
//! merge is never trusted for correctness - quantity edits can race across
//! tabs, and the backend's answer wins.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::cart::{CartError, CartState};
use crate::state::AppState;

use super::views::{CartView, Nav};

// =============================================================================
// Forms & queries
// =============================================================================

/// Add-to-cart form data (from the product grid).
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Quantity/remove form data (from the cart table).
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: String,
}

/// Query parameters for error display on the cart page.
#[derive(Debug, Deserialize)]
pub struct CartMessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Option<Nav>,
    pub cart: CartView,
    pub notice: Option<String>,
    pub error: Option<String>,
    /// Processor publishable key for the hosted card fields.
    pub processor_public_key: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub notice: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch the authoritative cart for the session user.
async fn load_cart(state: &AppState, user: &CurrentUser) -> Result<CartState> {
    let cart = state
        .backend()
        .cart(&user.access_token, user.user_id.as_str())
        .await?;
    Ok(CartState::from_record(cart))
}

fn cart_view(state: &AppState, cart: &CartState) -> CartView {
    CartView::from_state(cart, state.config().currency.code())
}

/// Push one absolute quantity and re-fetch, rendering the items fragment.
async fn push_and_render(
    state: &AppState,
    user: &CurrentUser,
    product_id: &str,
    item_count: u32,
) -> Result<CartItemsTemplate> {
    state
        .backend()
        .cart_set_item(
            &user.access_token,
            user.user_id.as_str(),
            product_id,
            item_count,
        )
        .await?;

    // Read-after-write: re-pull the authoritative cart.
    let cart = load_cart(state, user).await?;
    Ok(CartItemsTemplate {
        cart: cart_view(state, &cart),
        notice: None,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page (always loads from the backend).
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CartMessageQuery>,
) -> CartShowTemplate {
    let cart = match load_cart(&state, &user).await {
        Ok(cart) => cart_view(&state, &cart),
        Err(e) => {
            tracing::warn!("Failed to fetch cart for {}: {e}", user.user_id);
            CartView::empty(state.config().currency.code())
        }
    };

    CartShowTemplate {
        nav: Some(Nav::from(&user)),
        cart,
        notice: None,
        error: query.error.map(|code| match code.as_str() {
            "empty_cart" => "Your cart is empty.".to_string(),
            "quantity_floor" => "Item count cannot be less than 1.".to_string(),
            "payment_start" => "Payment could not be started. Please try again.".to_string(),
            "payment_failed" => "Payment failed! Your card was not charged.".to_string(),
            "missing_card" => "Please enter your card details.".to_string(),
            other => other.to_string(),
        }),
        processor_public_key: state.config().processor.public_key.clone(),
    }
}

/// Add a product to the cart, or replace the quantity of an existing line.
#[instrument(skip(state, user, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);

    let products = state.backend().products_all().await?;
    let Some(product) = products.into_iter().find(|p| p.id == form.product_id) else {
        return Err(crate::error::AppError::NotFound(format!(
            "Product not found: {}",
            form.product_id
        )));
    };

    let mut cart = load_cart(&state, &user).await?;
    if let Err(CartError::QuantityFloor) = cart.set_quantity(product, quantity) {
        return Ok(
            axum::response::Redirect::to("/shopping-cart?error=quantity_floor").into_response(),
        );
    }

    state
        .backend()
        .cart_set_item(
            &user.access_token,
            user.user_id.as_str(),
            &form.product_id,
            quantity,
        )
        .await?;

    // The cart page re-pulls the backend cart on render.
    Ok(axum::response::Redirect::to("/shopping-cart").into_response())
}

/// Increase a line by one (HTMX fragment).
#[instrument(skip(state, user, form), fields(product_id = %form.product_id))]
pub async fn increase(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let mut cart = load_cart(&state, &user).await?;

    match cart.increment(&form.product_id) {
        Ok(new_count) => Ok(push_and_render(&state, &user, &form.product_id, new_count)
            .await?
            .into_response()),
        Err(e) => Ok(CartItemsTemplate {
            cart: cart_view(&state, &cart),
            notice: Some(e.to_string()),
        }
        .into_response()),
    }
}

/// Decrease a line by one (HTMX fragment).
///
/// Decrementing a line already at 1 is rejected with a notice; the line is
/// kept. Removal is only ever the explicit remove button.
#[instrument(skip(state, user, form), fields(product_id = %form.product_id))]
pub async fn decrease(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let mut cart = load_cart(&state, &user).await?;

    match cart.decrement(&form.product_id) {
        Ok(new_count) => Ok(push_and_render(&state, &user, &form.product_id, new_count)
            .await?
            .into_response()),
        Err(e) => Ok(CartItemsTemplate {
            cart: cart_view(&state, &cart),
            notice: Some(e.to_string()),
        }
        .into_response()),
    }
}

/// Remove a line (HTMX fragment): backend delete, then full re-fetch.
#[instrument(skip(state, user, form), fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CartLineForm>,
) -> Result<CartItemsTemplate> {
    state
        .backend()
        .cart_remove_item(&user.access_token, user.user_id.as_str(), &form.product_id)
        .await?;

    let cart = load_cart(&state, &user).await?;
    Ok(CartItemsTemplate {
        cart: cart_view(&state, &cart),
        notice: None,
    })
}
