//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Product browsing with filters
//! GET  /about /contact /services - Static pages
//! GET  /health                   - Liveness check
//!
//! # Auth
//! GET/POST /login                - Sign in
//! GET/POST /register             - Sign up (with profile image upload)
//! POST /logout                   - Sign out
//! GET  /unauthorized             - Role rejection page
//! GET/POST /sendOtp              - Request a password-reset OTP
//! GET/POST /Reset-password-with-otp - Reset password (email via query param)
//!
//! # Cart & checkout
//! GET  /shopping-cart            - Cart page with payment form
//! POST /shopping-cart/add        - Add a product (absolute quantity)
//! POST /shopping-cart/increase   - +1 (HTMX fragment)
//! POST /shopping-cart/decrease   - -1, floor of 1 (HTMX fragment)
//! POST /shopping-cart/remove     - Remove a line (HTMX fragment)
//! POST /shopping-cart/checkout   - Run a checkout attempt
//!
//! # Account
//! GET/POST /account-settings     - Profile update
//!
//! # Uploads
//! POST /uploads/image            - Out-of-band signed image upload (HTMX)
//!
//! # Admin console (role-gated)
//! GET  /admin-panel              - Dashboard with recent orders
//! GET  /manage-products          - Product list with filters
//! POST /manage-products/delete   - Delete product
//! GET/POST /add-product          - Create/update product form
//! GET  /manage-category          - Category list
//! POST /manage-category/delete   - Delete category
//! GET/POST /add-category         - Create/update category form
//! GET  /payments                 - Payment list
//! GET  /users                    - User list
//! POST /users/toggle             - Activate/deactivate a user
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod uploads;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/unauthorized", get(auth::unauthorized))
        .route("/sendOtp", get(auth::send_otp_page).post(auth::send_otp))
        .route(
            "/Reset-password-with-otp",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Create the cart and checkout routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-cart", get(cart::show))
        .route("/shopping-cart/add", post(cart::add))
        .route("/shopping-cart/increase", post(cart::increase))
        .route("/shopping-cart/decrease", post(cart::decrease))
        .route("/shopping-cart/remove", post(cart::remove))
        .route("/shopping-cart/checkout", post(checkout::submit))
}

/// Create the admin console router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin-panel", get(admin::panel::show))
        .route("/manage-products", get(admin::products::index))
        .route("/manage-products/delete", post(admin::products::delete))
        .route(
            "/add-product",
            get(admin::products::form).post(admin::products::submit),
        )
        .route("/manage-category", get(admin::categories::index))
        .route("/manage-category/delete", post(admin::categories::delete))
        .route(
            "/add-category",
            get(admin::categories::form).post(admin::categories::submit),
        )
        .route("/payments", get(admin::payments::index))
        .route("/users", get(admin::users::index))
        .route("/users/toggle", post(admin::users::toggle))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(home::about))
        .route("/contact", get(home::contact))
        .route("/services", get(home::services))
        .route(
            "/account-settings",
            get(account::show).post(account::update),
        )
        .route("/uploads/image", post(uploads::image))
        .merge(auth_routes())
        .merge(cart_routes())
        .merge(admin_routes())
}
