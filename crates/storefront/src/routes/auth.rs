//! Authentication route handlers.
//!
//! Login delegates credential checking to the backend, which answers with an
//! access/refresh token pair and the user record. The access token's claims
//! (identity, role, status, expiry) are decoded here and the whole identity
//! is stored as one session object. Inactive accounts are rejected before a
//! session is created.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use lumora_core::{Email, UserStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::decode_claims;
use crate::state::AppState;

use super::views::Nav;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Hosted image URL filled in by the out-of-band upload.
    #[serde(default)]
    pub image: String,
}

/// Send-OTP form data.
#[derive(Debug, Deserialize)]
pub struct SendOtpForm {
    pub email: String,
}

/// Reset-password form data. The email travels as a hidden field, seeded
/// from the `email` query parameter of the reset page.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters of the reset-password page.
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub email: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Option<Nav>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: Option<Nav>,
    pub error: Option<String>,
}

/// Send-OTP page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/send_otp.html")]
pub struct SendOtpTemplate {
    pub nav: Option<Nav>,
    pub error: Option<String>,
}

/// Reset-password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub nav: Option<Nav>,
    pub email: String,
    pub error: Option<String>,
}

/// Unauthorized page template.
#[derive(Template, WebTemplate)]
#[template(path = "unauthorized.html")]
pub struct UnauthorizedTemplate {
    pub nav: Option<Nav>,
}

// =============================================================================
// Login / logout
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        nav: None,
        error: query.error.map(login_error_message),
        success: query.success.map(|code| match code.as_str() {
            "registered" => "Registration successful, please sign in.".to_string(),
            "reset" => "Password reset successful, please sign in.".to_string(),
            other => other.to_string(),
        }),
    }
}

fn login_error_message(code: String) -> String {
    match code.as_str() {
        "credentials" => "Invalid username or password.".to_string(),
        "restricted" => "You can't log in. Admin has restricted your account.".to_string(),
        "session" => "Your session has expired, please sign in again.".to_string(),
        other => other.to_string(),
    }
}

/// Authenticate against the backend and establish the session.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let response = match state.backend().login(&form.username, &form.password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Login rejected: {e}");
            return Redirect::to("/login?error=credentials").into_response();
        }
    };

    let claims = match decode_claims(&response.access_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::error!("Backend issued an undecodable access token: {e}");
            return Redirect::to("/login?error=credentials").into_response();
        }
    };

    // Restricted accounts are rejected before any session exists.
    if claims.status == UserStatus::Inactive {
        return Redirect::to("/login?error=restricted").into_response();
    }

    let user = CurrentUser {
        user_id: claims.sub.clone().into(),
        username: claims.username.clone(),
        email: claims.email.clone(),
        role: claims.role,
        status: claims.status,
        image: response.user.image.clone(),
        access_token: response.access_token.clone(),
        refresh_token: response.refresh_token.clone(),
        expires_at: claims.expires_at(),
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to store session: {e}");
        return Redirect::to("/login?error=session").into_response();
    }

    // Warm the cart mirror right after login; a failure here must not block
    // the sign-in.
    if let Err(e) = state
        .backend()
        .cart(&user.access_token, user.user_id.as_str())
        .await
    {
        tracing::warn!("Cart load after login failed: {e}");
    }

    if user.is_admin() {
        Redirect::to("/admin-panel").into_response()
    } else {
        Redirect::to("/").into_response()
    }
}

/// Destroy the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    Redirect::to("/login").into_response()
}

/// Role rejection page.
pub async fn unauthorized() -> UnauthorizedTemplate {
    UnauthorizedTemplate { nav: None }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        nav: None,
        error: query.error.map(|code| match code.as_str() {
            "password_mismatch" => "Passwords do not match.".to_string(),
            "missing_fields" => "Please fill in all required fields.".to_string(),
            "invalid_email" => "Please enter a valid email address.".to_string(),
            "image_required" => "Please upload a profile image first.".to_string(),
            "failed" => "Registration failed. Please try again.".to_string(),
            other => other.to_string(),
        }),
    }
}

/// Create a new customer account.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.confirm_password {
        return Redirect::to("/register?error=password_mismatch").into_response();
    }

    if form.username.is_empty() || form.email.is_empty() || form.password.is_empty() {
        return Redirect::to("/register?error=missing_fields").into_response();
    }

    if Email::parse(&form.email).is_err() {
        return Redirect::to("/register?error=invalid_email").into_response();
    }

    // The profile image must already be hosted; submitting without the URL
    // fails fast instead of registering an image-less account.
    if form.image.is_empty() {
        return Redirect::to("/register?error=image_required").into_response();
    }

    let input = crate::backend::types::UserInput {
        id: None,
        username: form.username,
        email: form.email,
        password: Some(form.password),
        image: form.image,
        status: UserStatus::Active,
    };

    match state.backend().register(&input).await {
        Ok(()) => Redirect::to("/login?success=registered").into_response(),
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            Redirect::to("/register?error=failed").into_response()
        }
    }
}

// =============================================================================
// Password reset (OTP)
// =============================================================================

/// Display the send-OTP page.
pub async fn send_otp_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SendOtpTemplate {
        nav: None,
        error: query.error.map(|code| match code.as_str() {
            "invalid_email" => "Please enter a valid email address.".to_string(),
            "send_failed" => "Error sending OTP.".to_string(),
            other => other.to_string(),
        }),
    }
}

/// Send a reset OTP and move on to the reset page with the email in the
/// query string.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn send_otp(
    State(state): State<AppState>,
    Form(form): Form<SendOtpForm>,
) -> Response {
    if Email::parse(&form.email).is_err() {
        return Redirect::to("/sendOtp?error=invalid_email").into_response();
    }

    match state.backend().send_otp(&form.email).await {
        Ok(()) => {
            let target = format!("/Reset-password-with-otp?email={}", form.email);
            Redirect::to(&target).into_response()
        }
        Err(e) => {
            tracing::error!("Sending OTP failed: {e}");
            Redirect::to("/sendOtp?error=send_failed").into_response()
        }
    }
}

/// Display the reset-password page.
pub async fn reset_password_page(Query(query): Query<ResetQuery>) -> Response {
    let Some(email) = query.email else {
        // Without the email there is nothing to reset against.
        return Redirect::to("/sendOtp").into_response();
    };

    ResetPasswordTemplate {
        nav: None,
        email,
        error: query.error.map(|code| match code.as_str() {
            "missing_fields" => "Please fill in the OTP and a new password.".to_string(),
            "reset_failed" => "Error resetting password.".to_string(),
            other => other.to_string(),
        }),
    }
    .into_response()
}

/// Reset the password with the delivered OTP.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.otp.is_empty() || form.new_password.is_empty() {
        let target = format!(
            "/Reset-password-with-otp?email={}&error=missing_fields",
            form.email
        );
        return Redirect::to(&target).into_response();
    }

    match state
        .backend()
        .reset_password(&form.email, &form.otp, &form.new_password)
        .await
    {
        Ok(()) => Redirect::to("/login?success=reset").into_response(),
        Err(e) => {
            tracing::error!("Password reset failed: {e}");
            let target = format!(
                "/Reset-password-with-otp?email={}&error=reset_failed",
                form.email
            );
            Redirect::to(&target).into_response()
        }
    }
}
