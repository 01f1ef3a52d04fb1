//! Account settings route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use lumora_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::types::UserInput;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::state::AppState;

use super::views::Nav;

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub username: String,
    pub email: String,
    /// Hosted image URL; pre-seeded with the current one, replaced by the
    /// out-of-band upload when a new file is chosen.
    #[serde(default)]
    pub image: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Account settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/settings.html")]
pub struct AccountTemplate {
    pub nav: Option<Nav>,
    pub username: String,
    pub email: String,
    pub image: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the account settings form, prefilled from the session profile.
#[instrument(skip(user))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> AccountTemplate {
    AccountTemplate {
        nav: Some(Nav::from(&user)),
        username: user.username,
        email: user.email,
        image: user.image,
        error: query.error.map(|code| match code.as_str() {
            "missing_fields" => "Please fill in all required fields.".to_string(),
            "invalid_email" => "Please enter a valid email address.".to_string(),
            "failed" => "Saving your profile failed. Please try again.".to_string(),
            other => other.to_string(),
        }),
        success: query
            .success
            .map(|_| "Profile saved.".to_string()),
    }
}

/// Save the profile through the user service and refresh the session copy.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AccountForm>,
) -> Result<Response> {
    if form.username.is_empty() || form.email.is_empty() {
        return Ok(Redirect::to("/account-settings?error=missing_fields").into_response());
    }
    if Email::parse(&form.email).is_err() {
        return Ok(Redirect::to("/account-settings?error=invalid_email").into_response());
    }

    let input = UserInput {
        id: Some(user.user_id.as_str().to_string()),
        username: form.username.clone(),
        email: form.email.clone(),
        password: None,
        image: form.image.clone(),
        status: user.status,
    };

    if let Err(e) = state
        .backend()
        .user_update(&user.access_token, user.user_id.as_str(), &input)
        .await
    {
        tracing::error!("Profile update failed: {e}");
        return Ok(Redirect::to("/account-settings?error=failed").into_response());
    }

    // Keep the session profile in step with what the backend now holds.
    let mut updated = user;
    updated.username = form.username;
    updated.email = form.email;
    if !form.image.is_empty() {
        updated.image = form.image;
    }
    if let Err(e) = set_current_user(&session, &updated).await {
        tracing::error!("Failed to refresh session profile: {e}");
    }

    Ok(Redirect::to("/account-settings?success=saved").into_response())
}
