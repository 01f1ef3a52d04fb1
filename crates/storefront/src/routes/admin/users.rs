//! User management screens.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::types::UserRecord;
use crate::filters;
use crate::middleware::{RequireAdmin, set_current_user};
use crate::routes::views::Nav;
use crate::state::AppState;

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub user_id: String,
}

/// Query parameters for list feedback.
#[derive(Debug, Deserialize)]
pub struct ListMessageQuery {
    pub error: Option<String>,
}

/// User display data.
#[derive(Clone)]
pub struct UserView {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub email: String,
    pub is_active: bool,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            role: user.role.to_string(),
            email: user.email.clone(),
            is_active: user.status.is_active(),
        }
    }
}

/// Users page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub nav: Option<Nav>,
    pub users: Vec<UserView>,
    pub error: Option<String>,
}

/// List all users with their activation state.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<ListMessageQuery>,
) -> UsersTemplate {
    let (users, load_error) = match state.backend().users_all(&user.access_token).await {
        Ok(users) => (users.iter().map(UserView::from).collect(), None),
        Err(e) => {
            tracing::error!("Loading users failed: {e}");
            (Vec::new(), Some("Loading users failed.".to_string()))
        }
    };

    UsersTemplate {
        nav: Some(Nav::from(&user)),
        users,
        error: query
            .error
            .map(|code| match code.as_str() {
                "toggle_failed" => "Failed to change the user's status.".to_string(),
                other => other.to_string(),
            })
            .or(load_error),
    }
}

/// Activate/deactivate a user, then re-pull the listing via redirect.
///
/// If an admin toggles their own account, the session copy of the status is
/// refreshed too.
#[instrument(skip(state, session, user, form), fields(target = %form.user_id))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<ToggleForm>,
) -> Response {
    match state
        .backend()
        .user_toggle_status(&user.access_token, &form.user_id)
        .await
    {
        Ok(toggled) => {
            if toggled.user_id == user.user_id.as_str() {
                let mut updated = user;
                updated.status = toggled.status;
                if let Err(e) = set_current_user(&session, &updated).await {
                    tracing::error!("Failed to refresh session status: {e}");
                }
            }
            Redirect::to("/users").into_response()
        }
        Err(e) => {
            tracing::error!("Toggling user status failed: {e}");
            Redirect::to("/users?error=toggle_failed").into_response()
        }
    }
}
