//! Authentication extractors.
//!
//! Route handlers declare what they need: [`RequireAuth`] for any signed-in
//! user, [`RequireAdmin`] for the admin console, [`OptionalAuth`] where a
//! guest is fine. Expired sessions are cleared on sight and redirected to
//! the login page; authenticated non-admins hitting admin routes land on
//! `/unauthorized`.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in, non-expired user.
pub struct RequireAuth(pub CurrentUser);

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when a request does not meet the auth requirement.
pub enum AuthRejection {
    /// Send the browser to the login page.
    RedirectToLogin,
    /// Authenticated but not allowed (role).
    NotAllowed,
    /// No session infrastructure at all (programming error).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::NotAllowed => Redirect::to("/unauthorized").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read the current user out of the session, clearing it when expired.
async fn current_user(parts: &mut Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let Some(user) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    if user.is_expired(Utc::now()) {
        // A token invalidated elsewhere is only caught on use; drop it now.
        let _ = session.remove::<CurrentUser>(session_keys::CURRENT_USER).await;
        return Ok(None);
    }

    Ok(Some(user))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match current_user(parts).await? {
            Some(user) => Ok(Self(user)),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match current_user(parts).await? {
            Some(user) if user.is_admin() => Ok(Self(user)),
            Some(_) => Err(AuthRejection::NotAllowed),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await.ok().flatten()))
    }
}

/// Store the current user in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
