//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`; the `IntoResponse` impl
//! captures server-side failures to Sentry before answering the client.
//! Session expiry is not an error page: it redirects to the login screen,
//! matching the rule that a missing/expired token always prompts a login.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::payments::ProcessorError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;
use crate::services::media::UploadError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Card processor call failed.
    #[error("Processor error: {0}")]
    Processor(#[from] ProcessorError),

    /// Access token could not be decoded or is expired.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image upload failed; the owning form must not submit.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Cart rule violation.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout attempt failure.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Client-side field validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No valid session.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // A rejected token means "log in again", not an error page.
        if matches!(
            self,
            Self::Unauthenticated
                | Self::Auth(AuthError::Expired)
                | Self::Backend(BackendError::Unauthorized)
        ) {
            return Redirect::to("/login?error=session").into_response();
        }

        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::Backend(_) | Self::Processor(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Backend(BackendError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(_) | Self::Processor(_) | Self::Upload(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Cart(_) | Self::Checkout(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Backend(_) => "Upstream service error".to_string(),
            Self::Processor(_) => "Payment service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Upload(err) => err.to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("PROD123".to_string());
        assert_eq!(err.to_string(), "Not found: PROD123");

        let err = AppError::Validation("price must not be negative".to_string());
        assert_eq!(err.to_string(), "Validation error: price must not be negative");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Validation("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::QuantityFloor)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_expired_session_redirects_to_login() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login?error=session")
        );
    }
}
