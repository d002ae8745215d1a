//! Application error type and its HTTP mapping.
//!
//! Services return typed outcomes; this boundary layer turns them into
//! client-visible status codes. Nothing is swallowed and nothing is retried
//! here - retries, if any, are a client concern.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domains::auth::{AuthError, TokenError};
use crate::domains::documents::TransitionError;
use crate::domains::otp::OtpError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::NotVerified) => StatusCode::FORBIDDEN,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Otp(OtpError::ResendThrottled) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Otp(OtpError::Dispatch(_)) => StatusCode::BAD_GATEWAY,
            AppError::Otp(_) => StatusCode::BAD_REQUEST,
            AppError::Transition(TransitionError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Transition(TransitionError::InvalidState) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal detail stays in the logs, not in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::otp::OtpError;

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::NotVerified).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn token_errors_are_unauthorized() {
        for err in [TokenError::Expired, TokenError::Invalid, TokenError::Revoked] {
            assert_eq!(AppError::Token(err).status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn throttle_maps_to_429_and_policy_errors_to_400() {
        assert_eq!(
            AppError::Otp(OtpError::ResendThrottled).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Otp(OtpError::CodeInvalid).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Otp(OtpError::CodeExpired).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Otp(OtpError::TooManyAttempts).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn transition_errors_distinguish_403_from_409() {
        assert_eq!(
            AppError::Transition(TransitionError::Forbidden).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Transition(TransitionError::InvalidState).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }
}
