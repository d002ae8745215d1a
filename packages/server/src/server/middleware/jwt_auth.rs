use axum::extract::Extension;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

use crate::common::AppError;
use crate::domains::auth::JwtService;
use crate::domains::authz::Role;

/// Authenticated caller, decoded from the access token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

/// JWT authentication middleware.
///
/// Extracts the bearer token, verifies it, and adds AuthUser to request
/// extensions. Without a valid token the request continues unauthenticated;
/// protected handlers reject via [`require_auth`].
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_auth_user(&request, &jwt_service) {
        debug!(user_id = user.user_id, role = ?user.role, "authenticated request");
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Turn the optional auth extension into a hard requirement.
pub fn require_auth(user: Option<Extension<AuthUser>>) -> Result<AuthUser, AppError> {
    user.map(|Extension(user)| user)
        .ok_or(AppError::Unauthorized)
}

fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Accept both "Bearer <token>" and a raw token.
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test_secret", "test_issuer".to_string())
    }

    fn request_with_auth(value: &str) -> axum::http::Request<axum::body::Body> {
        axum::http::Request::builder()
            .header("authorization", value)
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[test]
    fn extracts_bearer_token() {
        let jwt = service();
        let token = jwt.create_token(42, Role::Operations).unwrap();

        let user = extract_auth_user(&request_with_auth(&format!("Bearer {token}")), &jwt).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::Operations);
    }

    #[test]
    fn extracts_raw_token() {
        let jwt = service();
        let token = jwt.create_token(7, Role::Sales).unwrap();

        let user = extract_auth_user(&request_with_auth(&token), &jwt).unwrap();
        assert_eq!(user.user_id, 7);
    }

    #[test]
    fn missing_header_yields_none() {
        let jwt = service();
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert!(extract_auth_user(&request, &jwt).is_none());
    }

    #[test]
    fn garbage_token_yields_none() {
        let jwt = service();
        assert!(extract_auth_user(&request_with_auth("Bearer not-a-jwt"), &jwt).is_none());
    }

    #[test]
    fn require_auth_rejects_anonymous() {
        assert!(matches!(
            require_auth(None),
            Err(AppError::Unauthorized)
        ));
        let user = require_auth(Some(Extension(AuthUser {
            user_id: 1,
            role: Role::Admin,
        })))
        .unwrap();
        assert_eq!(user.user_id, 1);
    }
}
