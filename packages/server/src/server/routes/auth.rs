//! Credential endpoints: login, refresh rotation, logout.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::AppError;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let (user, pair) = state.credentials.login(&body.email, &body.password).await?;

    Ok(Json(json!({
        "user": user,
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

pub async fn refresh_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    let pair = state.credentials.rotate_refresh(&body.refresh_token).await?;

    Ok(Json(json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

pub async fn logout_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<StatusCode, AppError> {
    let user = require_auth(auth)?;
    state.credentials.revoke(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
