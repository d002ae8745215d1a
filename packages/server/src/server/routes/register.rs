//! Registration and phone verification endpoints.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::AppError;
use crate::domains::auth::models::User;
use crate::domains::auth::RegisterRequest;
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

/// Create an unverified account and dispatch the first verification code.
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = state.credentials.register(&body).await?;
    state.otp.send_user_code(user.id, &user.phone).await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

pub async fn confirm_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<Value>, AppError> {
    let user = find_user(&state, &body.email).await?;
    state.otp.confirm_user_code(user.id, body.code.trim()).await?;

    Ok(Json(json!({ "verified": true })))
}

pub async fn resend_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<ResendRequest>,
) -> Result<StatusCode, AppError> {
    let user = find_user(&state, &body.email).await?;
    state.otp.send_user_code(user.id, &user.phone).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_user(state: &AppState, email: &str) -> Result<User, AppError> {
    User::find_by_email(email.trim(), &state.db_pool)
        .await?
        .ok_or(AppError::NotFound)
}
