//! SMS-driven document signing endpoints.

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::AppError;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub document_id: i64,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub document_id: i64,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmCodeRequest {
    pub document_id: i64,
    pub code: String,
}

pub async fn sms_send_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<SendCodeRequest>,
) -> Result<StatusCode, AppError> {
    require_auth(auth)?;
    state
        .otp
        .send_document_code(body.document_id, body.phone.trim())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn sms_resend_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<ResendCodeRequest>,
) -> Result<StatusCode, AppError> {
    require_auth(auth)?;
    state
        .otp
        .resend_document_code(body.document_id, body.phone.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A wrong or stale code is a soft miss (`confirmed: false`), not an error;
/// a match signs the document.
pub async fn sms_confirm_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Json(body): Json<ConfirmCodeRequest>,
) -> Result<Json<Value>, AppError> {
    require_auth(auth)?;
    let confirmed = state
        .otp
        .confirm_document_code(body.document_id, body.code.trim())
        .await?;
    Ok(Json(json!({ "confirmed": confirmed })))
}

pub async fn sms_latest_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(document_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_auth(auth)?;
    let confirmation = state
        .otp
        .latest_confirmation(document_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(json!({ "confirmation": confirmation })))
}

pub async fn sms_delete_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(document_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_auth(auth)?;
    state.otp.delete_confirmations(document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
