//! Document lifecycle endpoints. All require authentication; role and
//! ownership checks live in the document service.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::AppError;
use crate::domains::documents::transitions::ReviewAction;
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let user = require_auth(auth)?;
    let document = state.documents.submit(id, user.user_id, user.role).await?;
    Ok(Json(json!({ "document": document })))
}

pub async fn review_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let user = require_auth(auth)?;
    let document = state
        .documents
        .review(id, body.action, user.user_id, user.role)
        .await?;
    Ok(Json(json!({ "document": document })))
}

pub async fn sign_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let user = require_auth(auth)?;
    let document = state.documents.sign(id, user.user_id, user.role).await?;
    Ok(Json(json!({ "document": document })))
}
