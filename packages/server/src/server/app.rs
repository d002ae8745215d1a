//! Application setup and router wiring.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post},
    Router,
};
use mobizon::{MobizonOptions, MobizonService};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::auth::{CredentialService, JwtService};
use crate::domains::documents::{DocumentPolicy, DocumentService};
use crate::domains::otp::OtpService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    confirm_handler, health_handler, login_handler, logout_handler, refresh_handler,
    register_handler, resend_handler, review_handler, sign_handler, sms_confirm_handler,
    sms_delete_handler, sms_latest_handler, sms_resend_handler, sms_send_handler, submit_handler,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub credentials: Arc<CredentialService>,
    pub otp: Arc<OtpService>,
    pub documents: Arc<DocumentService>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router with all services wired up.
pub fn build_app(pool: PgPool, config: &Config) -> anyhow::Result<Router> {
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
    ));

    let sms_gateway = Arc::new(MobizonService::new(MobizonOptions {
        api_key: config.mobizon_api_key.clone(),
        sender: config.mobizon_sender.clone(),
        dry_run: config.mobizon_dry_run,
    }));

    let documents = Arc::new(DocumentService::new(
        pool.clone(),
        DocumentPolicy {
            sign_from_review: config.sign_from_review,
        },
    ));

    let otp = Arc::new(OtpService::new(
        pool.clone(),
        sms_gateway,
        documents.clone(),
    ));

    let credentials = Arc::new(CredentialService::new(
        pool.clone(),
        (*jwt_service).clone(),
    )?);

    let app_state = AppState {
        db_pool: pool,
        credentials,
        otp,
        documents,
        jwt_service: jwt_service.clone(),
    };

    let cors = build_cors(&config.allowed_origins)?;

    let app = Router::new()
        .route("/health", get(health_handler))
        // Credentials
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        // Registration and phone verification
        .route("/register", post(register_handler))
        .route("/register/confirm", post(confirm_handler))
        .route("/register/resend", post(resend_handler))
        // Document lifecycle
        .route("/documents/:id/submit", post(submit_handler))
        .route("/documents/:id/review", post(review_handler))
        .route("/documents/:id/sign", post(sign_handler))
        // SMS-driven signing
        .route("/sms/send", post(sms_send_handler))
        .route("/sms/resend", post(sms_resend_handler))
        .route("/sms/confirm", post(sms_confirm_handler))
        .route("/sms/latest/:document_id", get(sms_latest_handler))
        .route("/sms/:document_id", delete(sms_delete_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Lock CORS to the configured origins; an empty list means any origin
/// (development).
fn build_cors(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return Ok(cors.allow_origin(tower_http::cors::Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(cors.allow_origin(origins))
}
