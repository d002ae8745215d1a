use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// HS256 signing key for access tokens. Injected here so rotation is a
    /// configuration reload, never a code change.
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub mobizon_api_key: String,
    pub mobizon_sender: Option<String>,
    pub mobizon_dry_run: bool,
    /// Whether a confirmed signing code may move a document from
    /// `under_review` straight to `signed`, skipping review.
    pub sign_from_review: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "dealdesk".to_string()),
            mobizon_api_key: env::var("MOBIZON_API_KEY").unwrap_or_default(),
            mobizon_sender: env::var("MOBIZON_SENDER").ok(),
            mobizon_dry_run: env_flag("MOBIZON_DRY_RUN", false),
            sign_from_review: env_flag("SIGN_FROM_REVIEW", true),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
