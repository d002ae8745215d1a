use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::domains::authz::Role;

/// User model - SQL persistence layer.
///
/// Holds the auth state the trust core owns: password hash, phone
/// verification flag, and the current refresh-token triple. Rows are never
/// deleted here; account deletion is a CRUD concern elsewhere.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub company_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub phone: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub refresh_revoked: bool,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_refresh_token(
        token: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE refresh_token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new, unverified user.
    pub async fn insert(
        company_name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        phone: &str,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (company_name, email, password_hash, role, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(company_name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(phone)
        .fetch_one(pool)
        .await
    }

    /// Store a freshly minted refresh token, clearing any revocation.
    pub async fn store_refresh(
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET refresh_token = $2, refresh_expires_at = $3, refresh_revoked = FALSE
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Atomically swap `old_token` for `new_token`.
    ///
    /// The WHERE clause is the whole concurrency story: of N racing rotations
    /// with the same old token, exactly one matches the row; the rest see
    /// zero rows and get `None`. A replayed pre-rotation token can never
    /// match again.
    pub async fn rotate_refresh(
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE users
             SET refresh_token = $2, refresh_expires_at = $3, refresh_revoked = FALSE
             WHERE refresh_token = $1
               AND NOT refresh_revoked
               AND refresh_expires_at > now()
             RETURNING *",
        )
        .bind(old_token)
        .bind(new_token)
        .bind(new_expires_at)
        .fetch_optional(pool)
        .await
    }

    /// Drop the current session: token cleared, revocation flag set.
    pub async fn clear_refresh(id: i64, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET refresh_token = NULL, refresh_expires_at = NULL, refresh_revoked = TRUE
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Flip the phone-verification flag. Idempotent: re-verifying keeps the
    /// original timestamp.
    pub async fn mark_verified(id: i64, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET is_verified = TRUE, verified_at = COALESCE(verified_at, now())
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
