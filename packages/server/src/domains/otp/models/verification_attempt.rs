use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// One row per strict-policy code send. Only the hash of the code is ever
/// persisted. Older rows stay for audit; confirmation consults the latest
/// row alone.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct VerificationAttempt {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing)]
    pub code_hash: String,
    pub sent_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub confirmed: bool,
    pub attempts: i32,
}

impl VerificationAttempt {
    /// Every send is a new row (attempts = 0, unconfirmed).
    pub async fn create(
        user_id: i64,
        code_hash: &str,
        sent_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_verifications (user_id, code_hash, sent_at, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(user_id)
        .bind(code_hash)
        .bind(sent_at)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// The single row confirmation may act on.
    pub async fn latest_for_user(
        user_id: i64,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM user_verifications
             WHERE user_id = $1
             ORDER BY sent_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Sends within a trailing window, for throttling.
    pub async fn count_recent_sends(
        user_id: i64,
        since: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_verifications WHERE user_id = $1 AND sent_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Atomic increment; returns the post-increment value so the caller can
    /// apply the attempt cap without a read-modify-write race.
    pub async fn increment_attempts(id: i64, pool: &PgPool) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE user_verifications SET attempts = attempts + 1 WHERE id = $1 RETURNING attempts",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn mark_confirmed(id: i64, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE user_verifications SET confirmed = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Force-expire without deleting: revokes remaining attempts while
    /// keeping the row for audit.
    pub async fn expire_now(id: i64, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE user_verifications SET expires_at = now() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
