use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// One row per relaxed-policy code send, tied to a document. The code is
/// stored in clear so a resend can re-deliver it verbatim. A document
/// accumulates rows over its life; only an unconfirmed, unexpired one is
/// matchable.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct SigningConfirmation {
    pub id: i64,
    pub document_id: i64,
    pub phone: String,
    #[serde(skip_serializing)]
    pub sms_code: String,
    pub sent_at: DateTime<Utc>,
    pub confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl SigningConfirmation {
    pub async fn create(
        document_id: i64,
        phone: &str,
        sms_code: &str,
        sent_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO sms_confirmations (document_id, phone, sms_code, sent_at)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(document_id)
        .bind(phone)
        .bind(sms_code)
        .bind(sent_at)
        .fetch_one(pool)
        .await
    }

    pub async fn latest_for_document(
        document_id: i64,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM sms_confirmations
             WHERE document_id = $1
             ORDER BY sent_at DESC
             LIMIT 1",
        )
        .bind(document_id)
        .fetch_optional(pool)
        .await
    }

    /// Exact-value match lookup used by the relaxed confirm path.
    pub async fn find_by_document_and_code(
        document_id: i64,
        code: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM sms_confirmations
             WHERE document_id = $1 AND sms_code = $2
             ORDER BY sent_at DESC
             LIMIT 1",
        )
        .bind(document_id)
        .bind(code)
        .fetch_optional(pool)
        .await
    }

    pub async fn mark_confirmed(
        id: i64,
        confirmed_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE sms_confirmations SET confirmed = TRUE, confirmed_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(confirmed_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete_for_document(document_id: i64, pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sms_confirmations WHERE document_id = $1")
            .bind(document_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
