use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Closed status set, persisted as a Postgres enum. Unknown values fail to
/// decode at the boundary instead of drifting through as free-form strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize,
)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    UnderReview,
    Approved,
    Returned,
    Signed,
}

/// Document model - SQL persistence layer.
///
/// Invariant: `signed_at` is set iff `status == Signed`; the only writer of
/// either field is `mark_signed`, which writes both in one statement.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub deal_id: i64,
    pub doc_type: String,
    pub file_path: String,
    pub status: DocumentStatus,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_status(
        id: i64,
        status: DocumentStatus,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE documents SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// Terminal transition: status and timestamp move together.
    pub async fn mark_signed(
        id: i64,
        signed_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE documents SET status = 'signed', signed_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(signed_at)
        .fetch_one(pool)
        .await
    }
}
