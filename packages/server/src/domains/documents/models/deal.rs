use sqlx::PgPool;

/// Minimal view of a deal: the trust core only needs ownership for the
/// submit guard. Deal CRUD lives in a sibling service.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Deal {
    pub id: i64,
    pub owner_id: i64,
}

impl Deal {
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT id, owner_id FROM deals WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
