use sqlx::PgPool;

use crate::db::models::Batch;

const COLUMNS: &str = "\
    id, name, description, is_public, status, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Batch>, sqlx::Error> {
    sqlx::query_as::<_, Batch>(&format!("SELECT {COLUMNS} FROM batches WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn is_public(pool: &PgPool, id: &str) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT is_public FROM batches WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
