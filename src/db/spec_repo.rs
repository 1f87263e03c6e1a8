use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SpecAttribute;

const SPEC_COLUMNS: &str = "id, name, created_at, updated_at";

pub async fn list_specs(pool: &PgPool) -> sqlx::Result<Vec<SpecAttribute>> {
    sqlx::query_as::<_, SpecAttribute>(&format!(
        "SELECT {SPEC_COLUMNS} FROM spec_attributes ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_spec(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<SpecAttribute>> {
    sqlx::query_as::<_, SpecAttribute>(&format!(
        "SELECT {SPEC_COLUMNS} FROM spec_attributes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn name_taken(pool: &PgPool, name: &str, exclude: Option<Uuid>) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM spec_attributes WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(name)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn insert_spec(pool: &PgPool, name: &str) -> sqlx::Result<SpecAttribute> {
    sqlx::query_as::<_, SpecAttribute>(&format!(
        "INSERT INTO spec_attributes (name) VALUES ($1) RETURNING {SPEC_COLUMNS}"
    ))
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn update_spec(
    pool: &PgPool,
    id: Uuid,
    name: &str,
) -> sqlx::Result<Option<SpecAttribute>> {
    sqlx::query_as::<_, SpecAttribute>(&format!(
        "UPDATE spec_attributes SET name = $2, updated_at = NOW() \
         WHERE id = $1 RETURNING {SPEC_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn delete_spec(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM spec_attributes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
