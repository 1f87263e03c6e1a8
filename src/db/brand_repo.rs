use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Brand;

const BRAND_COLUMNS: &str = "id, name, created_at, updated_at";

pub async fn list_brands(pool: &PgPool) -> sqlx::Result<Vec<Brand>> {
    sqlx::query_as::<_, Brand>(&format!("SELECT {BRAND_COLUMNS} FROM brands ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub async fn find_brand(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Brand>> {
    sqlx::query_as::<_, Brand>(&format!("SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn name_taken(pool: &PgPool, name: &str, exclude: Option<Uuid>) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM brands WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(name)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn insert_brand(pool: &PgPool, name: &str) -> sqlx::Result<Brand> {
    sqlx::query_as::<_, Brand>(&format!(
        "INSERT INTO brands (name) VALUES ($1) RETURNING {BRAND_COLUMNS}"
    ))
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn update_brand(pool: &PgPool, id: Uuid, name: &str) -> sqlx::Result<Option<Brand>> {
    sqlx::query_as::<_, Brand>(&format!(
        "UPDATE brands SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {BRAND_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn delete_brand(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
