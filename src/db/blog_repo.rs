use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Blog, ProductImage};

const BLOG_COLUMNS: &str = "id, title, short_content, content, date, images, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct BlogData {
    pub title: String,
    pub short_content: String,
    pub content: String,
    pub date: NaiveDate,
    pub images: Vec<ProductImage>,
}

pub async fn list_blogs(pool: &PgPool) -> sqlx::Result<Vec<Blog>> {
    sqlx::query_as::<_, Blog>(&format!(
        "SELECT {BLOG_COLUMNS} FROM blogs ORDER BY date DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_blog(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Blog>> {
    sqlx::query_as::<_, Blog>(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_blog(pool: &PgPool, data: &BlogData) -> sqlx::Result<Blog> {
    sqlx::query_as::<_, Blog>(&format!(
        "INSERT INTO blogs (title, short_content, content, date, images) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {BLOG_COLUMNS}"
    ))
    .bind(&data.title)
    .bind(&data.short_content)
    .bind(&data.content)
    .bind(data.date)
    .bind(Json(&data.images))
    .fetch_one(pool)
    .await
}

pub async fn update_blog(pool: &PgPool, id: Uuid, data: &BlogData) -> sqlx::Result<Option<Blog>> {
    sqlx::query_as::<_, Blog>(&format!(
        "UPDATE blogs SET title = $2, short_content = $3, content = $4, date = $5, \
         images = $6, updated_at = NOW() \
         WHERE id = $1 RETURNING {BLOG_COLUMNS}"
    ))
    .bind(id)
    .bind(&data.title)
    .bind(&data.short_content)
    .bind(&data.content)
    .bind(data.date)
    .bind(Json(&data.images))
    .fetch_optional(pool)
    .await
}

pub async fn delete_blog(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
