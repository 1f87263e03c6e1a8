use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{Product, ProductImage};

const PRODUCT_COLUMNS: &str = "id, name, brand, model, price, description, category, subcategory, \
     specs, images, stock, ratings, num_of_reviews, created_by, created_at, updated_at";

const SEARCH_PREDICATE: &str = "name ILIKE $1 OR brand ILIKE $1 OR model ILIKE $1 \
     OR description ILIKE $1 OR category ILIKE $1";

#[derive(Debug, Clone)]
pub struct ProductData {
    pub name: String,
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub specs: BTreeMap<String, String>,
    pub images: Vec<ProductImage>,
    pub stock: i32,
}

pub async fn list_products(pool: &PgPool) -> sqlx::Result<Vec<Product>> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_product(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_product(
    pool: &PgPool,
    data: &ProductData,
    created_by: Option<Uuid>,
) -> sqlx::Result<Product> {
    sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products \
             (name, brand, model, price, description, category, subcategory, specs, images, stock, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&data.name)
    .bind(&data.brand)
    .bind(&data.model)
    .bind(data.price)
    .bind(&data.description)
    .bind(&data.category)
    .bind(&data.subcategory)
    .bind(Json(&data.specs))
    .bind(Json(&data.images))
    .bind(data.stock)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

/// Full-row update with values already merged by the caller.
pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    data: &ProductData,
) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET \
             name = $2, brand = $3, model = $4, price = $5, description = $6, \
             category = $7, subcategory = $8, specs = $9, images = $10, stock = $11, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(id)
    .bind(&data.name)
    .bind(&data.brand)
    .bind(&data.model)
    .bind(data.price)
    .bind(&data.description)
    .bind(&data.category)
    .bind(&data.subcategory)
    .bind(Json(&data.specs))
    .bind(Json(&data.images))
    .bind(data.stock)
    .fetch_optional(pool)
    .await
}

pub async fn delete_product(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn search_products(
    pool: &PgPool,
    query: &str,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Product>> {
    let pattern = format!("%{query}%");
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE {SEARCH_PREDICATE} \
         ORDER BY created_at DESC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_search(pool: &PgPool, query: &str) -> sqlx::Result<i64> {
    let pattern = format!("%{query}%");
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM products WHERE {SEARCH_PREDICATE}"
    ))
    .bind(pattern)
    .fetch_one(pool)
    .await
}
