use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Category, CategoryWithSubcategories, ProductImage, Subcategory};

const CATEGORY_COLUMNS: &str = "id, name, image, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SubcategoryRow {
    category_id: Uuid,
    id: Uuid,
    name: String,
}

pub async fn list_with_subcategories(
    pool: &PgPool,
) -> sqlx::Result<Vec<CategoryWithSubcategories>> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    let subs = sqlx::query_as::<_, SubcategoryRow>(
        "SELECT category_id, id, name FROM category_subcategories ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<Subcategory>> = HashMap::new();
    for row in subs {
        grouped
            .entry(row.category_id)
            .or_default()
            .push(Subcategory {
                id: row.id,
                name: row.name,
            });
    }

    Ok(categories
        .into_iter()
        .map(|category| {
            let subcategories = grouped.remove(&category.id).unwrap_or_default();
            CategoryWithSubcategories {
                category,
                subcategories,
            }
        })
        .collect())
}

pub async fn find_with_subcategories(
    pool: &PgPool,
    id: Uuid,
) -> sqlx::Result<Option<CategoryWithSubcategories>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(category) = category else {
        return Ok(None);
    };

    let subcategories = sqlx::query_as::<_, Subcategory>(
        "SELECT id, name FROM category_subcategories WHERE category_id = $1 ORDER BY created_at",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(CategoryWithSubcategories {
        category,
        subcategories,
    }))
}

pub async fn name_taken(pool: &PgPool, name: &str, exclude: Option<Uuid>) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM categories WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(name)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn insert_category(
    pool: &PgPool,
    name: &str,
    image: Option<ProductImage>,
) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (name, image) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(name)
    .bind(image.map(Json))
    .fetch_one(pool)
    .await
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    image: Option<ProductImage>,
) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET name = $2, image = $3, updated_at = NOW() \
         WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(image.map(Json))
    .fetch_optional(pool)
    .await
}

pub async fn delete_category(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn subcategory_name_taken(
    pool: &PgPool,
    category_id: Uuid,
    name: &str,
) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM category_subcategories \
         WHERE category_id = $1 AND LOWER(name) = LOWER($2)",
    )
    .bind(category_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub async fn insert_subcategory(
    pool: &PgPool,
    category_id: Uuid,
    name: &str,
) -> sqlx::Result<Subcategory> {
    sqlx::query_as::<_, Subcategory>(
        "INSERT INTO category_subcategories (category_id, name) \
         VALUES ($1, $2) RETURNING id, name",
    )
    .bind(category_id)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn delete_subcategory(
    pool: &PgPool,
    category_id: Uuid,
    subcategory_id: Uuid,
) -> sqlx::Result<u64> {
    let result =
        sqlx::query("DELETE FROM category_subcategories WHERE category_id = $1 AND id = $2")
            .bind(category_id)
            .bind(subcategory_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
