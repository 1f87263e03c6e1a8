//! Review rows and the derived product statistics.
//!
//! The write path runs inside a transaction owned by the review service;
//! every function here that takes a connection expects the product row to
//! be locked first via [`lock_product`], which is what serializes
//! concurrent writers on the same product.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Review;

const REVIEW_COLUMNS: &str = "id, user_id, rating, comment, created_at, updated_at";

/// Take the product's row lock for the current transaction.
/// Returns false when the product does not exist.
pub async fn lock_product(conn: &mut PgConnection, product_id: Uuid) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i32>("SELECT 1 FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

/// Insert the review, or overwrite rating and comment in place when the
/// (product, user) pair already has one. `created_at` is kept on update so
/// the review holds its position in the sequence.
pub async fn upsert_review(
    conn: &mut PgConnection,
    product_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO product_reviews (product_id, user_id, rating, comment) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (product_id, user_id) \
         DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = NOW()",
    )
    .bind(product_id)
    .bind(user_id)
    .bind(rating)
    .bind(comment)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// All ratings for the product in sequence (creation) order.
pub async fn fetch_ratings(conn: &mut PgConnection, product_id: Uuid) -> sqlx::Result<Vec<i32>> {
    sqlx::query_scalar::<_, i32>(
        "SELECT rating FROM product_reviews WHERE product_id = $1 ORDER BY created_at, id",
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await
}

/// Store the derived fields on the product row.
pub async fn update_product_stats(
    conn: &mut PgConnection,
    product_id: Uuid,
    ratings: f64,
    num_of_reviews: i32,
) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE products SET ratings = $2, num_of_reviews = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(product_id)
    .bind(ratings)
    .bind(num_of_reviews)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Review sequence in creation order, for the read path.
pub async fn list_reviews(pool: &PgPool, product_id: Uuid) -> sqlx::Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM product_reviews \
         WHERE product_id = $1 ORDER BY created_at, id"
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await
}
