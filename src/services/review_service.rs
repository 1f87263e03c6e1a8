//! Review upserts and the derived rating statistics.
//!
//! A product's review sequence and its derived fields are read, modified
//! and written back inside one transaction that holds the product's row
//! lock, so concurrent writers to the same product serialize instead of
//! losing updates. Derived fields are recomputed on every write and never
//! trusted from the request.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{product_repo, review_repo};
use crate::error::{AppError, AppResult};
use crate::metrics::REVIEW_UPSERTS_TOTAL;
use crate::models::Review;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub ratings: f64,
    pub num_of_reviews: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsSnapshot {
    pub reviews: Vec<Review>,
    pub ratings: f64,
    pub num_of_reviews: i32,
}

/// Arithmetic mean of the ratings plus the sequence length; (0, 0) for an
/// empty sequence.
pub fn aggregate(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    (sum as f64 / ratings.len() as f64, ratings.len() as i32)
}

/// Create the user's review of the product, or overwrite it in place if
/// one exists, then recompute `ratings` and `num_of_reviews`.
pub async fn upsert_review(
    pool: &PgPool,
    product_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: &str,
) -> AppResult<RatingSummary> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".into()));
    }

    let mut tx = pool.begin().await?;

    if !review_repo::lock_product(&mut tx, product_id).await? {
        return Err(AppError::NotFound("product not found".into()));
    }

    review_repo::upsert_review(&mut tx, product_id, user_id, rating, comment).await?;

    let all_ratings = review_repo::fetch_ratings(&mut tx, product_id).await?;
    let (mean, count) = aggregate(&all_ratings);
    review_repo::update_product_stats(&mut tx, product_id, mean, count).await?;

    tx.commit().await?;
    REVIEW_UPSERTS_TOTAL.inc();

    tracing::debug!(%product_id, %user_id, rating, "review upserted");

    Ok(RatingSummary {
        ratings: mean,
        num_of_reviews: count,
    })
}

/// The stored review sequence plus the derived fields exactly as persisted.
/// No recomputation happens on read.
pub async fn get_reviews(pool: &PgPool, product_id: Uuid) -> AppResult<ReviewsSnapshot> {
    let product = product_repo::find_product(pool, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".into()))?;

    let reviews = review_repo::list_reviews(pool, product_id).await?;

    Ok(ReviewsSnapshot {
        reviews,
        ratings: product.ratings,
        num_of_reviews: product.num_of_reviews,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_aggregates_to_zero() {
        assert_eq!(aggregate(&[]), (0.0, 0));
    }

    #[test]
    fn single_review_sets_the_mean() {
        assert_eq!(aggregate(&[5]), (5.0, 1));
    }

    #[test]
    fn update_then_append_matches_the_documented_scenario() {
        // u1 reviews with 5 stars.
        assert_eq!(aggregate(&[5]), (5.0, 1));
        // u1 lowers the same review to 3 stars: still one review.
        assert_eq!(aggregate(&[3]), (3.0, 1));
        // u2 adds a 4-star review.
        assert_eq!(aggregate(&[3, 4]), (3.5, 2));
    }

    #[test]
    fn mean_is_exact_within_float_tolerance() {
        let ratings = [1, 2, 3, 4, 5];
        let (mean, count) = aggregate(&ratings);
        assert_eq!(count, 5);
        assert!((mean - 3.0).abs() < f64::EPSILON);

        let ratings = [2, 2, 5];
        let (mean, _) = aggregate(&ratings);
        assert!((mean - 3.0).abs() < 1e-9);
    }
}
