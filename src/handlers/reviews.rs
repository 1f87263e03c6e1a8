//! Review endpoints: one upsert per (product, user), derived stats
//! maintained by the review service.

use actix_web::{get, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::AuthenticatedUser;
use crate::services::review_service;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertReviewRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// PUT /api/v1/reviews
///
/// The review is attributed to the authenticated identity; submitting
/// again overwrites the caller's previous review of the same product.
#[put("")]
pub async fn upsert_review(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<UpsertReviewRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    let summary = review_service::upsert_review(
        &state.db,
        body.product_id,
        user.id,
        body.rating,
        &body.comment,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Review saved successfully",
        "ratings": summary.ratings,
        "numOfReviews": summary.num_of_reviews,
    })))
}

/// GET /api/v1/products/{id}/reviews
#[get("/products/{id}/reviews")]
pub async fn get_product_reviews(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let snapshot = review_service::get_reviews(&state.db, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Product reviews fetched successfully",
        "reviews": snapshot.reviews,
        "ratings": snapshot.ratings,
        "numOfReviews": snapshot.num_of_reviews,
    })))
}
