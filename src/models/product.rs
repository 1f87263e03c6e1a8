use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Reference to an uploaded image in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub key: String,
    pub url: String,
}

/// Catalog product. `specs` is an open key/value map with no enforced
/// schema; `ratings` and `num_of_reviews` are derived from the review rows
/// and recomputed on every review write, never edited directly.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub specs: Json<BTreeMap<String, String>>,
    pub images: Json<Vec<ProductImage>>,
    pub stock: i32,
    pub ratings: f64,
    pub num_of_reviews: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user's review of one product. At most one row exists per
/// (product, user) pair; upserts overwrite rating and comment in place.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
