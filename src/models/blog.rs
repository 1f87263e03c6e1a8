use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::product::ProductImage;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub short_content: String,
    pub content: String,
    pub date: NaiveDate,
    pub images: Json<Vec<ProductImage>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
