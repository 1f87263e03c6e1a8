use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One entry in the append-only chat log. `id` and `created_at` are
/// assigned by the server at persistence time; rows are never mutated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    /// Identity reference supplied by the client. The channel performs no
    /// authentication, so this is trusted as-is.
    pub sender: Uuid,
    pub user_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
