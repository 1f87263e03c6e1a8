use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ChatMessage;

const CHAT_COLUMNS: &str = "id, sender, user_name, text, created_at";

/// Full message history in creation order, oldest first. Replayed to every
/// connecting client.
pub async fn list_history(pool: &PgPool) -> sqlx::Result<Vec<ChatMessage>> {
    sqlx::query_as::<_, ChatMessage>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chat_messages ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await
}

/// Append a message; id and created_at are assigned here, and the stored
/// row is what gets broadcast.
pub async fn insert_message(
    pool: &PgPool,
    sender: Uuid,
    user_name: &str,
    text: &str,
) -> sqlx::Result<ChatMessage> {
    sqlx::query_as::<_, ChatMessage>(&format!(
        "INSERT INTO chat_messages (sender, user_name, text) \
         VALUES ($1, $2, $3) \
         RETURNING {CHAT_COLUMNS}"
    ))
    .bind(sender)
    .bind(user_name)
    .bind(text)
    .fetch_one(pool)
    .await
}
