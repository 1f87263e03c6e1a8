use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, \
     reset_password_token, reset_password_expires, created_at, updated_at";

pub async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash) \
         VALUES ($1, $2, $3) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn email_taken_by_other(pool: &PgPool, email: &str, user_id: Uuid) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i32>("SELECT 1 FROM users WHERE email = $1 AND id <> $2")
        .bind(email)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET name = $2, email = $3, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn set_reset_token(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
    expires: DateTime<Utc>,
) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE users SET reset_password_token = $2, reset_password_expires = $3, \
         updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(token_hash)
    .bind(expires)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE users SET reset_password_token = NULL, reset_password_expires = NULL, \
         updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Look up a user by the hashed reset token; expired tokens do not match.
pub async fn find_by_reset_token(pool: &PgPool, token_hash: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users \
         WHERE reset_password_token = $1 AND reset_password_expires > NOW()"
    ))
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

/// Set a new password hash and invalidate any outstanding reset token.
pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE users SET password_hash = $2, reset_password_token = NULL, \
         reset_password_expires = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(())
}
