//! Account endpoints: register, login, profile and password reset.

use actix_web::http::StatusCode;
use actix_web::{get, post, put, web, HttpResponse};
use chrono::{Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::models::User;
use crate::security::{jwt, password};
use crate::state::AppState;

const RESET_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// Issue a fresh token and return it together with the public profile, the
/// shape every auth-ish endpoint responds with.
fn token_response(state: &AppState, user: &User, status: StatusCode) -> AppResult<HttpResponse> {
    let token = jwt::generate_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
        user,
    )?;

    Ok(HttpResponse::build(status).json(json!({
        "success": true,
        "token": token,
        "user": user.public(),
    })))
}

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    if user_repo::find_by_email(&state.db, &body.email).await?.is_some() {
        return Err(AppError::Conflict(
            "an account with this email already exists".into(),
        ));
    }

    let hash = password::hash_password(&body.password)?;
    let user = user_repo::insert_user(&state.db, body.name.trim(), &body.email, &hash).await?;
    tracing::info!(user_id = %user.id, "account registered");

    token_response(&state, &user, StatusCode::CREATED)
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let (email, pass) = match (&body.email, &body.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => {
            return Err(AppError::Validation(
                "please provide email and password".into(),
            ))
        }
    };

    let user = user_repo::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".into()))?;

    password::verify_password(pass, &user.password_hash)?;

    token_response(&state, &user, StatusCode::OK)
}

#[get("/logout")]
pub async fn logout() -> HttpResponse {
    // Tokens are stateless; the client discards its copy.
    HttpResponse::Ok().json(json!({ "message": "logged out successfully" }))
}

#[get("")]
pub async fn me(state: web::Data<AppState>, user: AuthenticatedUser) -> AppResult<HttpResponse> {
    let user = user_repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user.public(),
    })))
}

#[put("/update")]
pub async fn update_profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let current = user_repo::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&current.name)
        .to_string();

    let email = match body.email.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(email) => {
            if user_repo::email_taken_by_other(&state.db, email, auth.id).await? {
                return Err(AppError::Conflict("this email is already in use".into()));
            }
            email.to_string()
        }
        None => current.email.clone(),
    };

    let user = user_repo::update_profile(&state.db, auth.id, &name, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    // Claims embed name and email, so the client gets a fresh token.
    token_response(&state, &user, StatusCode::OK)
}

fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[post("/password/forgot")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    let user = user_repo::find_by_email(&state.db, &body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill(&mut token_bytes[..]);
    let token = hex::encode(token_bytes);

    let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    user_repo::set_reset_token(&state.db, user.id, &hash_reset_token(&token), expires).await?;

    let reset_url = format!(
        "{}/password/reset/{}",
        state.config.client_url.trim_end_matches('/'),
        token
    );

    if let Err(e) = state
        .mailer
        .send_password_reset(&user.email, &user.name, &reset_url)
    {
        // The token must not stay live if the user never got the link.
        user_repo::clear_reset_token(&state.db, user.id).await?;
        tracing::error!(error = %e, "failed to send password reset email");
        return Err(AppError::Email("failed to send the reset email".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "check your email" })))
}

#[put("/password/reset/{token}")]
pub async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let token_hash = hash_reset_token(&path.into_inner());

    let user = user_repo::find_by_reset_token(&state.db, &token_hash)
        .await?
        .ok_or_else(|| AppError::Validation("token is invalid or has expired".into()))?;

    if body.password != body.confirm_password {
        return Err(AppError::Validation("passwords do not match".into()));
    }

    let hash = password::hash_password(&body.password)?;
    user_repo::update_password(&state.db, user.id, &hash).await?;
    tracing::info!(user_id = %user.id, "password reset");

    let user = user_repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    token_response(&state, &user, StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_stored_hashed() {
        let token = "deadbeef";
        let hashed = hash_reset_token(token);
        assert_ne!(hashed, token);
        assert_eq!(hashed.len(), 64);
        // Deterministic, so lookups by hash work.
        assert_eq!(hashed, hash_reset_token(token));
    }
}
