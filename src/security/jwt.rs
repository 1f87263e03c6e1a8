/// Bearer-token generation and validation (HS256, shared secret).
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

pub fn generate_token(secret: &str, ttl_hours: i64, user: &User) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
}

pub fn validate_token(secret: &str, token: &str) -> AppResult<TokenData<Claims>> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))
}

/// Parse the subject claim into a user id.
pub fn subject_id(claims: &Claims) -> AppResult<Uuid> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("invalid user ID in token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: String::new(),
            role: "user".into(),
            reset_password_token: None,
            reset_password_expires: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn round_trip_preserves_claims() {
        let user = test_user();
        let token = generate_token("test-secret", 1, &user).unwrap();
        let data = validate_token("test-secret", &token).unwrap();

        assert_eq!(subject_id(&data.claims).unwrap(), user.id);
        assert_eq!(data.claims.email, user.email);
        assert_eq!(data.claims.role, "user");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token("secret-a", 1, &test_user()).unwrap();
        assert!(validate_token("secret-b", &token).is_err());
    }
}
