use dotenvy::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    /// Optional base URL for serving objects (CDN or custom domain). When
    /// unset, the standard S3 virtual-hosted URL is used.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Origin of the browser client, used for CORS and password-reset links.
    pub client_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub s3: S3Config,
    pub smtp: SmtpConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:5173".into());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);

        let s3 = S3Config {
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "storefront-media".into()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint: env::var("S3_ENDPOINT").ok(),
            public_url: env::var("S3_PUBLIC_URL").ok(),
        };

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@storefront.dev".into()),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Storefront".into()),
        };

        Ok(Self {
            database_url,
            port,
            client_url,
            jwt_secret,
            jwt_ttl_hours,
            s3,
            smtp,
        })
    }
}
