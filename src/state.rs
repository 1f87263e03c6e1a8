use crate::{
    config::Config,
    services::{email_service::EmailService, image_service::ImageStore},
    websocket::ConnectionRegistry,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub registry: ConnectionRegistry,
    pub config: Arc<Config>,
    pub images: Arc<ImageStore>,
    pub mailer: Arc<EmailService>,
}
