use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use storefront_service::{
    config::Config,
    db,
    error::AppError,
    handlers, logging, metrics,
    middleware::JwtAuthMiddleware,
    services::{email_service::EmailService, image_service::ImageStore},
    state::AppState,
    websocket::{self, ConnectionRegistry},
};
use tracing_actix_web::TracingLogger;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let cfg = Arc::new(Config::from_env()?);

    let db = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    let registry = ConnectionRegistry::new();
    let images = Arc::new(ImageStore::connect(cfg.s3.clone()).await);
    let mailer = Arc::new(EmailService::new(cfg.smtp.clone()));

    let state = AppState {
        db,
        registry,
        config: cfg.clone(),
        images,
        mailer,
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting storefront-service");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&state.config.client_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        let secret = state.config.jwt_secret.clone();

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/admin")
                            .wrap(JwtAuthMiddleware::new(secret.clone()))
                            .service(handlers::products::create_product)
                            .service(handlers::products::update_product)
                            .service(handlers::products::delete_product)
                            .service(handlers::categories::create_category)
                            .service(handlers::categories::update_category)
                            .service(handlers::categories::delete_category)
                            .service(handlers::categories::add_subcategory)
                            .service(handlers::categories::delete_subcategory)
                            .service(handlers::brands::create_brand)
                            .service(handlers::brands::update_brand)
                            .service(handlers::brands::delete_brand)
                            .service(handlers::specs::create_spec)
                            .service(handlers::specs::update_spec)
                            .service(handlers::specs::delete_spec)
                            .service(handlers::blogs::create_blog)
                            .service(handlers::blogs::update_blog)
                            .service(handlers::blogs::delete_blog),
                    )
                    .service(
                        web::scope("/reviews")
                            .wrap(JwtAuthMiddleware::new(secret.clone()))
                            .service(handlers::reviews::upsert_review),
                    )
                    .service(handlers::products::get_products)
                    .service(handlers::products::search_products)
                    .service(handlers::reviews::get_product_reviews)
                    .service(handlers::products::get_product)
                    .service(handlers::categories::get_categories)
                    .service(handlers::categories::get_category)
                    .service(handlers::brands::get_brands)
                    .service(handlers::brands::get_brand)
                    .service(handlers::specs::get_specs)
                    .service(handlers::specs::get_spec)
                    .service(handlers::blogs::get_blogs)
                    .service(handlers::blogs::get_blog),
            )
            .service(
                web::scope("/crud/v1")
                    .service(
                        web::scope("/me")
                            .wrap(JwtAuthMiddleware::new(secret))
                            .service(handlers::auth::me)
                            .service(handlers::auth::update_profile),
                    )
                    .service(handlers::auth::register)
                    .service(handlers::auth::login)
                    .service(handlers::auth::logout)
                    .service(handlers::auth::forgot_password)
                    .service(handlers::auth::reset_password),
            )
            .service(websocket::session::ws_handler)
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route(
                "/health",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({
                        "status": "ok",
                        "service": "storefront-service",
                        "version": env!("CARGO_PKG_VERSION"),
                    }))
                }),
            )
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(format!("run server: {e}")))
}
