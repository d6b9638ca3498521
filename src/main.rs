mod api;
mod config;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{AppConfig, StoreBackend};
use dotenv::dotenv;
use services::{
    auth_service::RefreshTokenCodec, CrossCheckResolver, InMemoryUserStore, RefreshTokenResolver,
    SessionIdentityResolver, UserService, UserStore,
};
use std::sync::Arc;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Clearplate User Service...");

    let store: Arc<dyn UserStore> = match (config.store, config.database_url.as_deref()) {
        (StoreBackend::MongoDb, Some(database_url)) => {
            let db = database::MongoDB::new(database_url)
                .await
                .map_err(|e| std::io::Error::other(format!("Failed to connect to MongoDB: {}", e)))?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(database::MongoUserStore::new(&db))
        }
        (StoreBackend::MongoDb, None) => {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "DATABASE_URL must be set"));
        }
        (StoreBackend::Memory, _) => {
            log::warn!("⚠️  Using in-memory user store, data is lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let codec = RefreshTokenCodec::new(&config.jwt.secret, &config.jwt.issuer, &config.jwt.audience);
    let token_resolver = RefreshTokenResolver::new(codec, &config.jwt.refresh_cookie);
    let login_resolver = CrossCheckResolver::new(SessionIdentityResolver, token_resolver.clone());

    let user_service = web::Data::new(UserService::new(
        store,
        Arc::new(login_resolver),
        Arc::new(token_resolver),
    ));

    // 👑 Seed admin user
    if let Some(seed) = &config.seed_admin {
        if let Err(e) = seeds::admin_seed::seed_admin_user(&user_service, seed).await {
            log::error!("❌ Failed to seed admin user: {}", e);
        }
    }

    let session_key = middleware::session::session_key(&config.session);
    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    HttpServer::new(move || {
        let cors = config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::HeaderName::from_static("x-refresh-token"),
            ])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::build_openapi(&config.session.cookie_name, &config.jwt.refresh_cookie);

        App::new()
            .app_data(user_service.clone())
            .wrap(middleware::session::session_middleware(&config.session, session_key.clone()))
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // User endpoints
            .configure(api::user_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
