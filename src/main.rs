mod api;
mod config;
mod database;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use dotenv::dotenv;
use services::{MongoUserRepository, ProfileClient, UserRepository};
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::AppConfig::from_env().map_err(|e| {
        log::error!("❌ Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting User Service...");
    log::info!(
        "📊 Collection: {} (timeout {:?})",
        config.mongo_collection,
        config.mongo_timeout
    );

    // One connection pool for the whole process, passed to handlers as app data
    let db = database::MongoDB::new(&config.mongo_uri, config.mongo_timeout)
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        })?;

    log::info!("✅ MongoDB connected successfully");

    let repository: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(
        &db,
        &config.mongo_collection,
        config.mongo_timeout,
    ));
    let repository = web::Data::from(repository);

    let profiles = ProfileClient::new(&config.profile_api_base_url, config.profile_api_timeout)
        .map_err(|e| {
            log::error!("❌ Failed to build profile API client: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        })?;
    let profiles = web::Data::new(profiles);

    log::info!("🌐 Profile API: {}", config.profile_api_base_url);
    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!(
        "📚 Swagger UI available at: http://{}:{}/swagger-ui/",
        config.host,
        config.port
    );

    let openapi = api::swagger::ApiDoc::openapi();
    let api_prefix = config.api_prefix.clone();
    let cors_origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        let cors = cors_origins.iter().fold(
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(3600),
            |cors, origin| cors.allowed_origin(origin),
        );

        App::new()
            .app_data(repository.clone())
            .app_data(profiles.clone())
            .wrap(cors)
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/", web::get().to(api::health::root))
            .route("/health", web::get().to(api::health::health_check))
            // Users
            .service(web::scope(&api_prefix).configure(api::users::configure))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
