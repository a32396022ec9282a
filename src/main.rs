use std::env;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use stop_backend::{
    configure_routes, connect_and_migrate, init_tracing, load_dotenv, GameConfig, StorageConfig,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    load_dotenv();
    init_tracing();

    let storage = StorageConfig::from_env();
    let game_config = GameConfig::from_env();

    let db = connect_and_migrate(&storage)
        .await
        .map_err(|e| std::io::Error::other(format!("database setup failed: {e}")))?;

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    info!("Starting Stop! backend on {host}:{port}");

    HttpServer::new(move || {
        let frontend_origin = env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| {
            warn!("CORS_ALLOWED_ORIGIN not set, using default");
            "http://localhost:3000".to_string()
        });

        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(game_config.clone()))
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
