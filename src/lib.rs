pub mod api;
pub mod bootstrap;
pub mod dto;
pub mod engine;
pub mod entity;
pub mod error;
pub mod test_support;

pub use bootstrap::{connect_and_migrate, init_tracing, load_dotenv, GameConfig, StorageConfig};

use actix_web::web;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(health).service(web::scope("/api").service(api::dispatch));
}

#[actix_web::get("/")]
async fn health() -> impl actix_web::Responder {
    "Stop! backend is running"
}
