use std::env;
use std::sync::Once;

use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bootstrap::{load_dotenv, StorageConfig};

static INIT: Once = Once::new();
static MIGRATE_LOCK: Mutex<()> = Mutex::const_new(());

pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info,sea_orm=info"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    });
}

/// Test bootstrap that loads .env, ensures a *_test database, inits tracing
/// and connects+migrates. Each call opens its own pool: `#[actix_web::test]`
/// gives every test its own runtime, and tokio sockets are tied to the
/// runtime they were created on, so a pool cached across tests deadlocks
/// once the first test's runtime is dropped.
pub async fn test_bootstrap() -> DatabaseConnection {
    load_dotenv();
    ensure_test_db();
    init_tracing_for_tests();
    connect_and_migrate().await
}

fn ensure_test_db() {
    let url = env::var("DATABASE_URL").expect("DATABASE_URL is required for tests");
    assert!(
        url.contains("_test"),
        "Refusing to run unless DATABASE_URL points to a *_test database. Current: {url}"
    );
}

async fn connect_and_migrate() -> DatabaseConnection {
    let config = StorageConfig::from_env();

    let db = config.connect().await.expect("DB connect failed");
    info!("Connected to test database");

    // Serialize migrations so parallel tests don't race the initial schema.
    let _guard = MIGRATE_LOCK.lock().await;
    Migrator::up(&db, None).await.expect("Migrator::up failed");
    info!("Test database migrations completed");

    db
}
