use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tuiter::api::{self, AppState};
use tuiter::config::{Config, StoreBackend};
use tuiter::dao::memory::MemoryStore;
use tuiter::dao::postgres::PgStore;
use tuiter::dao::Store;
use tuiter::db::init_database;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tuiter=debug".into()),
    );
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = Config::from_env()?;
    info!("Initialized configuration");

    // Pick the storage backend
    let store: Arc<dyn Store> = match config.store {
        StoreBackend::Postgres => {
            let db = Arc::new(init_database(&config.database).await?);
            info!("Connected to database");
            Arc::new(PgStore::new(db))
        }
        StoreBackend::Memory => {
            info!("Using the in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, &config)?;

    // Handle shutdown signals
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    };

    if let Err(e) = api::start_api_server(state, &config.server, shutdown).await {
        error!("API server error: {}", e);
        return Err(e);
    }

    info!("Tuiter shutdown complete");
    Ok(())
}
