//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own. The workspace's `mobimama-run` binary does the same
//! with its own logging defaults.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use mobimama_core::{
    config::{
        data_dir_from_env_value, flag_update_attempts_from_env_value, store_backend_from_env_value,
    },
    CoreConfig,
};

/// Main entry point for the Mobi Mama REST API server
///
/// # Environment Variables
/// - `MOBIMAMA_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MOBIMAMA_STORE`: `json` (default) or `memory`
/// - `MOBIMAMA_DATA_DIR`: JSON store directory (default: "mobimama_data")
/// - `MOBIMAMA_FLAG_UPDATE_ATTEMPTS`: patient risk-level update attempts, 1 to 5 (default: 1)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("mobimama_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MOBIMAMA_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        store_backend_from_env_value(std::env::var("MOBIMAMA_STORE").ok())?,
        data_dir_from_env_value(std::env::var("MOBIMAMA_DATA_DIR").ok()),
        flag_update_attempts_from_env_value(std::env::var("MOBIMAMA_FLAG_UPDATE_ATTEMPTS").ok())?,
    )?;
    let store = cfg.open_store()?;

    tracing::info!(
        "-- Starting Mobi Mama REST API on {} ({:?} store at {})",
        addr,
        cfg.store_backend(),
        cfg.data_dir().display()
    );

    let app = router(AppState::new(Arc::clone(&store), &cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
