use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use mobimama_core::{
    config::{
        data_dir_from_env_value, flag_update_attempts_from_env_value, store_backend_from_env_value,
    },
    CoreConfig,
};

/// Main entry point for the Mobi Mama application
///
/// Resolves configuration once, opens the record store and serves the REST API.
///
/// # Environment Variables
/// - `MOBIMAMA_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MOBIMAMA_STORE`: `json` (default) or `memory`
/// - `MOBIMAMA_DATA_DIR`: Directory for the JSON record store (default: "mobimama_data")
/// - `MOBIMAMA_FLAG_UPDATE_ATTEMPTS`: patient risk-level update attempts, 1 to 5 (default: 1)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, store setup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mobimama_run=info".parse()?)
                .add_directive("mobimama_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MOBIMAMA_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        store_backend_from_env_value(std::env::var("MOBIMAMA_STORE").ok())?,
        data_dir_from_env_value(std::env::var("MOBIMAMA_DATA_DIR").ok()),
        flag_update_attempts_from_env_value(std::env::var("MOBIMAMA_FLAG_UPDATE_ATTEMPTS").ok())?,
    )?;
    let store = cfg.open_store()?;

    tracing::info!("++ Starting Mobi Mama REST on {}", rest_addr);

    let rest_app = router(AppState::new(Arc::clone(&store), &cfg));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, rest_app).await?;

    Ok(())
}
