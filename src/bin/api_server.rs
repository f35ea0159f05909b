// API Server Binary Entry Point
//
// Purpose: Load the crop model + rice variety table and serve POST /predict/
// Usage: cargo run --bin api_server

use crop_advisor::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_advisor=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = ServerConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  MODEL_PATH: {:?}", config.model_path);
    tracing::info!("  LABEL_ENCODER_PATH: {:?}", config.label_encoder_path);
    tracing::info!("  RICE_DATA_PATH: {:?}", config.rice_data_path);
    tracing::info!("  MONTH_ORDERING: {}", config.month_ordering);

    // Load model artifacts and reference data; the port is not bound on failure
    let state = AppState::new(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
