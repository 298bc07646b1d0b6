use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use product_svc::app::{app, AppState};
use product_svc::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config singleton reads the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_svc=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    info!("Starting product-svc in {:?} mode", config.environment);

    let state = AppState::from_config(config)
        .await
        .context("failed to initialize application state")?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("GraphQL server running at http://{}{}", bind_addr, config.server.path);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
