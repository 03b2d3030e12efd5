//! DocuMinds Service Binary

use std::net::SocketAddr;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use documinds_common::VERSION;
use documinds_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting DocuMinds v{}", VERSION);

    let config = ServerConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let state = AppState::from_config(&config).await?;
    info!(
        "Memory config: namespace={}, ttl_days={}, threshold={}, backend_timeout_ms={}",
        config.memory.namespace,
        config.memory.ttl_days,
        config.memory.relevance_threshold,
        config.memory.backend_timeout_ms
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server started on {}", addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Shutting down DocuMinds");
    Ok(())
}
