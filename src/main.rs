// src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use lemlist_proxy::{
    config::{self, Config},
    proxy::{HttpUpstream, Proxy},
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lemlist_proxy=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => Config::default(),
    };
    let config = config::apply_env(config)?;

    if config.api_key.is_none() {
        warn!(
            "{} is not set; GET requests will be answered with 500",
            config::API_KEY_ENV
        );
    }
    info!(
        allowed_origin = %config.proxy.allowed_origin,
        upstream = %config.proxy.upstream_base,
        "Configuration loaded"
    );

    let upstream = HttpUpstream::new(config.proxy.upstream_timeout())
        .context("Failed to create HTTP client")?;
    let proxy = Arc::new(Proxy::new(
        config.proxy.clone(),
        config.api_key.clone(),
        Arc::new(upstream),
    ));

    let handler = RequestHandler::new(proxy);

    info!("Starting lemlist proxy on {}", config.server.listen_addr);
    ServerBuilder::new(config.server.listen_addr)
        .with_handler(handler)
        .serve(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
