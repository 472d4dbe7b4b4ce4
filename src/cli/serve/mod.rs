//! Serve command - runs the HTTP API

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router_with_state;
use crate::config::AppConfig;
use crate::infrastructure::observability::init_metrics;

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    info!("Starting up...");

    let state = crate::create_app_state_with_config(&config).await?;
    let pool = state.pool.clone();

    let metrics = init_metrics(&config.metrics);
    let app = create_router_with_state(state, &config.cors, metrics);

    let addr = build_socket_addr(&config)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    if let Some(pool) = pool {
        pool.close().await;
        info!("Database connections closed");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
