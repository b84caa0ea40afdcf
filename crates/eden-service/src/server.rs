//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::ServiceConfig;
use crate::error::{DaemonError, DaemonResult};
use eden_curation::Registry;
use tokio::net::TcpListener;

/// Eden curation server
pub struct Server {
    config: ServiceConfig,
    registry: Registry,
}

impl Server {
    /// Create a new server, preparing the data directory
    pub fn new(config: ServiceConfig) -> DaemonResult<Self> {
        std::fs::create_dir_all(&config.storage.data_dir)?;
        let registry = Registry::open(&config.storage.data_dir);
        Ok(Self { config, registry })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.registry);
        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Eden service listening on {}", addr);
        tracing::info!(data_dir = %self.config.storage.data_dir.display(), "Using data directory");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Eden service shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
