//! HTTP surface republishing the cached metrics.
//!
//! Raw endpoints serve each slot verbatim, `/metrics` merges the three slots
//! into one record and `/health` reports process liveness.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use handlers::AppState;
pub use router::create_app;

use crate::error::{MonitorError, Result};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Bind the listener described by `config`.
pub async fn bind(config: &WebConfig) -> Result<TcpListener> {
    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| MonitorError::config_error(format!("Invalid bind address: {}", e)))?;

    TcpListener::bind(&addr)
        .await
        .map_err(|e| MonitorError::web_server_error(format!("Failed to bind to address: {}", e)))
}

/// Serve the exporter on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    config: &WebConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_app(state, config);
    let addr = listener.local_addr()?;

    info!("Starting monitoring agent on http://{}", addr);
    info!(
        "Metrics available at http://{addr}/cpu, http://{addr}/ram, http://{addr}/procesos and http://{addr}/metrics"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MonitorError::web_server_error(format!("Server error: {}", e)))
}

/// Bind and serve in one step.
pub async fn start_web_server(
    config: WebConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = bind(&config).await?;
    serve(listener, &config, state, shutdown).await
}
