//! # procwatch - proc module metrics exporter
//!
//! Periodically reads the JSON documents published by the CPU, RAM and
//! process-table kernel modules under `/proc`, caches the latest reading of
//! each and republishes them over HTTP.
//!
//! ## Endpoints
//!
//! - `GET /cpu`, `GET /ram`, `GET /procesos`: latest raw payload of each module
//! - `GET /metrics`: the three readings merged into one JSON record
//! - `GET /health`: process liveness
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procwatch::{MonitorAgent, SourceConfig, WebConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = MonitorAgent::new(SourceConfig::default(), WebConfig::default());
//!     agent.run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod error;
pub mod metrics;
pub mod web;

// Re-export public API
pub use agent::{MonitorAgent, SourceConfig};
pub use error::{MonitorError, Result};
pub use metrics::{
    CombinedSnapshot, FileSource, Metric, MetricPoller, MetricSource, MetricStore, SharedCache,
    SlotPayload, SlotSet, POLL_INTERVAL,
};
pub use web::{create_app, start_web_server, AppState, WebConfig};

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// Proc file published by the CPU module
pub const DEFAULT_CPU_SOURCE: &str = "/proc/cpu_202201947";

/// Proc file published by the RAM module
pub const DEFAULT_RAM_SOURCE: &str = "/proc/ram_202201947";

/// Proc file published by the process-table module
pub const DEFAULT_PROCESOS_SOURCE: &str = "/proc/procesos_202201947";
