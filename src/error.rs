//! Error handling for the procwatch exporter.

use crate::metrics::Metric;
use std::path::PathBuf;

/// A specialized `Result` type for procwatch operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// The main error type for procwatch operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A metric source could not be read on this attempt
    #[error("failed to read {}: {cause}", path.display())]
    Read { path: PathBuf, cause: String },

    /// A required kernel module is not exposing its proc file
    #[error("the {metric} module is not loaded, check {}", path.display())]
    ModuleNotLoaded { metric: Metric, path: PathBuf },

    /// A cached payload did not decode into its reading
    #[error("failed to parse {metric} data: {reason}")]
    Parse { metric: Metric, reason: String },

    /// The combined snapshot could not be encoded
    #[error("failed to encode combined metrics: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Create a new read error for `path`.
    pub fn read_error(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a new parse error for the `metric` stage.
    pub fn parse_error(metric: Metric, reason: impl ToString) -> Self {
        Self::Parse {
            metric,
            reason: reason.to_string(),
        }
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is fatal at startup rather than per-tick.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ModuleNotLoaded { .. } | Self::WebServer(_) | Self::Config(_)
        )
    }
}
