//! Metric sources: the files the kernel modules expose under `/proc`.

use crate::error::{MonitorError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A named external data source producing one metric's raw content.
pub trait MetricSource: Send + Sync {
    /// Read the full content in a single attempt.
    fn read(&self) -> Result<String>;

    /// Whether the source is currently present.
    fn exists(&self) -> bool;

    /// Identifier used in logs and errors.
    fn location(&self) -> PathBuf;
}

/// A source backed by a file path.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetricSource for FileSource {
    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| MonitorError::read_error(&self.path, e))
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
