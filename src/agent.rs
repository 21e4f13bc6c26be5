//! Process orchestration: startup checks, pollers and the HTTP server.

use crate::error::Result;
use crate::metrics::{
    aggregate, check_sources, CombinedSnapshot, FileSource, Metric, MetricPoller, MetricStore,
    SharedCache,
};
use crate::web::{self, AppState, WebConfig};
use chrono::Local;
use futures_util::future::join_all;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info};

/// Paths of the proc files exposed by the kernel modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub cpu: PathBuf,
    pub memory: PathBuf,
    pub process_table: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            cpu: PathBuf::from(crate::DEFAULT_CPU_SOURCE),
            memory: PathBuf::from(crate::DEFAULT_RAM_SOURCE),
            process_table: PathBuf::from(crate::DEFAULT_PROCESOS_SOURCE),
        }
    }
}

impl SourceConfig {
    pub fn path(&self, metric: Metric) -> &PathBuf {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Memory => &self.memory,
            Metric::ProcessTable => &self.process_table,
        }
    }
}

/// The exporter: three pollers feeding one cache served over HTTP.
pub struct MonitorAgent {
    sources: SourceConfig,
    web: WebConfig,
    cache: SharedCache,
}

impl MonitorAgent {
    pub fn new(sources: SourceConfig, web: WebConfig) -> Self {
        Self {
            sources,
            web,
            cache: SharedCache::new(),
        }
    }

    /// Handle on the cache the pollers write into.
    pub fn cache(&self) -> SharedCache {
        self.cache.clone()
    }

    /// One poller per tracked metric, all writing into this agent's cache.
    pub fn pollers(&self) -> Vec<MetricPoller> {
        let store: Arc<dyn MetricStore> = Arc::new(self.cache.clone());
        Metric::ALL
            .into_iter()
            .map(|metric| {
                MetricPoller::new(
                    metric,
                    Arc::new(FileSource::new(self.sources.path(metric))),
                    store.clone(),
                )
            })
            .collect()
    }

    /// Check the sources, bind the configured address and serve until
    /// `shutdown` resolves.
    ///
    /// A missing source fails before any poller starts or any port is bound.
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let pollers = self.pollers();
        check_sources(&pollers)?;

        let listener = web::bind(&self.web).await?;
        self.serve(listener, pollers, shutdown).await
    }

    /// Like [`MonitorAgent::run`] on a listener bound by the caller.
    pub async fn run_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let pollers = self.pollers();
        check_sources(&pollers)?;
        self.serve(listener, pollers, shutdown).await
    }

    async fn serve(
        self,
        listener: TcpListener,
        pollers: Vec<MetricPoller>,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handles: Vec<_> = pollers
            .into_iter()
            .map(|poller| {
                info!(
                    "Polling {} from {}",
                    poller.metric(),
                    poller.source().location().display()
                );
                tokio::spawn(poller.run(stop_rx.clone()))
            })
            .collect();

        let state = AppState::new(Arc::new(self.cache.clone()))
            .with_strict_raw_status(self.web.strict_raw_status);
        let result = web::serve(listener, &self.web, state, shutdown).await;

        // The receivers see the flag even if a poller is mid-tick.
        let _ = stop_tx.send(true);
        join_all(handles).await;
        debug!("All pollers stopped");

        result
    }

    /// Read every source once and aggregate, without serving.
    pub async fn snapshot_once(&self) -> Result<CombinedSnapshot> {
        let pollers = self.pollers();
        check_sources(&pollers)?;

        for poller in &pollers {
            poller.tick().await;
        }
        aggregate::combine(&self.cache.snapshot().await, Local::now())
    }
}
