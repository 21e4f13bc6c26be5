//! Periodic pollers refreshing one cache slot each.

use crate::error::{MonitorError, Result};
use crate::metrics::cache::{Metric, MetricStore, SlotPayload};
use crate::metrics::source::MetricSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// Fixed cadence between two reads of the same source.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Owns the lifecycle of one metric slot.
#[derive(Clone)]
pub struct MetricPoller {
    metric: Metric,
    source: Arc<dyn MetricSource>,
    store: Arc<dyn MetricStore>,
}

impl MetricPoller {
    pub fn new(metric: Metric, source: Arc<dyn MetricSource>, store: Arc<dyn MetricStore>) -> Self {
        Self {
            metric,
            source,
            store,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn source(&self) -> &dyn MetricSource {
        self.source.as_ref()
    }

    /// Read the source once and publish the outcome into the slot.
    pub async fn tick(&self) {
        match self.source.read() {
            Ok(content) => {
                let line = content.trim_end().to_string();
                self.store
                    .write(self.metric, SlotPayload::Ready(content))
                    .await;
                info!("[{}] {}", self.metric, line);
            }
            Err(err) => {
                self.store
                    .write(self.metric, SlotPayload::Failed(err.to_string()))
                    .await;
                error!("Error {}: {}", self.metric, err);
            }
        }
    }

    /// Poll until `shutdown` flips to `true` or its sender goes away.
    ///
    /// The first read happens immediately. Read failures never end the loop.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("{} poller started on {}", self.metric, self.source.location().display());

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("{} poller stopped", self.metric);
    }
}

/// Refuse to start unless every poller's source is present.
pub fn check_sources(pollers: &[MetricPoller]) -> Result<()> {
    for poller in pollers {
        if !poller.source.exists() {
            return Err(MonitorError::ModuleNotLoaded {
                metric: poller.metric,
                path: poller.source.location(),
            });
        }
    }
    Ok(())
}
