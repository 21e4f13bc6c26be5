//! Shared cache holding the latest payload of every tracked metric.
//!
//! All slots live behind a single lock. Pollers of different metrics and the
//! HTTP handlers therefore serialize against each other, which is fine at the
//! contention this exporter sees (three writers every few seconds, a handful
//! of scrapers).

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The metrics tracked by the exporter, one slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cpu,
    Memory,
    ProcessTable,
}

impl Metric {
    /// Every tracked metric in aggregation order.
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Memory, Metric::ProcessTable];

    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Cpu => "CPU",
            Metric::Memory => "RAM",
            Metric::ProcessTable => "Procesos",
        }
    }

    /// HTTP route serving the raw payload.
    pub fn route(self) -> &'static str {
        match self {
            Metric::Cpu => "/cpu",
            Metric::Memory => "/ram",
            Metric::ProcessTable => "/procesos",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content of a single metric slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotPayload {
    /// Nothing has been written yet.
    #[default]
    Empty,
    /// Verbatim content of the last successful read.
    Ready(String),
    /// Cause of the last failed read.
    Failed(String),
}

impl SlotPayload {
    /// Render the payload as served on the raw endpoints.
    ///
    /// Failures keep the `Error: <cause>` shape so scrapers that inspect the
    /// body keep working.
    pub fn raw(&self) -> String {
        match self {
            SlotPayload::Empty => String::new(),
            SlotPayload::Ready(content) => content.clone(),
            SlotPayload::Failed(cause) => format!("Error: {cause}"),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SlotPayload::Ready(_))
    }
}

/// One payload per tracked metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSet {
    pub cpu: SlotPayload,
    pub memory: SlotPayload,
    pub process_table: SlotPayload,
}

impl SlotSet {
    pub fn get(&self, metric: Metric) -> &SlotPayload {
        match metric {
            Metric::Cpu => &self.cpu,
            Metric::Memory => &self.memory,
            Metric::ProcessTable => &self.process_table,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut SlotPayload {
        match metric {
            Metric::Cpu => &mut self.cpu,
            Metric::Memory => &mut self.memory,
            Metric::ProcessTable => &mut self.process_table,
        }
    }
}

/// Storage seam between pollers and HTTP handlers.
///
/// Writes replace the previous payload entirely. Reads never fail.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Overwrite the slot for `metric`.
    async fn write(&self, metric: Metric, payload: SlotPayload);

    /// Current payload for `metric`.
    async fn read(&self, metric: Metric) -> SlotPayload;

    /// All slots, copied out under a single lock acquisition.
    async fn snapshot(&self) -> SlotSet;
}

/// In-memory store guarded by one mutex covering every slot.
#[derive(Debug, Clone, Default)]
pub struct SharedCache {
    slots: Arc<Mutex<SlotSet>>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricStore for SharedCache {
    async fn write(&self, metric: Metric, payload: SlotPayload) {
        let mut slots = self.slots.lock().await;
        *slots.get_mut(metric) = payload;
    }

    async fn read(&self, metric: Metric) -> SlotPayload {
        self.slots.lock().await.get(metric).clone()
    }

    async fn snapshot(&self) -> SlotSet {
        self.slots.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unwritten_slot_reads_empty() {
        let cache = SharedCache::new();
        for metric in Metric::ALL {
            assert_eq!(cache.read(metric).await, SlotPayload::Empty);
            assert_eq!(cache.read(metric).await.raw(), "");
        }
    }

    #[tokio::test]
    async fn test_failure_replaces_previous_payload() {
        let cache = SharedCache::new();
        cache
            .write(Metric::Cpu, SlotPayload::Ready(r#"{"porcentajeUso": 10}"#.into()))
            .await;
        cache
            .write(Metric::Cpu, SlotPayload::Failed("gone".into()))
            .await;

        assert_eq!(cache.read(Metric::Cpu).await.raw(), "Error: gone");
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let cache = SharedCache::new();
        cache
            .write(Metric::Memory, SlotPayload::Ready("ram".into()))
            .await;

        let slots = cache.snapshot().await;
        assert_eq!(slots.cpu, SlotPayload::Empty);
        assert_eq!(slots.memory, SlotPayload::Ready("ram".into()));
        assert_eq!(slots.process_table, SlotPayload::Empty);
    }

    #[tokio::test]
    async fn test_clones_share_slots() {
        let cache = SharedCache::new();
        let writer = cache.clone();
        writer
            .write(Metric::ProcessTable, SlotPayload::Ready("{}".into()))
            .await;
        assert!(cache.read(Metric::ProcessTable).await.is_ready());
    }

    #[test]
    fn test_metric_names_and_routes() {
        assert_eq!(Metric::Cpu.to_string(), "CPU");
        assert_eq!(Metric::Memory.route(), "/ram");
        assert_eq!(Metric::ProcessTable.route(), "/procesos");
    }
}
