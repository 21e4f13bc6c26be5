//! Metric collection: sources, the shared cache, pollers and aggregation.
//!
//! Each tracked metric has a [`MetricSource`] read by a [`MetricPoller`] into
//! one slot of a [`MetricStore`]. HTTP handlers read the slots back, either
//! verbatim or merged by [`aggregate::combine`].

pub mod aggregate;
pub mod cache;
pub mod data;
pub mod poller;
pub mod source;

// Re-export commonly used items
pub use cache::{Metric, MetricStore, SharedCache, SlotPayload, SlotSet};
pub use data::{CombinedSnapshot, CpuReading, MemoryReading, ProcessTableReading};
pub use poller::{check_sources, MetricPoller, POLL_INTERVAL};
pub use source::{FileSource, MetricSource};
