//! Data structures for the readings published by the kernel modules.
//!
//! Field names follow the JSON the modules emit. Missing and `null` fields
//! decode as zero, negative counters are kept and unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Format of the `hora` field of a [`CombinedSnapshot`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decode `null` as the type's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// CPU usage as reported by the CPU module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuReading {
    /// CPU usage percentage
    #[serde(rename = "porcentajeUso", deserialize_with = "null_as_default")]
    pub usage_percent: f64,
}

/// Memory usage as reported by the RAM module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryReading {
    /// Total memory
    #[serde(rename = "total", deserialize_with = "null_as_default")]
    pub total_bytes: i64,
    /// Free memory
    #[serde(rename = "libre", deserialize_with = "null_as_default")]
    pub free_bytes: i64,
    /// Used memory
    #[serde(rename = "uso", deserialize_with = "null_as_default")]
    pub used_bytes: i64,
    /// Memory usage percentage
    #[serde(rename = "porcentajeUso", deserialize_with = "null_as_default")]
    pub usage_percent: f64,
}

/// Process table counters as reported by the process module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessTableReading {
    #[serde(rename = "procesos_corriendo", deserialize_with = "null_as_default")]
    pub running: i64,
    #[serde(rename = "total_procesos", deserialize_with = "null_as_default")]
    pub total: i64,
    #[serde(rename = "procesos_durmiendo", deserialize_with = "null_as_default")]
    pub sleeping: i64,
    #[serde(rename = "procesos_zombie", deserialize_with = "null_as_default")]
    pub zombie: i64,
    #[serde(rename = "procesos_parados", deserialize_with = "null_as_default")]
    pub stopped: i64,
}

/// The three readings merged into a single record, built per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSnapshot {
    pub total_ram: i64,
    pub ram_libre: i64,
    pub uso_ram: i64,
    pub porcentaje_ram: f64,
    pub porcentaje_cpu_uso: f64,
    pub porcentaje_cpu_libre: f64,
    pub procesos_corriendo: i64,
    pub total_procesos: i64,
    pub procesos_durmiendo: i64,
    pub procesos_zombie: i64,
    pub procesos_parados: i64,
    /// Wall-clock time of the aggregation, `YYYY-MM-DD HH:MM:SS`
    pub hora: String,
}

impl CpuReading {
    /// Idle share, assumed complementary to usage. Not clamped.
    pub fn idle_percent(&self) -> f64 {
        100.0 - self.usage_percent
    }
}

impl CombinedSnapshot {
    /// Merge the three readings, stamping the record with `hora`.
    pub fn from_readings(
        cpu: &CpuReading,
        memory: &MemoryReading,
        processes: &ProcessTableReading,
        hora: impl Into<String>,
    ) -> Self {
        Self {
            total_ram: memory.total_bytes,
            ram_libre: memory.free_bytes,
            uso_ram: memory.used_bytes,
            porcentaje_ram: memory.usage_percent,
            porcentaje_cpu_uso: cpu.usage_percent,
            porcentaje_cpu_libre: cpu.idle_percent(),
            procesos_corriendo: processes.running,
            total_procesos: processes.total,
            procesos_durmiendo: processes.sleeping,
            procesos_zombie: processes.zombie,
            procesos_parados: processes.stopped,
            hora: hora.into(),
        }
    }
}
