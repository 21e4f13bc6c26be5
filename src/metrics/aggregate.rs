//! Cross-metric aggregation backing the `/metrics` endpoint.

use crate::error::{MonitorError, Result};
use crate::metrics::cache::{Metric, SlotPayload, SlotSet};
use crate::metrics::data::{
    CombinedSnapshot, CpuReading, MemoryReading, ProcessTableReading, TIMESTAMP_FORMAT,
};
use chrono::{DateTime, Local, TimeZone};
use serde::de::DeserializeOwned;

/// Decode one slot into its reading.
///
/// Failed and empty slots are rejected without attempting to decode the
/// placeholder text.
pub fn parse_slot<T: DeserializeOwned>(metric: Metric, payload: &SlotPayload) -> Result<T> {
    match payload {
        SlotPayload::Ready(content) => {
            serde_json::from_str(content).map_err(|e| MonitorError::parse_error(metric, e))
        }
        SlotPayload::Failed(cause) => Err(MonitorError::parse_error(
            metric,
            format!("source reported Error: {cause}"),
        )),
        SlotPayload::Empty => Err(MonitorError::parse_error(metric, "no data collected yet")),
    }
}

/// Build the combined record from a consistent copy of every slot.
///
/// Stages run CPU, then memory, then the process table. The first failing
/// stage aborts the whole aggregation.
pub fn combine<Tz>(slots: &SlotSet, now: DateTime<Tz>) -> Result<CombinedSnapshot>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let cpu: CpuReading = parse_slot(Metric::Cpu, &slots.cpu)?;
    let memory: MemoryReading = parse_slot(Metric::Memory, &slots.memory)?;
    let processes: ProcessTableReading = parse_slot(Metric::ProcessTable, &slots.process_table)?;

    Ok(CombinedSnapshot::from_readings(
        &cpu,
        &memory,
        &processes,
        now.format(TIMESTAMP_FORMAT).to_string(),
    ))
}

/// Aggregate and encode as JSON, stamped with the local wall clock.
pub fn combine_to_json(slots: &SlotSet) -> Result<String> {
    let snapshot = combine(slots, Local::now())?;
    Ok(serde_json::to_string(&snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const CPU: &str = r#"{"porcentajeUso": 42.5}"#;
    const RAM: &str = r#"{"total":1000,"libre":400,"uso":600,"porcentajeUso":60.0}"#;
    const PROCS: &str = r#"{"procesos_corriendo":3,"total_procesos":50,"procesos_durmiendo":40,"procesos_zombie":1,"procesos_parados":6}"#;

    fn ready_slots() -> SlotSet {
        SlotSet {
            cpu: SlotPayload::Ready(CPU.into()),
            memory: SlotPayload::Ready(RAM.into()),
            process_table: SlotPayload::Ready(PROCS.into()),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_combine_all_ready() {
        let snapshot = combine(&ready_slots(), fixed_time()).unwrap();

        assert_eq!(snapshot.total_ram, 1000);
        assert_eq!(snapshot.ram_libre, 400);
        assert_eq!(snapshot.uso_ram, 600);
        assert_eq!(snapshot.porcentaje_ram, 60.0);
        assert_eq!(snapshot.porcentaje_cpu_uso, 42.5);
        assert_eq!(snapshot.porcentaje_cpu_libre, 57.5);
        assert_eq!(snapshot.procesos_corriendo, 3);
        assert_eq!(snapshot.total_procesos, 50);
        assert_eq!(snapshot.procesos_durmiendo, 40);
        assert_eq!(snapshot.procesos_zombie, 1);
        assert_eq!(snapshot.procesos_parados, 6);
        assert_eq!(snapshot.hora, "2024-03-01 09:05:07");
    }

    #[test]
    fn test_idle_identity_holds() {
        for usage in [0.0, 12.25, 99.9, 100.0, 150.0] {
            let mut slots = ready_slots();
            slots.cpu = SlotPayload::Ready(format!(r#"{{"porcentajeUso": {usage}}}"#));
            let snapshot = combine(&slots, fixed_time()).unwrap();
            assert_eq!(snapshot.porcentaje_cpu_libre, 100.0 - snapshot.porcentaje_cpu_uso);
        }
    }

    #[test]
    fn test_failed_cpu_slot_fails_cpu_stage() {
        let mut slots = ready_slots();
        slots.cpu = SlotPayload::Failed("No such file or directory".into());

        match combine(&slots, fixed_time()) {
            Err(MonitorError::Parse { metric, reason }) => {
                assert_eq!(metric, Metric::Cpu);
                assert!(reason.contains("No such file or directory"));
            }
            other => panic!("expected CPU parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_memory_fails_memory_stage() {
        let mut slots = ready_slots();
        slots.memory = SlotPayload::Ready("not json".into());

        let err = combine(&slots, fixed_time()).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse RAM data"));
    }

    #[test]
    fn test_empty_process_slot_fails_process_stage() {
        let mut slots = ready_slots();
        slots.process_table = SlotPayload::Empty;

        let err = combine(&slots, fixed_time()).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Parse { metric: Metric::ProcessTable, .. }
        ));
    }

    #[test]
    fn test_first_failing_stage_wins() {
        let slots = SlotSet {
            cpu: SlotPayload::Ready(CPU.into()),
            memory: SlotPayload::Failed("gone".into()),
            process_table: SlotPayload::Failed("gone".into()),
        };

        let err = combine(&slots, fixed_time()).unwrap_err();
        assert!(matches!(err, MonitorError::Parse { metric: Metric::Memory, .. }));
    }

    #[test]
    fn test_lenient_payloads_still_aggregate() {
        let slots = SlotSet {
            cpu: SlotPayload::Ready(CPU.into()),
            memory: SlotPayload::Ready(r#"{"total":1000,"libre":null,"uso":600,"porcentajeUso":60.0}"#.into()),
            process_table: SlotPayload::Ready(r#"{"procesos_corriendo":-1,"total_procesos":50}"#.into()),
        };

        let snapshot = combine(&slots, fixed_time()).unwrap();
        assert_eq!(snapshot.ram_libre, 0);
        assert_eq!(snapshot.procesos_corriendo, -1);
        assert_eq!(snapshot.total_procesos, 50);
    }

    #[test]
    fn test_out_of_range_counter_fails_its_stage() {
        let mut slots = ready_slots();
        slots.memory = SlotPayload::Ready(r#"{"uso":18446744073709551615}"#.into());

        let err = combine(&slots, fixed_time()).unwrap_err();
        assert!(matches!(err, MonitorError::Parse { metric: Metric::Memory, .. }));
    }

    #[test]
    fn test_combine_to_json() {
        let json = combine_to_json(&ready_slots()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_ram"], 1000);
        assert_eq!(value["porcentaje_cpu_libre"], 57.5);
        assert_eq!(value["hora"].as_str().unwrap().len(), 19);
    }
}
