use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// Frozen view of one writer or reader run.
///
/// Counters are flattened into the serialized form, so a JSON report reads
/// `{ "frames_written": .., "elapsed": .., "stages": {..} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(flatten)]
    pub counters: TelemetryCounters,
    pub elapsed: Duration,
    /// Payload bytes per second of wall time; zero for an instant run.
    pub payload_throughput: f64,
    pub stages: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let secs = elapsed.as_secs_f64();
        let payload_throughput = if secs > 0.0 {
            counters.bytes_payload as f64 / secs
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            elapsed,
            payload_throughput,
            stages: timer.stages.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stages.total()
    }

    /// Payload plus framing bytes that passed through the run.
    pub fn total_bytes(&self) -> u64 {
        self.counters.bytes_payload + self.counters.bytes_overhead
    }

    /// Stage time fits inside wall time, and no run processed more records
    /// than it saw frames.
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        self.total_stage_time() <= self.elapsed
            && c.records_processed <= c.frames_written.max(c.frames_read)
    }
}
