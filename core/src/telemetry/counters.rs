//! telemetry/counters.rs
//! Mutable counters collected while writing or reading a container.
//!
//! Converted into an immutable `TelemetrySnapshot` at the end of a run.

use std::ops::AddAssign;
use serde::{Serialize, Deserialize};

/// Deterministic counters collected during container processing.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub frames_written: u64,
    pub frames_read: u64,
    pub bytes_payload: u64,
    pub bytes_overhead: u64,
    pub checksum_failures: u64,
    pub truncations: u64,
    pub records_processed: u64,
    pub records_skipped: u64,
}

impl TelemetryCounters {
    /// Record one appended frame.
    ///
    /// - `payload_len`: bytes of serialized record
    /// - `frame_overhead_len`: length field + two checksums
    pub fn add_written_frame(&mut self, payload_len: usize, frame_overhead_len: usize) {
        self.frames_written += 1;
        self.bytes_payload += payload_len as u64;
        self.bytes_overhead += frame_overhead_len as u64;
    }

    /// Record one frame whose checksums verified.
    pub fn add_read_frame(&mut self, payload_len: usize, frame_overhead_len: usize) {
        self.frames_read += 1;
        self.bytes_payload += payload_len as u64;
        self.bytes_overhead += frame_overhead_len as u64;
    }

    pub fn add_checksum_failure(&mut self) {
        self.checksum_failures += 1;
    }

    pub fn add_truncation(&mut self) {
        self.truncations += 1;
    }

    pub fn add_processed(&mut self) {
        self.records_processed += 1;
    }

    pub fn add_skipped(&mut self) {
        self.records_skipped += 1;
    }

    pub fn framing_overhead_bytes(&self) -> u64 {
        self.bytes_overhead
    }

    /// Any corruption observed (checksum or truncation).
    pub fn saw_corruption(&self) -> bool {
        self.checksum_failures > 0 || self.truncations > 0
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        *self += other.clone();
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.frames_written    += rhs.frames_written;
        self.frames_read       += rhs.frames_read;
        self.bytes_payload     += rhs.bytes_payload;
        self.bytes_overhead    += rhs.bytes_overhead;
        self.checksum_failures += rhs.checksum_failures;
        self.truncations       += rhs.truncations;
        self.records_processed += rhs.records_processed;
        self.records_skipped   += rhs.records_skipped;
    }
}
