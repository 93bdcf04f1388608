//! Sequential, append-only container writer.

use std::path::Path;
use std::time::Instant;

use log::{debug, error, warn};

use crate::container::encode::{encode_frame_footer, encode_frame_header};
use crate::container::io::{open_output, OutputSink, SinkHandle};
use crate::container::types::{WriteError, FRAME_OVERHEAD};
use crate::payload::LandmarkRecord;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

/// Appends framed, checksummed payloads to a sink.
///
/// Single owner, single thread. The sink is flushed on `close` and, as a
/// fallback, on drop.
pub struct RecordWriter {
    sink: Option<SinkHandle>,
    poisoned: bool,
    bytes_written: u64,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl RecordWriter {
    /// Create (or truncate) a container file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, WriteError> {
        Self::new(OutputSink::File(path.as_ref().to_path_buf()))
    }

    pub fn new(sink: OutputSink) -> Result<Self, WriteError> {
        let sink = open_output(sink)?;
        Ok(Self {
            sink: Some(sink),
            poisoned: false,
            bytes_written: 0,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        })
    }

    /// Append one payload as a frame.
    ///
    /// Any I/O failure poisons the writer: the frame may be partially on
    /// disk and later appends would extend a corrupt container.
    pub fn append(&mut self, payload: &[u8]) -> Result<(), WriteError> {
        if self.poisoned {
            return Err(WriteError::Poisoned);
        }
        let Some(sink) = self.sink.as_mut() else {
            return Err(WriteError::Closed);
        };

        let t = Instant::now();
        let header = encode_frame_header(payload.len() as u64);
        let footer = encode_frame_footer(payload);
        self.timer.add_stage_time(Stage::Encode, t.elapsed());

        let t = Instant::now();
        let res = sink
            .write_all(&header)
            .and_then(|_| sink.write_all(payload))
            .and_then(|_| sink.write_all(&footer));
        self.timer.add_stage_time(Stage::Write, t.elapsed());

        if let Err(e) = res {
            self.poisoned = true;
            error!(
                "append failed after {} frames ({} bytes): {}",
                self.counters.frames_written, self.bytes_written, e
            );
            return Err(WriteError::IoFailure(e));
        }

        let frame_len = (payload.len() + FRAME_OVERHEAD) as u64;
        debug!(
            "frame {} appended at offset {} ({} payload bytes)",
            self.counters.frames_written, self.bytes_written, payload.len()
        );
        self.bytes_written += frame_len;
        self.counters.add_written_frame(payload.len(), FRAME_OVERHEAD);
        Ok(())
    }

    /// Encode a record and append it.
    pub fn append_record(&mut self, record: &LandmarkRecord) -> Result<(), WriteError> {
        let payload = self.timer.time(Stage::Encode, || record.encode());
        self.append(&payload)
    }

    /// Flush, sync and release the sink. Idempotent.
    ///
    /// A poisoned writer still releases its sink, so frames appended before
    /// the failure stay readable, but close reports `Poisoned` because the
    /// tail may hold a partial frame.
    pub fn close(&mut self) -> Result<(), WriteError> {
        let Some(mut sink) = self.sink.take() else {
            return if self.poisoned { Err(WriteError::Poisoned) } else { Ok(()) };
        };

        if self.poisoned {
            self.timer.finish();
            if let Err(e) = sink.flush() {
                warn!("flushing poisoned container failed: {}", e);
            }
            return Err(WriteError::Poisoned);
        }

        let t = Instant::now();
        let res = sink.sync();
        self.timer.add_stage_time(Stage::Write, t.elapsed());
        self.timer.finish();

        res.map_err(|e| {
            self.poisoned = true;
            WriteError::IoFailure(e)
        })?;

        debug!(
            "container closed: {} frames, {} bytes",
            self.counters.frames_written, self.bytes_written
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn frames_written(&self) -> u64 {
        self.counters.frames_written
    }

    /// Bytes handed to the sink so far (payloads plus framing).
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    pub fn timer(&self) -> &TelemetryTimer {
        &self.timer
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters, &self.timer)
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.flush() {
                warn!("flushing container on drop failed: {}", e);
            }
        }
    }
}
