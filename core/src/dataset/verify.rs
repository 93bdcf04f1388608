//! Read a container back and report what it holds.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::config::DatasetConfig;
use crate::container::{ContainerFile, RecordError};
use crate::telemetry::{TelemetryCounters, TelemetrySnapshot};
use crate::types::DatasetError;

/// Summary of one record, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPreview {
    pub offset: u64,
    pub filename: String,
    pub image_len: usize,
    pub landmark_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub path: PathBuf,
    pub valid: usize,
    /// Frames whose checksums held but whose payload did not decode.
    pub decode_failures: usize,
    /// Frames skipped for a payload checksum mismatch.
    pub checksum_failures: usize,
    /// Error that ended the scan early, if any.
    pub terminal_error: Option<String>,
    pub terminal_offset: Option<u64>,
    pub preview: Vec<RecordPreview>,
    pub telemetry: TelemetrySnapshot,
}

impl VerifyReport {
    pub fn frames_seen(&self) -> usize {
        self.valid + self.decode_failures + self.checksum_failures
    }

    pub fn is_clean(&self) -> bool {
        self.decode_failures == 0 && self.checksum_failures == 0 && self.terminal_error.is_none()
    }
}

/// Scan the whole container once, decoding every record.
///
/// Per-record failures are counted and the scan continues; a terminal
/// framing error is recorded and ends it. Only an invalid config or failure
/// to open the file is returned as `Err`.
pub fn verify_container(path: impl AsRef<Path>, cfg: &DatasetConfig) -> Result<VerifyReport, DatasetError> {
    cfg.validate()?;
    let path = path.as_ref();
    let file = ContainerFile::with_config(path, cfg.reader_config())?;
    let mut records = file.records()?;

    let mut valid = 0usize;
    let mut decode_failures = 0usize;
    let mut checksum_failures = 0usize;
    let mut terminal: Option<(String, u64)> = None;
    let mut preview = Vec::new();
    let mut tally = TelemetryCounters::default();

    loop {
        let offset = records.reader().offset();
        let Some(item) = records.next() else {
            break;
        };
        match item {
            Ok(record) => {
                valid += 1;
                tally.add_processed();
                if preview.len() < cfg.preview_count {
                    preview.push(RecordPreview {
                        offset,
                        filename: record.filename,
                        image_len: record.image.len(),
                        landmark_count: record.landmarks.as_slice().len(),
                    });
                }
            }
            Err(RecordError::Payload { source, .. }) => {
                warn!("undecodable record at offset {}: {}", offset, source);
                decode_failures += 1;
                tally.add_skipped();
            }
            Err(RecordError::Frame(e)) if !e.is_terminal() => {
                checksum_failures += 1;
                tally.add_skipped();
            }
            Err(RecordError::Frame(e)) => {
                terminal = Some((e.to_string(), e.offset()));
                break;
            }
        }
    }

    let reader = records.into_reader();
    let mut counters = reader.counters().clone();
    counters.merge(&tally);
    let telemetry = TelemetrySnapshot::from(&counters, reader.timer());

    info!(
        "verified {}: {} valid, {} undecodable, {} corrupt{}",
        path.display(),
        valid,
        decode_failures,
        checksum_failures,
        if terminal.is_some() { ", scan ended early" } else { "" }
    );

    let (terminal_error, terminal_offset) = match terminal {
        Some((msg, off)) => (Some(msg), Some(off)),
        None => (None, None),
    };

    Ok(VerifyReport {
        path: path.to_path_buf(),
        valid,
        decode_failures,
        checksum_failures,
        terminal_error,
        terminal_offset,
        preview,
        telemetry,
    })
}
