//! Build a container from a training directory.

use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::config::DatasetConfig;
use crate::container::RecordWriter;
use crate::dataset::landmarks::read_landmarks;
use crate::dataset::scan::{scan_samples, Sample};
use crate::payload::LandmarkRecord;
use crate::telemetry::{TelemetryCounters, TelemetrySnapshot};
use crate::types::DatasetError;

/// Why a sample was left out of the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MissingLandmarks,
    InvalidLandmarks(String),
    UnreadableImage(String),
    EmptyImage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingLandmarks => f.write_str("landmark file not found"),
            SkipReason::InvalidLandmarks(e) => write!(f, "invalid landmarks: {}", e),
            SkipReason::UnreadableImage(e) => write!(f, "cannot read image: {}", e),
            SkipReason::EmptyImage => f.write_str("image file is empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSample {
    pub stem: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    /// Images found by the scan.
    pub total: usize,
    /// Records appended to the container.
    pub processed: usize,
    pub skipped: Vec<SkippedSample>,
    pub telemetry: TelemetrySnapshot,
}

/// Load one sample as a record, or say why it cannot be used.
pub fn load_sample(sample: &Sample) -> Result<LandmarkRecord, SkipReason> {
    if !sample.landmark_path.is_file() {
        return Err(SkipReason::MissingLandmarks);
    }
    let landmarks =
        read_landmarks(&sample.landmark_path).map_err(|e| SkipReason::InvalidLandmarks(e.to_string()))?;

    let image = fs::read(&sample.image_path).map_err(|e| SkipReason::UnreadableImage(e.to_string()))?;
    if image.is_empty() {
        return Err(SkipReason::EmptyImage);
    }

    Ok(LandmarkRecord::new(image, landmarks, sample.stem.clone()))
}

/// Pair, encode and append every sample in `dir` to a fresh container at
/// `output`.
///
/// Unusable samples are skipped and reported. Any write failure aborts the
/// run; the partial output should then be discarded.
pub fn build_container(
    dir: impl AsRef<Path>,
    output: impl AsRef<Path>,
    cfg: &DatasetConfig,
) -> Result<AssemblyReport, DatasetError> {
    cfg.validate()?;
    let output = output.as_ref();

    let samples = scan_samples(dir, cfg)?;
    let total = samples.len();
    info!("processing {} samples into {}", total, output.display());

    let mut writer = RecordWriter::create(output)?;
    let mut tally = TelemetryCounters::default();
    let mut skipped = Vec::new();

    for (i, sample) in samples.iter().enumerate() {
        match load_sample(sample) {
            Ok(record) => {
                writer.append_record(&record)?;
                tally.add_processed();
            }
            Err(reason) => {
                warn!("skipping {}: {}", sample.stem, reason);
                tally.add_skipped();
                skipped.push(SkippedSample {
                    stem: sample.stem.clone(),
                    reason,
                });
            }
        }

        let done = i + 1;
        if done % cfg.progress_every == 0 {
            info!("processed: {}/{}", done, total);
        }
    }

    writer.close()?;

    let mut counters = writer.counters().clone();
    counters.merge(&tally);
    let processed = tally.records_processed as usize;
    let telemetry = TelemetrySnapshot::from(&counters, writer.timer());

    info!(
        "container written to {}: {} records, {} skipped",
        output.display(),
        processed,
        skipped.len()
    );

    Ok(AssemblyReport {
        total,
        processed,
        skipped,
        telemetry,
    })
}
