//! config.rs
//! Run configuration for dataset assembly, verification and reading.
//!
//! Every field has a default, so a JSON file only needs the keys it
//! overrides:
//!
//! ```json
//! { "image_extension": "png", "preview_count": 10 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{layout, DEFAULT_MAX_PAYLOAD_LEN};
use crate::container::FRAME_OVERHEAD;
use crate::types::DatasetError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub image_prefix: String,
    pub image_extension: String,
    pub landmark_prefix: String,
    pub landmark_extension: String,
    /// Log a progress line every N samples during assembly.
    pub progress_every: usize,
    /// Records kept in a verification preview.
    pub preview_count: usize,
    /// Frames declaring a longer payload are rejected by the reader.
    pub max_payload_len: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            image_prefix: layout::IMAGE_PREFIX.to_string(),
            image_extension: layout::IMAGE_EXTENSION.to_string(),
            landmark_prefix: layout::LANDMARK_PREFIX.to_string(),
            landmark_extension: layout::LANDMARK_EXTENSION.to_string(),
            progress_every: layout::PROGRESS_EVERY,
            preview_count: layout::PREVIEW_COUNT,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

impl DatasetConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| DatasetError::Config(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        let names = [
            ("image_prefix", &self.image_prefix),
            ("image_extension", &self.image_extension),
            ("landmark_prefix", &self.landmark_prefix),
            ("landmark_extension", &self.landmark_extension),
        ];
        for (key, value) in names {
            if value.is_empty() {
                return Err(DatasetError::Config(format!("{} must not be empty", key)));
            }
        }
        if self.progress_every == 0 {
            return Err(DatasetError::Config("progress_every must be at least 1".into()));
        }
        if self.max_payload_len == 0 {
            return Err(DatasetError::Config("max_payload_len must be at least 1".into()));
        }
        if self.max_payload_len > MAX_PAYLOAD_LEN_CAP {
            return Err(DatasetError::Config(format!(
                "max_payload_len must not exceed {}",
                MAX_PAYLOAD_LEN_CAP
            )));
        }
        Ok(())
    }

    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            max_payload_len: self.max_payload_len,
        }
    }
}

/// Largest payload a frame can carry and still fit in memory with its framing.
pub const MAX_PAYLOAD_LEN_CAP: u64 = usize::MAX as u64 - FRAME_OVERHEAD as u64;

/// Limits applied by [`RecordReader`](crate::container::RecordReader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub max_payload_len: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}
