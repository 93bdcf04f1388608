//! Pair image files with their landmark files.

use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::config::DatasetConfig;
use crate::types::DatasetError;

/// One image and the landmark file it should pair with.
///
/// The landmark file is derived from the image name and may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Image file name without extension; stored as the record filename.
    pub stem: String,
    pub image_path: PathBuf,
    pub landmark_path: PathBuf,
}

/// `^{image_prefix}(.+)\.{image_extension}$`, with both parts escaped.
pub fn image_pattern(cfg: &DatasetConfig) -> Result<Regex, DatasetError> {
    let pattern = format!(
        "^{}(.+)\\.{}$",
        regex::escape(&cfg.image_prefix),
        regex::escape(&cfg.image_extension)
    );
    Regex::new(&pattern).map_err(|e| DatasetError::Config(format!("image pattern: {}", e)))
}

/// List the samples directly inside `dir`, sorted by image file name.
pub fn scan_samples(dir: impl AsRef<Path>, cfg: &DatasetConfig) -> Result<Vec<Sample>, DatasetError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DatasetError::MissingDirectory(dir.to_path_buf()));
    }
    let re = image_pattern(cfg)?;

    let mut samples = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in entries {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(caps) = re.captures(name) else {
            continue;
        };

        let id = &caps[1];
        let stem = format!("{}{}", cfg.image_prefix, id);
        let landmark_name = format!("{}{}.{}", cfg.landmark_prefix, id, cfg.landmark_extension);
        samples.push(Sample {
            stem,
            image_path: entry.path().to_path_buf(),
            landmark_path: dir.join(landmark_name),
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_escapes_dots_and_prefix() {
        let cfg = DatasetConfig::default();
        let re = image_pattern(&cfg).unwrap();
        assert!(re.is_match("frame_001.jpg"));
        assert!(!re.is_match("frame_001xjpg"));
        assert!(!re.is_match("frame_.jpg"));
        assert!(!re.is_match("xframe_001.jpg"));
        assert!(!re.is_match("frame_001.jpg.bak"));
    }
}
