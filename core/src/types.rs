use std::io;
use std::path::PathBuf;

use crate::{
    container::{ReadError, RecordError, WriteError},
    dataset::LandmarkError,
    payload::DecodeError,
};

/// Unified dataset error covering I/O, container, payload, landmark text and
/// configuration failures.
/// - `From<T>` impls enable `?` across the layers.
/// - Messages carry the failing path or offset where one is known.
#[derive(Debug)]
pub enum DatasetError {
    /// Filesystem error outside the container (scan, image, landmark file).
    Io(io::Error),

    /// Container framing failure while reading.
    Read(ReadError),

    /// Container write failure; the output must be re-created.
    Write(WriteError),

    /// Payload did not decode as a record.
    Decode(DecodeError),

    /// Landmark text file did not parse.
    Landmarks(LandmarkError),

    /// Invalid configuration value or file.
    Config(String),

    /// Training directory does not exist.
    MissingDirectory(PathBuf),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "I/O error: {}", e),
            DatasetError::Read(e) => write!(f, "container read error: {}", e),
            DatasetError::Write(e) => write!(f, "container write error: {}", e),
            DatasetError::Decode(e) => write!(f, "record decode error: {}", e),
            DatasetError::Landmarks(e) => write!(f, "landmark error: {}", e),
            DatasetError::Config(msg) => write!(f, "config error: {}", msg),
            DatasetError::MissingDirectory(p) => write!(f, "directory not found: {}", p.display()),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(e) => Some(e),
            DatasetError::Read(e) => Some(e),
            DatasetError::Write(e) => Some(e),
            DatasetError::Decode(e) => Some(e),
            DatasetError::Landmarks(e) => Some(e),
            DatasetError::Config(_) | DatasetError::MissingDirectory(_) => None,
        }
    }
}

impl From<io::Error> for DatasetError {
    fn from(e: io::Error) -> Self {
        DatasetError::Io(e)
    }
}

impl From<ReadError> for DatasetError {
    fn from(e: ReadError) -> Self {
        DatasetError::Read(e)
    }
}

impl From<WriteError> for DatasetError {
    fn from(e: WriteError) -> Self {
        DatasetError::Write(e)
    }
}

impl From<DecodeError> for DatasetError {
    fn from(e: DecodeError) -> Self {
        DatasetError::Decode(e)
    }
}

impl From<LandmarkError> for DatasetError {
    fn from(e: LandmarkError) -> Self {
        DatasetError::Landmarks(e)
    }
}

impl From<RecordError> for DatasetError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Frame(e) => DatasetError::Read(e),
            RecordError::Payload { source, .. } => DatasetError::Decode(source),
        }
    }
}
