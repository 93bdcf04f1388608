//! landmark-core
//!
//! Framed, checksummed record container for hand-landmark training data.
//! No Python, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Format layers
pub mod payload;
pub mod container;
pub mod telemetry;

// Dataset assembly and verification
pub mod dataset;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{DatasetConfig, ReaderConfig};
    pub use crate::container::{
        ContainerFile, InputSource, OutputSink, ReadError, RecordError, RecordReader, RecordWriter,
        WriteError,
    };
    pub use crate::dataset::{build_container, verify_container, AssemblyReport, VerifyReport};
    pub use crate::payload::{DecodeError, LandmarkRecord, Landmarks};
    pub use crate::types::DatasetError;
}
