//! dataset/mod.rs
//! Training-directory glue around the container.
//!
//! Layout of a training directory (defaults):
//!
//! ```text
//! training/
//!  ├── frame_001.jpg
//!  ├── landmarks_001.txt      21 lines of `index,x,y,z`
//!  ├── frame_002.jpg
//!  └── landmarks_002.txt
//! ```

pub mod scan;
pub mod landmarks;
pub mod assemble;
pub mod verify;

pub use scan::{image_pattern, scan_samples, Sample};
pub use landmarks::{parse_landmarks, read_landmarks, LandmarkError};
pub use assemble::{build_container, load_sample, AssemblyReport, SkipReason, SkippedSample};
pub use verify::{verify_container, RecordPreview, VerifyReport};
