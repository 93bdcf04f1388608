//! container/mod.rs
//! Framed, checksummed record container.
//!
//! Wire layout, repeated until end of file (little-endian):
//!
//! ```text
//! [ length (u64) ]
//! [ masked_crc32c(length bytes) (u32) ]
//! [ payload (length bytes) ]
//! [ masked_crc32c(payload) (u32) ]
//! ```
//!
//! No file header, no footer, no index. Payloads are opaque at this layer.
//!
//! Notes:
//! - A bad payload checksum leaves the next frame boundary known; readers
//!   report it and continue.
//! - A bad length checksum, a short read or an oversized length ends the
//!   scan: the next boundary can no longer be trusted.

pub mod types;
pub mod encode;
pub mod decode;
pub mod io;
pub mod writer;
pub mod reader;

pub use types::*;
pub use encode::*;
pub use decode::{decode_frame, decode_frames, parse_frame_header, FrameSlices};
pub use io::{InputSource, OutputSink, SharedBuffer, SharedBufferWriter};
pub use writer::RecordWriter;
pub use reader::{ContainerFile, RecordReader, Records};
