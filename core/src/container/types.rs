use std::fmt;
use std::io;
use thiserror::Error;

use crate::payload::DecodeError;

/// Bytes of the little-endian `u64` length field.
pub const LENGTH_FIELD_LEN: usize = 8;
/// Bytes of one stored (masked) checksum.
pub const CHECKSUM_LEN: usize = 4;
/// Framing bytes around every payload: length + two checksums.
pub const FRAME_OVERHEAD: usize = LENGTH_FIELD_LEN + CHECKSUM_LEN + CHECKSUM_LEN;

/// Verified frame header.
///
/// Layout (little-endian):
///
/// ```text
/// [ length (8) ]
/// [ masked_crc32c(length bytes) (4) ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u64,
    pub length_crc: u32,
}

impl FrameHeader {
    pub const LEN: usize = LENGTH_FIELD_LEN  // length
        + CHECKSUM_LEN;                      // length checksum

    /// Total encoded size of the frame this header opens.
    #[inline]
    pub fn frame_len(&self) -> u64 {
        self.length.saturating_add(FRAME_OVERHEAD as u64)
    }
}

/// Borrowed, verified frame inside an in-memory buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
    pub payload_crc: u32,
}

impl<'a> FrameView<'a> {
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }
}

/// Checksummed span of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameField {
    Length,
    Payload,
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameField::Length => f.write_str("length"),
            FrameField::Payload => f.write_str("payload"),
        }
    }
}

/// Framing failures while reading a container.
///
/// Offsets are the byte position where the affected frame starts.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("checksum mismatch in {field} of frame at offset {offset}: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        field: FrameField,
        offset: u64,
        stored: u32,
        computed: u32,
    },

    #[error("truncated frame at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("frame at offset {offset} declares {length} payload bytes, limit is {limit}")]
    PayloadTooLarge { offset: u64, length: u64, limit: u64 },

    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    /// Whether the reader can no longer locate the next frame boundary.
    ///
    /// Only a payload checksum mismatch leaves the boundary intact: the
    /// length was verified, so the frame's extent is known.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ReadError::ChecksumMismatch { field: FrameField::Payload, .. }
        )
    }

    pub fn offset(&self) -> u64 {
        match self {
            ReadError::ChecksumMismatch { offset, .. }
            | ReadError::Truncated { offset, .. }
            | ReadError::PayloadTooLarge { offset, .. }
            | ReadError::Io { offset, .. } => *offset,
        }
    }

    pub(crate) fn io(offset: u64, source: io::Error) -> Self {
        ReadError::Io { offset, source }
    }
}

/// Failures while appending to a container.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Underlying storage failed; a partial frame may have been written.
    #[error("I/O failure while writing container: {0}")]
    IoFailure(#[from] io::Error),

    #[error("writer is closed")]
    Closed,

    /// An earlier `IoFailure` left the container in an unknown state.
    #[error("writer is poisoned by an earlier I/O failure; the container must be re-created")]
    Poisoned,
}

/// One step of record iteration: the frame or its payload failed.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Frame(#[from] ReadError),

    #[error("undecodable record in frame at offset {offset}: {source}")]
    Payload {
        offset: u64,
        #[source]
        source: DecodeError,
    },
}

impl RecordError {
    /// Same contract as [`ReadError::is_terminal`]; payload errors never are.
    pub fn is_terminal(&self) -> bool {
        match self {
            RecordError::Frame(e) => e.is_terminal(),
            RecordError::Payload { .. } => false,
        }
    }
}
