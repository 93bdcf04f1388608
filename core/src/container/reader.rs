//! Lazy, validating container reader.

use std::io::Read;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use log::{debug, warn};

use crate::config::ReaderConfig;
use crate::container::decode::{check_header, check_payload};
use crate::container::io::{open_input, read_exact_or_eof, InputSource};
use crate::container::types::{
    FrameHeader, ReadError, RecordError, CHECKSUM_LEN, FRAME_OVERHEAD,
};
use crate::payload::{decode_record, LandmarkRecord};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Open,
    /// End of data or a terminal error; no more frames will be produced.
    Exhausted,
}

/// Forward-only sequence of verified payloads.
///
/// To restart, open a new reader over the same source (see
/// [`ContainerFile`]).
pub struct RecordReader {
    inner: Box<dyn Read + Send>,
    config: ReaderConfig,
    offset: u64,
    state: ReaderState,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl RecordReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::new(InputSource::File(path.as_ref().to_path_buf()))
    }

    pub fn new(src: InputSource) -> Result<Self, ReadError> {
        Self::with_config(src, ReaderConfig::default())
    }

    pub fn with_config(src: InputSource, config: ReaderConfig) -> Result<Self, ReadError> {
        let inner = open_input(src).map_err(|e| ReadError::io(0, e))?;
        Ok(Self {
            inner,
            config,
            offset: 0,
            state: ReaderState::Open,
            counters: TelemetryCounters::default(),
            timer: TelemetryTimer::new(),
        })
    }

    /// Read and verify the next frame.
    ///
    /// - `Ok(None)`: clean end of data at a frame boundary, or the reader is
    ///   exhausted after a terminal error.
    /// - `Err(ChecksumMismatch { field: Payload, .. })`: the frame was
    ///   consumed; the next call reads the following frame.
    /// - Any other error is terminal.
    pub fn read_next(&mut self) -> Result<Option<Bytes>, ReadError> {
        if self.state == ReaderState::Exhausted {
            return Ok(None);
        }

        let res = self.read_frame();
        match &res {
            Ok(None) => {
                self.state = ReaderState::Exhausted;
                self.timer.finish();
            }
            Err(e) if e.is_terminal() => {
                warn!("container unreadable past offset {}: {}", e.offset(), e);
                self.state = ReaderState::Exhausted;
                self.timer.finish();
            }
            Err(e) => warn!("skipping corrupt frame: {}", e),
            Ok(Some(_)) => {}
        }
        res
    }

    fn read_frame(&mut self) -> Result<Option<Bytes>, ReadError> {
        let start = self.offset;

        // ---- Header ----
        let mut raw = [0u8; FrameHeader::LEN];
        let n = self
            .timer
            .time(Stage::Read, || read_exact_or_eof(&mut self.inner, &mut raw))
            .map_err(|e| ReadError::io(start, e))?;
        if n == 0 {
            return Ok(None);
        }
        self.offset += n as u64;
        if n < FrameHeader::LEN {
            self.counters.add_truncation();
            return Err(ReadError::Truncated {
                offset: start,
                needed: FrameHeader::LEN as u64,
                available: n as u64,
            });
        }

        let header = self
            .timer
            .time(Stage::Validate, || check_header(&raw, start))
            .map_err(|e| {
                self.counters.add_checksum_failure();
                e
            })?;

        if header.length > self.config.max_payload_len {
            return Err(ReadError::PayloadTooLarge {
                offset: start,
                length: header.length,
                limit: self.config.max_payload_len,
            });
        }

        // ---- Payload + trailer ----
        // `take` + `read_to_end` grows the buffer with the data actually
        // present, so a truncated file never forces a full-length allocation.
        let Some(body_len) = header.length.checked_add(CHECKSUM_LEN as u64) else {
            return Err(ReadError::PayloadTooLarge {
                offset: start,
                length: header.length,
                limit: self.config.max_payload_len,
            });
        };
        let mut body = Vec::new();
        let got = self
            .timer
            .time(Stage::Read, || (&mut self.inner).take(body_len).read_to_end(&mut body))
            .map_err(|e| ReadError::io(start, e))?;
        self.offset += got as u64;
        if (got as u64) < body_len {
            self.counters.add_truncation();
            return Err(ReadError::Truncated {
                offset: start,
                needed: header.frame_len(),
                available: (FrameHeader::LEN + got) as u64,
            });
        }

        let length = header.length as usize;
        let stored = LittleEndian::read_u32(&body[length..]);
        self.timer
            .time(Stage::Validate, || check_payload(&body[..length], stored, start))
            .map_err(|e| {
                self.counters.add_checksum_failure();
                e
            })?;

        body.truncate(length);
        self.counters.add_read_frame(length, FRAME_OVERHEAD);
        debug!("frame at offset {} verified ({} payload bytes)", start, length);
        Ok(Some(Bytes::from(body)))
    }

    /// Byte offset of the next frame.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ReaderState::Exhausted
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

    /// Decode every payload as a [`LandmarkRecord`].
    pub fn records(self) -> Records {
        Records { frames: self }
    }
}

impl Iterator for RecordReader {
    type Item = Result<Bytes, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Record-level view over a [`RecordReader`].
pub struct Records {
    frames: RecordReader,
}

impl Records {
    pub fn reader(&self) -> &RecordReader {
        &self.frames
    }

    pub fn into_reader(self) -> RecordReader {
        self.frames
    }
}

impl Iterator for Records {
    type Item = Result<LandmarkRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.frames.offset();
        match self.frames.read_next() {
            Ok(Some(payload)) => {
                let decoded = self.frames.timer.time(Stage::Decode, || decode_record(&payload));
                Some(decoded.map_err(|source| RecordError::Payload { offset, source }))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Restartable handle on a container file.
///
/// Every call to [`frames`](Self::frames) or [`records`](Self::records)
/// starts a fresh pass from the first frame.
#[derive(Debug, Clone)]
pub struct ContainerFile {
    path: PathBuf,
    config: ReaderConfig,
}

impl ContainerFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::with_config(path, ReaderConfig::default())
    }

    pub fn with_config(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self, ReadError> {
        let path = path.as_ref().to_path_buf();
        std::fs::metadata(&path).map_err(|e| ReadError::io(0, e))?;
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames(&self) -> Result<RecordReader, ReadError> {
        RecordReader::with_config(InputSource::File(self.path.clone()), self.config.clone())
    }

    pub fn records(&self) -> Result<Records, ReadError> {
        Ok(self.frames()?.records())
    }

    /// Number of frames, by exhausting one pass. Fails on the first error.
    pub fn count(&self) -> Result<usize, ReadError> {
        let mut n = 0;
        for frame in self.frames()? {
            frame?;
            n += 1;
        }
        Ok(n)
    }
}
