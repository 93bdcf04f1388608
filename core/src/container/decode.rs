use byteorder::{ByteOrder, LittleEndian};

use crate::container::types::{
    FrameField, FrameHeader, FrameView, ReadError, CHECKSUM_LEN, FRAME_OVERHEAD, LENGTH_FIELD_LEN,
};
use crate::utils::masked_crc32c;

/// Verify a raw header that starts at `offset` in its container.
#[inline]
pub(crate) fn check_header(buf: &[u8; FrameHeader::LEN], offset: u64) -> Result<FrameHeader, ReadError> {
    let length_bytes = &buf[..LENGTH_FIELD_LEN];
    let stored = LittleEndian::read_u32(&buf[LENGTH_FIELD_LEN..]);
    let computed = masked_crc32c(length_bytes);

    if stored != computed {
        return Err(ReadError::ChecksumMismatch {
            field: FrameField::Length,
            offset,
            stored,
            computed,
        });
    }

    Ok(FrameHeader {
        length: LittleEndian::read_u64(length_bytes),
        length_crc: stored,
    })
}

/// Verify a payload against the checksum stored after it.
#[inline]
pub(crate) fn check_payload(payload: &[u8], stored: u32, offset: u64) -> Result<(), ReadError> {
    let computed = masked_crc32c(payload);
    if stored != computed {
        return Err(ReadError::ChecksumMismatch {
            field: FrameField::Payload,
            offset,
            stored,
            computed,
        });
    }
    Ok(())
}

/// Parse and verify the header at the start of `wire`.
#[inline]
pub fn parse_frame_header(wire: &[u8]) -> Result<FrameHeader, ReadError> {
    if wire.len() < FrameHeader::LEN {
        return Err(ReadError::Truncated {
            offset: 0,
            needed: FrameHeader::LEN as u64,
            available: wire.len() as u64,
        });
    }
    let mut raw = [0u8; FrameHeader::LEN];
    raw.copy_from_slice(&wire[..FrameHeader::LEN]);
    check_header(&raw, 0)
}

/// Decode and verify the first frame in `wire`.
///
/// `wire` may hold more bytes after the frame; advance by
/// [`FrameView::encoded_len`] to reach the next one. The payload is
/// borrowed, not copied.
pub fn decode_frame(wire: &[u8]) -> Result<FrameView<'_>, ReadError> {
    decode_frame_at(wire, 0)
}

fn decode_frame_at(wire: &[u8], offset: u64) -> Result<FrameView<'_>, ReadError> {
    let header = parse_frame_header(wire).map_err(|e| rebase(e, offset))?;

    let needed = header.frame_len();
    if (wire.len() as u64) < needed {
        return Err(ReadError::Truncated {
            offset,
            needed,
            available: wire.len() as u64,
        });
    }

    let end = FrameHeader::LEN + header.length as usize;
    let payload = &wire[FrameHeader::LEN..end];
    let stored = LittleEndian::read_u32(&wire[end..end + CHECKSUM_LEN]);
    check_payload(payload, stored, offset)?;

    Ok(FrameView {
        header,
        payload,
        payload_crc: stored,
    })
}

fn rebase(err: ReadError, base: u64) -> ReadError {
    match err {
        ReadError::ChecksumMismatch { field, offset, stored, computed } => ReadError::ChecksumMismatch {
            field,
            offset: offset + base,
            stored,
            computed,
        },
        ReadError::Truncated { offset, needed, available } => ReadError::Truncated {
            offset: offset + base,
            needed,
            available,
        },
        other => other,
    }
}

/// Zero-copy iterator over every frame of an in-memory container.
///
/// Stops after the first error that hides the next frame boundary.
#[derive(Debug, Clone)]
pub struct FrameSlices<'a> {
    wire: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Iterator for FrameSlices<'a> {
    type Item = Result<FrameView<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.wire.len() {
            return None;
        }

        let rest = &self.wire[self.pos..];
        let offset = self.pos as u64;
        match decode_frame_at(rest, offset) {
            Ok(view) => {
                self.pos += view.encoded_len();
                Some(Ok(view))
            }
            Err(e) => {
                if e.is_terminal() {
                    self.done = true;
                } else {
                    // Length verified: skip the whole frame.
                    let length = LittleEndian::read_u64(&rest[..LENGTH_FIELD_LEN]) as usize;
                    self.pos += length + FRAME_OVERHEAD;
                }
                Some(Err(e))
            }
        }
    }
}

/// Iterate the frames of a container held in memory.
pub fn decode_frames(wire: &[u8]) -> FrameSlices<'_> {
    FrameSlices {
        wire,
        pos: 0,
        done: false,
    }
}
