use byteorder::{ByteOrder, LittleEndian};

use crate::container::types::{FrameHeader, CHECKSUM_LEN, FRAME_OVERHEAD, LENGTH_FIELD_LEN};
use crate::utils::masked_crc32c;

/// Encode the 12-byte header for a payload of `length` bytes.
///
/// Layout:
///
/// ```text
/// [ length (8, LE) ]
/// [ masked_crc32c(length bytes) (4, LE) ]
/// ```
#[inline]
pub fn encode_frame_header(length: u64) -> [u8; FrameHeader::LEN] {
    let mut out = [0u8; FrameHeader::LEN];
    LittleEndian::write_u64(&mut out[..LENGTH_FIELD_LEN], length);
    let crc = masked_crc32c(&out[..LENGTH_FIELD_LEN]);
    LittleEndian::write_u32(&mut out[LENGTH_FIELD_LEN..], crc);
    out
}

/// Encode the 4-byte trailer (masked CRC32C of the payload).
#[inline]
pub fn encode_frame_footer(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut out = [0u8; CHECKSUM_LEN];
    LittleEndian::write_u32(&mut out, masked_crc32c(payload));
    out
}

/// Append one complete frame to `out`.
pub fn encode_frame_into(out: &mut Vec<u8>, payload: &[u8]) {
    out.reserve(payload.len() + FRAME_OVERHEAD);
    out.extend_from_slice(&encode_frame_header(payload.len() as u64));
    out.extend_from_slice(payload);
    out.extend_from_slice(&encode_frame_footer(payload));
}

/// Encode one complete frame into canonical wire format.
///
/// Layout:
///
/// ```text
/// [ length (8) ]
/// [ length checksum (4) ]
/// [ payload (length) ]
/// [ payload checksum (4) ]
/// ```
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
    encode_frame_into(&mut out, payload);
    out
}
