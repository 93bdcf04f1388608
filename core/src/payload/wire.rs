//! payload/wire.rs
//!
//! Protocol-buffer wire primitives: varints, tags, length-delimited and
//! fixed-width values.
//!
//! Design notes:
//! - A tag is the varint `(field << 3) | wire_type`.
//! - Fixed-width values are little-endian.
//! - Group wire types (3, 4) are deprecated in the format and rejected.
//! - Every read is bounds-checked; running off the end is `Truncated`.

use byteorder::{ByteOrder, LittleEndian};
use num_enum::TryFromPrimitive;

use crate::payload::types::DecodeError;

/// Longest legal varint encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum WireType {
    Varint          = 0,
    Fixed64         = 1,
    LengthDelimited = 2,
    StartGroup      = 3,
    EndGroup        = 4,
    Fixed32         = 5,
}

impl WireType {
    pub const fn name(self) -> &'static str {
        match self {
            WireType::Varint          => "varint",
            WireType::Fixed64         => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::StartGroup      => "start-group",
            WireType::EndGroup        => "end-group",
            WireType::Fixed32         => "fixed32",
        }
    }
}

// ================= Writing =================

/// Number of bytes `v` occupies as a varint.
#[inline]
pub const fn varint_len(v: u64) -> usize {
    // 7 payload bits per byte; zero still takes one byte.
    let bits = 64 - (v | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[inline]
pub fn put_varint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

#[inline]
pub fn put_tag(out: &mut Vec<u8>, field: u32, wire_type: WireType) {
    put_varint(out, ((field as u64) << 3) | wire_type as u64);
}

/// Encoded size of a tag for `field` (any wire type).
#[inline]
pub const fn tag_len(field: u32) -> usize {
    varint_len((field as u64) << 3)
}

/// Tag + length prefix + body.
#[inline]
pub fn put_len_delimited(out: &mut Vec<u8>, field: u32, body: &[u8]) {
    put_tag(out, field, WireType::LengthDelimited);
    put_varint(out, body.len() as u64);
    out.extend_from_slice(body);
}

/// Encoded size of a length-delimited field whose body is `body_len` bytes.
#[inline]
pub const fn len_delimited_len(field: u32, body_len: usize) -> usize {
    tag_len(field) + varint_len(body_len as u64) + body_len
}

#[inline]
pub fn put_f32(out: &mut Vec<u8>, v: f32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_f32(&mut buf, v);
    out.extend_from_slice(&buf);
}

// ================= Reading =================

/// Bounds-checked cursor over one message body.
///
/// `context` names the message being parsed so errors point at it.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8], context: &'static str) -> Self {
        Self { buf, pos: 0, context }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(DecodeError::truncated(self.context, i + 1, i));
            };
            self.pos += 1;

            // The tenth byte may only carry the top bit of a u64.
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(DecodeError::malformed(self.context, "varint overflows 64 bits"));
            }
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::malformed(self.context, "varint longer than 10 bytes"))
    }

    /// Read a tag and split it into field number and wire type.
    pub fn read_tag(&mut self) -> Result<(u32, WireType), DecodeError> {
        let raw = self.read_varint()?;
        let field = raw >> 3;
        if field == 0 || field > u32::MAX as u64 {
            return Err(DecodeError::malformed(
                self.context,
                format!("invalid field number {}", field),
            ));
        }
        let wire_type = WireType::try_from((raw & 0x07) as u8).map_err(|_| {
            DecodeError::malformed(self.context, format!("unknown wire type {}", raw & 0x07))
        })?;
        Ok((field as u32, wire_type))
    }

    pub fn read_len_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let declared = self.read_varint()?;
        let available = self.remaining();
        if declared > available as u64 {
            return Err(DecodeError::truncated(
                self.context,
                usize::try_from(declared).unwrap_or(usize::MAX),
                available,
            ));
        }
        let len = declared as usize;
        let body = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(body)
    }

    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.take(8)?;
        Ok(LittleEndian::read_u64(bytes))
    }

    /// Skip the value of an unknown field.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::Fixed64 => self.take(8).map(|_| ()),
            WireType::LengthDelimited => self.read_len_delimited().map(|_| ()),
            WireType::Fixed32 => self.take(4).map(|_| ()),
            WireType::StartGroup | WireType::EndGroup => Err(DecodeError::malformed(
                self.context,
                "group wire types are not supported",
            )),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if n > available {
            return Err(DecodeError::truncated(self.context, n, available));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

/// Error for a known field that arrived with the wrong wire type.
pub fn wire_type_mismatch(field: &str, expected: WireType, found: WireType) -> DecodeError {
    DecodeError::malformed(
        field,
        format!("expected {} wire type, found {}", expected.name(), found.name()),
    )
}
