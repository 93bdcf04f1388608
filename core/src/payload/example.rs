//! payload/example.rs
//!
//! Schema-agnostic feature layer: a named map of typed value lists, encoded
//! as a `tf.train.Example` message.
//!
//! Layout:
//!
//! ```text
//! Example   { Features features = 1; }
//! Features  { map<string, Feature> feature = 1; }   // entry: key = 1, value = 2
//! Feature   { oneof { BytesList = 1; FloatList = 2; Int64List = 3; } }
//! BytesList { repeated bytes value = 1; }
//! FloatList { repeated float value = 1 [packed]; }
//! Int64List { repeated int64 value = 1 [packed]; }
//! ```
//!
//! Encoding pre-computes every nested length so the output is written in a
//! single pass with one allocation. Decoding skips unknown fields at every
//! level.

use byteorder::{ByteOrder, LittleEndian};

use crate::payload::types::DecodeError;
use crate::payload::wire::{
    len_delimited_len, put_f32, put_len_delimited, put_tag, put_varint, varint_len,
    wire_type_mismatch, WireReader, WireType,
};

// Field numbers.
const EXAMPLE_FEATURES: u32 = 1;
const FEATURES_ENTRY: u32 = 1;
const ENTRY_KEY: u32 = 1;
const ENTRY_VALUE: u32 = 2;
const FEATURE_BYTES_LIST: u32 = 1;
const FEATURE_FLOAT_LIST: u32 = 2;
const FEATURE_INT64_LIST: u32 = 3;
const LIST_VALUE: u32 = 1;

/// Owned feature value, as produced by [`decode_example`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Bytes(Vec<Vec<u8>>),
    Floats(Vec<f32>),
    Int64s(Vec<i64>),
}

impl FeatureValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Bytes(_) => "bytes_list",
            FeatureValue::Floats(_) => "float_list",
            FeatureValue::Int64s(_) => "int64_list",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FeatureValue::Bytes(v) => v.len(),
            FeatureValue::Floats(v) => v.len(),
            FeatureValue::Int64s(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Borrowed feature value used on the encode path.
#[derive(Debug, Clone, Copy)]
pub enum FeatureRef<'a> {
    Bytes(&'a [&'a [u8]]),
    Floats(&'a [f32]),
    Int64s(&'a [i64]),
}

impl<'a> FeatureRef<'a> {
    fn list_field(&self) -> u32 {
        match self {
            FeatureRef::Bytes(_) => FEATURE_BYTES_LIST,
            FeatureRef::Floats(_) => FEATURE_FLOAT_LIST,
            FeatureRef::Int64s(_) => FEATURE_INT64_LIST,
        }
    }

    /// Bytes of the packed numeric body (zero for bytes lists).
    fn packed_len(&self) -> usize {
        match self {
            FeatureRef::Bytes(_) => 0,
            FeatureRef::Floats(v) => v.len() * 4,
            FeatureRef::Int64s(v) => v.iter().map(|x| varint_len(*x as u64)).sum(),
        }
    }

    /// Size of the BytesList / FloatList / Int64List message body.
    fn list_len(&self) -> usize {
        match self {
            FeatureRef::Bytes(values) => values
                .iter()
                .map(|v| len_delimited_len(LIST_VALUE, v.len()))
                .sum(),
            // An empty packed field is omitted entirely.
            FeatureRef::Floats(v) if v.is_empty() => 0,
            FeatureRef::Int64s(v) if v.is_empty() => 0,
            _ => len_delimited_len(LIST_VALUE, self.packed_len()),
        }
    }

    /// Size of the Feature message body.
    fn feature_len(&self) -> usize {
        len_delimited_len(self.list_field(), self.list_len())
    }

    fn write_feature(&self, out: &mut Vec<u8>) {
        put_tag(out, self.list_field(), WireType::LengthDelimited);
        put_varint(out, self.list_len() as u64);

        match self {
            FeatureRef::Bytes(values) => {
                for v in values.iter() {
                    put_len_delimited(out, LIST_VALUE, v);
                }
            }
            FeatureRef::Floats(values) => {
                if !values.is_empty() {
                    put_tag(out, LIST_VALUE, WireType::LengthDelimited);
                    put_varint(out, self.packed_len() as u64);
                    for v in values.iter() {
                        put_f32(out, *v);
                    }
                }
            }
            FeatureRef::Int64s(values) => {
                if !values.is_empty() {
                    put_tag(out, LIST_VALUE, WireType::LengthDelimited);
                    put_varint(out, self.packed_len() as u64);
                    for v in values.iter() {
                        put_varint(out, *v as u64);
                    }
                }
            }
        }
    }
}

fn entry_len(name: &str, feature: &FeatureRef<'_>) -> usize {
    len_delimited_len(ENTRY_KEY, name.len()) + len_delimited_len(ENTRY_VALUE, feature.feature_len())
}

/// Encode named features as one `Example` message.
///
/// Entries are written in the given order; callers rely on that for a
/// stable byte layout.
pub fn encode_features(entries: &[(&str, FeatureRef<'_>)]) -> Vec<u8> {
    let features_len: usize = entries
        .iter()
        .map(|(name, f)| len_delimited_len(FEATURES_ENTRY, entry_len(name, f)))
        .sum();
    let total = len_delimited_len(EXAMPLE_FEATURES, features_len);

    let mut out = Vec::with_capacity(total);
    put_tag(&mut out, EXAMPLE_FEATURES, WireType::LengthDelimited);
    put_varint(&mut out, features_len as u64);

    for (name, feature) in entries {
        put_tag(&mut out, FEATURES_ENTRY, WireType::LengthDelimited);
        put_varint(&mut out, entry_len(name, feature) as u64);

        put_len_delimited(&mut out, ENTRY_KEY, name.as_bytes());
        put_tag(&mut out, ENTRY_VALUE, WireType::LengthDelimited);
        put_varint(&mut out, feature.feature_len() as u64);
        feature.write_feature(&mut out);
    }

    debug_assert_eq!(out.len(), total, "example encoding wrote incorrect length");
    out
}

/// Owned-value convenience over [`encode_features`].
pub fn encode_example(entries: &[(&str, FeatureValue)]) -> Vec<u8> {
    // Bytes lists need a slice of slices; build them up front so the
    // borrowed refs below can point into them.
    let byte_views: Vec<Vec<&[u8]>> = entries
        .iter()
        .map(|(_, v)| match v {
            FeatureValue::Bytes(values) => values.iter().map(Vec::as_slice).collect(),
            _ => Vec::new(),
        })
        .collect();

    let refs: Vec<(&str, FeatureRef<'_>)> = entries
        .iter()
        .zip(byte_views.iter())
        .map(|((name, value), views)| {
            let r = match value {
                FeatureValue::Bytes(_) => FeatureRef::Bytes(views.as_slice()),
                FeatureValue::Floats(v) => FeatureRef::Floats(v.as_slice()),
                FeatureValue::Int64s(v) => FeatureRef::Int64s(v.as_slice()),
            };
            (*name, r)
        })
        .collect();

    encode_features(&refs)
}

// ================= Decoding =================

/// Decode an `Example` into its named features, in wire order.
///
/// Duplicate keys are kept; lookups should take the last occurrence, which
/// matches map-merge semantics.
pub fn decode_example(buf: &[u8]) -> Result<Vec<(String, FeatureValue)>, DecodeError> {
    let mut out = Vec::new();
    let mut r = WireReader::new(buf, "example");

    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (EXAMPLE_FEATURES, WireType::LengthDelimited) => {
                let body = r.read_len_delimited()?;
                decode_features(body, &mut out)?;
            }
            (EXAMPLE_FEATURES, other) => {
                return Err(wire_type_mismatch("features", WireType::LengthDelimited, other));
            }
            (_, other) => r.skip(other)?,
        }
    }

    Ok(out)
}

fn decode_features(buf: &[u8], out: &mut Vec<(String, FeatureValue)>) -> Result<(), DecodeError> {
    let mut r = WireReader::new(buf, "features");

    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (FEATURES_ENTRY, WireType::LengthDelimited) => {
                let body = r.read_len_delimited()?;
                out.push(decode_entry(body)?);
            }
            (FEATURES_ENTRY, other) => {
                return Err(wire_type_mismatch("feature", WireType::LengthDelimited, other));
            }
            (_, other) => r.skip(other)?,
        }
    }
    Ok(())
}

fn decode_entry(buf: &[u8]) -> Result<(String, FeatureValue), DecodeError> {
    let mut r = WireReader::new(buf, "feature entry");
    let mut key: Option<String> = None;
    let mut value: Option<FeatureValue> = None;

    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (ENTRY_KEY, WireType::LengthDelimited) => {
                let raw = r.read_len_delimited()?;
                let s = std::str::from_utf8(raw)
                    .map_err(|_| DecodeError::malformed("feature key", "key is not valid UTF-8"))?;
                key = Some(s.to_string());
            }
            (ENTRY_VALUE, WireType::LengthDelimited) => {
                let body = r.read_len_delimited()?;
                value = decode_feature(body)?;
            }
            (ENTRY_KEY, other) => {
                return Err(wire_type_mismatch("feature key", WireType::LengthDelimited, other));
            }
            (ENTRY_VALUE, other) => {
                return Err(wire_type_mismatch("feature value", WireType::LengthDelimited, other));
            }
            (_, other) => r.skip(other)?,
        }
    }

    let key = key.unwrap_or_default();
    match value {
        Some(v) => Ok((key, v)),
        None => Err(DecodeError::malformed(&key, "feature carries no value list")),
    }
}

fn decode_feature(buf: &[u8]) -> Result<Option<FeatureValue>, DecodeError> {
    let mut r = WireReader::new(buf, "feature");
    let mut value = None;

    // oneof: the last list on the wire wins.
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (FEATURE_BYTES_LIST, WireType::LengthDelimited) => {
                value = Some(decode_bytes_list(r.read_len_delimited()?)?);
            }
            (FEATURE_FLOAT_LIST, WireType::LengthDelimited) => {
                value = Some(decode_float_list(r.read_len_delimited()?)?);
            }
            (FEATURE_INT64_LIST, WireType::LengthDelimited) => {
                value = Some(decode_int64_list(r.read_len_delimited()?)?);
            }
            (FEATURE_BYTES_LIST | FEATURE_FLOAT_LIST | FEATURE_INT64_LIST, other) => {
                return Err(wire_type_mismatch("feature list", WireType::LengthDelimited, other));
            }
            (_, other) => r.skip(other)?,
        }
    }
    Ok(value)
}

fn decode_bytes_list(buf: &[u8]) -> Result<FeatureValue, DecodeError> {
    let mut r = WireReader::new(buf, "bytes_list");
    let mut values = Vec::new();

    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (LIST_VALUE, WireType::LengthDelimited) => values.push(r.read_len_delimited()?.to_vec()),
            (LIST_VALUE, other) => {
                return Err(wire_type_mismatch("bytes_list", WireType::LengthDelimited, other));
            }
            (_, other) => r.skip(other)?,
        }
    }
    Ok(FeatureValue::Bytes(values))
}

fn decode_float_list(buf: &[u8]) -> Result<FeatureValue, DecodeError> {
    let mut r = WireReader::new(buf, "float_list");
    let mut values = Vec::new();

    // Packed and unpacked encodings are both legal for repeated floats.
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (LIST_VALUE, WireType::LengthDelimited) => {
                let packed = r.read_len_delimited()?;
                if packed.len() % 4 != 0 {
                    return Err(DecodeError::malformed(
                        "float_list",
                        format!("packed length {} is not a multiple of 4", packed.len()),
                    ));
                }
                values.reserve(packed.len() / 4);
                values.extend(packed.chunks_exact(4).map(LittleEndian::read_f32));
            }
            (LIST_VALUE, WireType::Fixed32) => values.push(f32::from_bits(r.read_fixed32()?)),
            (LIST_VALUE, other) => {
                return Err(wire_type_mismatch("float_list", WireType::Fixed32, other));
            }
            (_, other) => r.skip(other)?,
        }
    }
    Ok(FeatureValue::Floats(values))
}

fn decode_int64_list(buf: &[u8]) -> Result<FeatureValue, DecodeError> {
    let mut r = WireReader::new(buf, "int64_list");
    let mut values = Vec::new();

    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match (field, wt) {
            (LIST_VALUE, WireType::LengthDelimited) => {
                let mut packed = WireReader::new(r.read_len_delimited()?, "int64_list");
                while !packed.is_empty() {
                    values.push(packed.read_varint()? as i64);
                }
            }
            (LIST_VALUE, WireType::Varint) => values.push(r.read_varint()? as i64),
            (LIST_VALUE, other) => {
                return Err(wire_type_mismatch("int64_list", WireType::Varint, other));
            }
            (_, other) => r.skip(other)?,
        }
    }
    Ok(FeatureValue::Int64s(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_features_roundtrip() {
        let entries = vec![
            ("blob", FeatureValue::Bytes(vec![b"ab".to_vec(), Vec::new()])),
            ("xs", FeatureValue::Floats(vec![1.5, -2.0])),
            ("ids", FeatureValue::Int64s(vec![0, -1, 300])),
            ("none", FeatureValue::Floats(Vec::new())),
        ];
        let wire = encode_example(&entries);
        let decoded = decode_example(&wire).unwrap();

        let expected: Vec<(String, FeatureValue)> =
            entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn known_bytes_for_single_float() {
        let wire = encode_example(&[("x", FeatureValue::Floats(vec![1.0]))]);
        let expected: Vec<u8> = vec![
            0x0a, 0x0f, // Example.features, len 15
            0x0a, 0x0d, // Features.feature entry, len 13
            0x0a, 0x01, b'x', // entry key
            0x12, 0x08, // entry value (Feature), len 8
            0x12, 0x06, // Feature.float_list, len 6
            0x0a, 0x04, 0x00, 0x00, 0x80, 0x3f, // packed [1.0]
        ];
        assert_eq!(wire, expected);
    }

    #[test]
    fn unpacked_floats_are_accepted() {
        // float_list with two unpacked fixed32 values.
        let mut list = Vec::new();
        put_tag(&mut list, LIST_VALUE, WireType::Fixed32);
        put_f32(&mut list, 0.5);
        put_tag(&mut list, LIST_VALUE, WireType::Fixed32);
        put_f32(&mut list, 2.0);

        assert_eq!(
            decode_float_list(&list).unwrap(),
            FeatureValue::Floats(vec![0.5, 2.0])
        );
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let mut wire = encode_example(&[("k", FeatureValue::Int64s(vec![7]))]);
        // Append an unknown varint field 9 and an unknown fixed64 field 10.
        put_tag(&mut wire, 9, WireType::Varint);
        put_varint(&mut wire, 12345);
        put_tag(&mut wire, 10, WireType::Fixed64);
        wire.extend_from_slice(&[0u8; 8]);

        let decoded = decode_example(&wire).unwrap();
        assert_eq!(decoded, vec![("k".to_string(), FeatureValue::Int64s(vec![7]))]);
    }

    #[test]
    fn features_with_wrong_wire_type_is_malformed() {
        let mut wire = Vec::new();
        put_tag(&mut wire, EXAMPLE_FEATURES, WireType::Varint);
        put_varint(&mut wire, 1);
        assert!(matches!(
            decode_example(&wire),
            Err(DecodeError::MalformedField { .. })
        ));
    }

    #[test]
    fn ragged_packed_floats_are_malformed() {
        let mut list = Vec::new();
        put_len_delimited(&mut list, LIST_VALUE, &[0, 0, 0]);
        assert!(matches!(
            decode_float_list(&list),
            Err(DecodeError::MalformedField { .. })
        ));
    }
}
