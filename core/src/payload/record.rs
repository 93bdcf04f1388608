//! payload/record.rs
//! Typed training record and its mapping onto the feature layer.

use crate::constants::{feature_names, LANDMARK_DIMS, LANDMARK_LEN, LANDMARK_POINTS};
use crate::payload::example::{decode_example, encode_features, FeatureRef, FeatureValue};
use crate::payload::types::DecodeError;

/// 21 joints × (x, y, z), joint-major.
///
/// The fixed array is the arity invariant: a `Landmarks` value always holds
/// exactly 63 floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmarks([f32; LANDMARK_LEN]);

impl Landmarks {
    pub const LEN: usize = LANDMARK_LEN;

    /// Copy from a flat slice; any length other than 63 is rejected.
    pub fn from_slice(values: &[f32]) -> Result<Self, DecodeError> {
        let arr: [f32; LANDMARK_LEN] = values.try_into().map_err(|_| DecodeError::WrongArityLandmarks {
            expected: LANDMARK_LEN,
            actual: values.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn from_points(points: [[f32; LANDMARK_DIMS]; LANDMARK_POINTS]) -> Self {
        let mut arr = [0f32; LANDMARK_LEN];
        for (dst, p) in arr.chunks_exact_mut(LANDMARK_DIMS).zip(points.iter()) {
            dst.copy_from_slice(p);
        }
        Self(arr)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// (x, y, z) of one joint, `None` past joint 20.
    pub fn point(&self, joint: usize) -> Option<[f32; LANDMARK_DIMS]> {
        if joint >= LANDMARK_POINTS {
            return None;
        }
        let base = joint * LANDMARK_DIMS;
        Some([self.0[base], self.0[base + 1], self.0[base + 2]])
    }

    pub fn points(&self) -> impl Iterator<Item = [f32; LANDMARK_DIMS]> + '_ {
        self.0.chunks_exact(LANDMARK_DIMS).map(|c| [c[0], c[1], c[2]])
    }
}

impl Default for Landmarks {
    fn default() -> Self {
        Self([0.0; LANDMARK_LEN])
    }
}

impl TryFrom<Vec<f32>> for Landmarks {
    type Error = DecodeError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::from_slice(&values)
    }
}

impl TryFrom<&[f32]> for Landmarks {
    type Error = DecodeError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

/// One training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkRecord {
    /// Compressed still image, stored as-is.
    pub image: Vec<u8>,
    pub landmarks: Landmarks,
    /// Source image stem; not checked for uniqueness.
    pub filename: String,
}

impl LandmarkRecord {
    pub fn new(image: Vec<u8>, landmarks: Landmarks, filename: impl Into<String>) -> Self {
        Self {
            image,
            landmarks,
            filename: filename.into(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_record(self)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        decode_record(buf)
    }
}

/// Serialize a record as `image`, `landmarks`, `filename` (in that order).
pub fn encode_record(record: &LandmarkRecord) -> Vec<u8> {
    let image = [record.image.as_slice()];
    let filename = [record.filename.as_bytes()];

    encode_features(&[
        (feature_names::IMAGE, FeatureRef::Bytes(&image)),
        (feature_names::LANDMARKS, FeatureRef::Floats(record.landmarks.as_slice())),
        (feature_names::FILENAME, FeatureRef::Bytes(&filename)),
    ])
}

/// Parse a record, enforcing the schema of all three features.
pub fn decode_record(buf: &[u8]) -> Result<LandmarkRecord, DecodeError> {
    let mut features = decode_example(buf)?;

    let image = single_bytes(take_feature(&mut features, feature_names::IMAGE)?, feature_names::IMAGE)?;

    let landmarks = match take_feature(&mut features, feature_names::LANDMARKS)? {
        FeatureValue::Floats(values) => Landmarks::from_slice(&values)?,
        other => return Err(wrong_kind(feature_names::LANDMARKS, "float_list", &other)),
    };

    let filename = single_bytes(
        take_feature(&mut features, feature_names::FILENAME)?,
        feature_names::FILENAME,
    )?;
    let filename = String::from_utf8(filename)
        .map_err(|_| DecodeError::malformed(feature_names::FILENAME, "value is not valid UTF-8"))?;

    Ok(LandmarkRecord {
        image,
        landmarks,
        filename,
    })
}

/// Remove the last occurrence of `name` (map-merge semantics).
fn take_feature(
    features: &mut Vec<(String, FeatureValue)>,
    name: &str,
) -> Result<FeatureValue, DecodeError> {
    let idx = features
        .iter()
        .rposition(|(k, _)| k == name)
        .ok_or_else(|| DecodeError::MissingField(name.to_string()))?;
    Ok(features.swap_remove(idx).1)
}

fn single_bytes(value: FeatureValue, name: &str) -> Result<Vec<u8>, DecodeError> {
    match value {
        FeatureValue::Bytes(mut values) if values.len() == 1 => Ok(values.remove(0)),
        FeatureValue::Bytes(values) => Err(DecodeError::malformed(
            name,
            format!("expected exactly 1 value, found {}", values.len()),
        )),
        other => Err(wrong_kind(name, "bytes_list", &other)),
    }
}

fn wrong_kind(name: &str, expected: &str, found: &FeatureValue) -> DecodeError {
    DecodeError::malformed(name, format!("expected {}, found {}", expected, found.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_are_joint_major() {
        let values: Vec<f32> = (0..63).map(|i| i as f32).collect();
        let lm = Landmarks::from_slice(&values).unwrap();

        assert_eq!(lm.point(0), Some([0.0, 1.0, 2.0]));
        assert_eq!(lm.point(20), Some([60.0, 61.0, 62.0]));
        assert_eq!(lm.point(21), None);
        assert_eq!(lm.points().count(), 21);
    }

    #[test]
    fn from_points_matches_flat_layout() {
        let mut points = [[0f32; 3]; 21];
        for (j, p) in points.iter_mut().enumerate() {
            *p = [j as f32, j as f32 + 0.25, -(j as f32)];
        }
        let lm = Landmarks::from_points(points);
        assert_eq!(lm.point(7), Some([7.0, 7.25, -7.0]));
        assert_eq!(lm.points().collect::<Vec<_>>(), points.to_vec());
    }

    #[test]
    fn short_slice_is_rejected() {
        assert_eq!(
            Landmarks::from_slice(&[0.0; 62]),
            Err(DecodeError::WrongArityLandmarks { expected: 63, actual: 62 })
        );
    }
}
