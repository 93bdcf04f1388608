//! payload/types.rs
//! Error type shared by the wire reader, the generic example layer and the
//! typed record mapping.

use thiserror::Error;

/// Payload schema violations.
///
/// These are per-record: a caller iterating a container may log one and keep
/// reading, since frame boundaries do not depend on payload validity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Wire type or value shape does not match what the field requires.
    #[error("malformed field `{field}`: {reason}")]
    MalformedField { field: String, reason: String },

    /// The landmark float list does not hold exactly 21 × 3 values.
    #[error("landmarks must hold {expected} floats, found {actual}")]
    WrongArityLandmarks { expected: usize, actual: usize },

    /// A declared length or fixed-width value runs past the end of the buffer.
    #[error("truncated payload in `{field}`: need {needed} bytes, {available} available")]
    Truncated {
        field: String,
        needed: usize,
        available: usize,
    },

    /// A required feature is absent from the example.
    #[error("missing required feature `{0}`")]
    MissingField(String),
}

impl DecodeError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        DecodeError::MalformedField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn truncated(field: &str, needed: usize, available: usize) -> Self {
        DecodeError::Truncated {
            field: field.to_string(),
            needed,
            available,
        }
    }
}
