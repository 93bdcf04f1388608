//! Payload codec: how one training record becomes the opaque bytes a frame
//! carries.
//!
//! Responsibilities:
//! - Protocol-buffer wire primitives (`wire`)
//! - Schema-agnostic named feature lists (`example`)
//! - The typed record: image, 63 landmark floats, filename (`record`)
//!
//! Non-responsibilities:
//! - Framing and checksums
//! - IO
//! - Image decoding

pub mod types;
pub mod wire;
pub mod example;
pub mod record;

pub use types::DecodeError;
pub use example::{decode_example, encode_example, encode_features, FeatureRef, FeatureValue};
pub use record::{decode_record, encode_record, LandmarkRecord, Landmarks};
