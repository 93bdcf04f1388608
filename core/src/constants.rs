//! Shared constants for the container format, the payload schema and the
//! dataset layout.

/// Joints per hand.
pub const LANDMARK_POINTS: usize = 21;
/// Coordinates per joint (x, y, z).
pub const LANDMARK_DIMS: usize = 3;
/// Floats per record: 21 joints × (x, y, z).
pub const LANDMARK_LEN: usize = LANDMARK_POINTS * LANDMARK_DIMS;

/// Feature names inside the payload (stable write order).
pub mod feature_names {
    pub const IMAGE: &str = "image";
    pub const LANDMARKS: &str = "landmarks";
    pub const FILENAME: &str = "filename";
}

/// Additive constant of the checksum mask.
pub const CRC_MASK_DELTA: u32 = 0xa282_ead8;
/// Rotation (right) applied before the additive constant.
pub const CRC_MASK_ROTATION: u32 = 15;

/// Upper bound for a single payload accepted by the reader (1 GiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = 1 << 30;

/// Dataset layout defaults.
pub mod layout {
    pub const IMAGE_PREFIX: &str = "frame_";
    pub const IMAGE_EXTENSION: &str = "jpg";
    pub const LANDMARK_PREFIX: &str = "landmarks_";
    pub const LANDMARK_EXTENSION: &str = "txt";

    pub const TRAINING_DIR: &str = "training";
    pub const OUTPUT_FILE: &str = "training_data.tfrecord";

    /// Log a progress line every N samples.
    pub const PROGRESS_EVERY: usize = 10;
    /// Records kept in a verification preview.
    pub const PREVIEW_COUNT: usize = 5;
}
