use num_enum::TryFromPrimitive;

use crate::constants::{CRC_MASK_DELTA, CRC_MASK_ROTATION};

/// Checksum algorithms known to the container.
///
/// Only CRC32C is written today.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum ChecksumAlg {
    Crc32c = 0x0001,
}

/// Raw (unmasked) checksum of `data`.
#[inline]
pub fn compute_checksum(data: &[u8], alg: Option<ChecksumAlg>) -> u32 {
    match alg {
        Some(ChecksumAlg::Crc32c) | None => compute_crc32c(data),
    }
}

#[inline]
fn compute_crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Mask a raw CRC before it is stored.
///
/// Rotate right by 15 bits, then add `0xa282ead8` (wrapping). This is the
/// TFRecord transform, so containers stay readable by TensorFlow.
#[inline]
pub const fn mask_checksum(crc: u32) -> u32 {
    crc.rotate_right(CRC_MASK_ROTATION).wrapping_add(CRC_MASK_DELTA)
}

/// Inverse of [`mask_checksum`].
#[inline]
pub const fn unmask_checksum(masked: u32) -> u32 {
    masked.wrapping_sub(CRC_MASK_DELTA).rotate_left(CRC_MASK_ROTATION)
}

/// Masked CRC32C of `data`, as stored in a frame.
#[inline]
pub fn masked_crc32c(data: &[u8]) -> u32 {
    mask_checksum(compute_checksum(data, Some(ChecksumAlg::Crc32c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32c_check_value() {
        assert_eq!(compute_checksum(b"123456789", None), 0xe306_9283);
    }

    #[test]
    fn mask_known_answers() {
        assert_eq!(mask_checksum(0), 0xa282_ead8);
        assert_eq!(masked_crc32c(b"123456789"), 0xc78a_b0e5);
        assert_eq!(masked_crc32c(&0u64.to_le_bytes()), 0x0798_0329);
        assert_eq!(masked_crc32c(b"abc"), 0x21f1_576e);
    }

    #[test]
    fn unmask_inverts_mask() {
        for crc in [0u32, 1, 0xdead_beef, u32::MAX, 0xa282_ead8] {
            assert_eq!(unmask_checksum(mask_checksum(crc)), crc);
        }
    }
}
