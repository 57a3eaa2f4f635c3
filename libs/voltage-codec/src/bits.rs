//! Coil / discrete-input bit packing
//!
//! Modbus carries boolean data eight bits per byte, least-significant bit
//! first: the first coil of a request lands in bit 0 of the first byte. On
//! the wire the packed bytes are preceded by a one-byte count.

use crate::error::{CodecError, Result};

/// Pack booleans into bytes, LSB first
///
/// A trailing partial group is padded with zero bits. An empty input
/// produces an empty output.
///
/// # Example
/// ```
/// use voltage_codec::pack_bits;
///
/// let packed = pack_bits(&[true, false, true, false, true, false, true, false]);
/// assert_eq!(packed, vec![0x55]);
/// ```
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |byte, (bit, &set)| if set { byte | (1 << bit) } else { byte })
        })
        .collect()
}

/// Pack booleans and prefix the byte count, the layout `unpack_bits` expects
pub fn pack_bits_framed(bits: &[bool]) -> Result<Vec<u8>> {
    let packed = pack_bits(bits);
    let count =
        u8::try_from(packed.len()).map_err(|_| CodecError::PayloadTooLong { bytes: packed.len() })?;

    let mut framed = Vec::with_capacity(1 + packed.len());
    framed.push(count);
    framed.extend_from_slice(&packed);
    Ok(framed)
}

/// Unpack a length-prefixed bit buffer
///
/// `buffer[0]` is the number of packed bytes that follow. Exactly that many
/// bytes are decoded, each contributing eight bits LSB first; bytes after
/// them are ignored. Returns the bits together with the byte count.
pub fn unpack_bits(buffer: &[u8]) -> Result<(Vec<bool>, usize)> {
    let (&count, payload) = buffer.split_first().ok_or(CodecError::MissingByteCount)?;
    let byte_count = usize::from(count);

    if payload.len() < byte_count {
        return Err(CodecError::Truncated {
            declared: byte_count,
            available: payload.len(),
        });
    }

    let bits = payload[..byte_count]
        .iter()
        .flat_map(|&byte| (0..8).map(move |bit| (byte >> bit) & 1 == 1))
        .collect();

    Ok((bits, byte_count))
}

/// Convert decoded bits to the 0/1 values stored in discrete blocks
pub fn bits_to_values(bits: &[bool]) -> Vec<u16> {
    bits.iter().map(|&bit| u16::from(bit)).collect()
}

/// Convert discrete block values to bits (any non-zero value is set)
pub fn values_to_bits(values: &[u16]) -> Vec<bool> {
    values.iter().map(|&value| value != 0).collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_pack_alternating_byte() {
        let bits = [true, false, true, false, true, false, true, false];
        assert_eq!(pack_bits(&bits), vec![0x55]);
    }

    #[test]
    fn test_pack_empty() {
        assert!(pack_bits(&[]).is_empty());
    }

    #[test]
    fn test_pack_partial_group_is_zero_padded() {
        // 10 bits: first byte 0xFF, second byte holds bit0 only
        let mut bits = vec![true; 9];
        bits.push(false);
        assert_eq!(pack_bits(&bits), vec![0xFF, 0x01]);

        assert_eq!(pack_bits(&[false, true, true]), vec![0x06]);
    }

    #[test]
    fn test_unpack_single_byte() {
        let (bits, count) = unpack_bits(&[1, 0x55]).unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            bits,
            vec![true, false, true, false, true, false, true, false]
        );
    }

    #[test]
    fn test_unpack_zero_count() {
        let (bits, count) = unpack_bits(&[0]).unwrap();
        assert_eq!(count, 0);
        assert!(bits.is_empty());
    }

    #[test]
    fn test_unpack_ignores_trailing_bytes() {
        let (bits, count) = unpack_bits(&[1, 0x01, 0xFF]).unwrap();
        assert_eq!(count, 1);
        assert_eq!(bits.len(), 8);
        assert!(bits[0]);
        assert!(!bits[1]);
    }

    #[test]
    fn test_unpack_truncated_buffer() {
        let err = unpack_bits(&[3, 0x01, 0x02]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                declared: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_unpack_empty_buffer() {
        assert_eq!(unpack_bits(&[]).unwrap_err(), CodecError::MissingByteCount);
    }

    #[test]
    fn test_framed_round_trip_pads_to_byte() {
        let bits = [true, true, false, true, false];
        let framed = pack_bits_framed(&bits).unwrap();
        assert_eq!(framed, vec![1, 0x0B]);

        let (decoded, count) = unpack_bits(&framed).unwrap();
        assert_eq!(count, 1);
        assert_eq!(&decoded[..5], &bits);
        assert!(decoded[5..].iter().all(|bit| !bit));
    }

    #[test]
    fn test_framed_payload_too_long() {
        let bits = vec![true; 256 * 8];
        assert_eq!(
            pack_bits_framed(&bits).unwrap_err(),
            CodecError::PayloadTooLong { bytes: 256 }
        );
        assert!(pack_bits_framed(&vec![true; 255 * 8]).is_ok());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(bits_to_values(&[true, false, true]), vec![1, 0, 1]);
        assert_eq!(values_to_bits(&[0, 1, 7]), vec![false, true, true]);
    }
}
