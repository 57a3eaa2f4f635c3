//! Property checks for the checksum and bit codec
//!
//! Exercises the invariants the RTU/ASCII transports depend on: single-bit
//! corruption always changes the CRC, LRC folds associatively, and framed
//! bit payloads decode back to the padded input.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use voltage_codec::{
    check_crc, compute_crc, compute_lrc, pack_bits, pack_bits_framed, unpack_bits, CodecError,
};

/// Deterministic pseudo-random frame (xorshift), no external RNG needed
fn sample_frame(len: usize, mut seed: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed & 0xFF) as u8
        })
        .collect()
}

#[test]
fn test_crc_detects_every_single_bit_flip() {
    let frame = sample_frame(32, 0x1234_5678);
    let crc = compute_crc(&frame);
    assert!(check_crc(&frame, crc));

    for index in 0..frame.len() {
        for bit in 0..8 {
            let mut corrupted = frame.clone();
            corrupted[index] ^= 1 << bit;
            assert_ne!(
                compute_crc(&corrupted),
                crc,
                "flip of byte {} bit {} went undetected",
                index,
                bit
            );
        }
    }
}

#[test]
fn test_crc_appended_little_endian_leaves_zero_residue() {
    // RTU appends the CRC low byte first; hashing frame + CRC yields zero
    let mut frame = vec![0x11, 0x03, 0x00, 0x6B, 0x00, 0x03];
    let crc = compute_crc(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    assert_eq!(compute_crc(&frame), 0x0000);
}

#[test]
fn test_lrc_is_xor_fold_over_concatenation() {
    let first = sample_frame(17, 7);
    let second = sample_frame(9, 99);
    let joined: Vec<u8> = first.iter().chain(second.iter()).copied().collect();

    assert_eq!(
        compute_lrc(&joined),
        compute_lrc(&first) ^ compute_lrc(&second)
    );
}

#[test]
fn test_framed_bits_recover_padded_input() {
    for len in [0usize, 1, 7, 8, 9, 15, 16, 17, 100] {
        let bits: Vec<bool> = (0..len).map(|i| i % 3 == 0 || i % 5 == 0).collect();
        let framed = pack_bits_framed(&bits).unwrap();
        let (decoded, byte_count) = unpack_bits(&framed).unwrap();

        assert_eq!(byte_count, len.div_ceil(8));
        assert_eq!(decoded.len(), byte_count * 8);
        assert_eq!(&decoded[..len], bits.as_slice());
        assert!(decoded[len..].iter().all(|bit| !bit));
    }
}

#[test]
fn test_unpack_rejects_short_payload() {
    let packed = pack_bits(&[true; 24]);
    let mut buffer = vec![4u8];
    buffer.extend_from_slice(&packed);

    assert!(matches!(
        unpack_bits(&buffer),
        Err(CodecError::Truncated {
            declared: 4,
            available: 3
        })
    ));
}
