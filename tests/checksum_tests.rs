//! Checksum Tests
//!
//! Tests for the simple nibble sum and the CRC-8 carried in every frame.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test checksum_tests

use os21_firmware::protocol::checksum::{
    crc8, frame_crc, frame_sum, masked_nibbles, nibble, simple_sum, CRC_MASK, CRC_SEED, SUM_MASK,
};
use os21_firmware::protocol::FrameEncoder;
use os21_firmware::sensor::Reading;
use os21_firmware::types::{Channel, RollingId};

const GOLDEN: [u8; 12] = [
    0xff, 0xff, 0x1a, 0x2d, 0x20, 0xbb, 0x7c, 0x22, 0x00, 0x83, 0x4a, 0x55,
];

fn sample_frames() -> [[u8; 12]; 3] {
    let mut a = FrameEncoder::new(Channel::ONE, RollingId::new(0x00));
    let mut b = FrameEncoder::new(Channel::THREE, RollingId::new(0xff));
    [
        GOLDEN,
        *a.encode(&Reading::new(-40.0, 0.0)).as_bytes(),
        *b.encode(&Reading::new(59.9, 99.0).with_low_battery(true)).as_bytes(),
    ]
}

/// Is bit `bit` of byte `byte` inside the nibble mask?
fn in_mask(mask: u32, byte: usize, bit: usize) -> bool {
    let index = byte * 2 + bit / 4;
    (mask >> index) & 0x1 != 0
}

// ============================================================================
// Nibble Addressing
// ============================================================================

#[test]
fn nibbles_low_half_first() {
    assert_eq!(nibble(&GOLDEN, 10), 0xb);
    assert_eq!(nibble(&GOLDEN, 12), 0xc);
    assert_eq!(nibble(&GOLDEN, 13), 0x7);
    assert_eq!(nibble(&GOLDEN, 19), 0x8);
}

#[test]
fn masks_skip_preamble_and_checksums() {
    for i in (0..4).chain(20..24) {
        assert_eq!((SUM_MASK >> i) & 1, 0, "sum covers nibble {i}");
        assert_eq!((CRC_MASK >> i) & 1, 0, "crc covers nibble {i}");
    }
}

#[test]
fn crc_mask_skips_rolling_id() {
    assert_eq!((CRC_MASK >> 10) & 0b11, 0);
    assert_eq!((SUM_MASK >> 10) & 0b11, 0b11);
}

#[test]
fn masked_nibble_count() {
    assert_eq!(masked_nibbles(&GOLDEN, SUM_MASK).count(), 15);
    assert_eq!(masked_nibbles(&GOLDEN, CRC_MASK).count(), 13);
}

// ============================================================================
// Simple Sum
// ============================================================================

#[test]
fn sum_golden() {
    assert_eq!(frame_sum(&GOLDEN), 0x4a);
    assert_eq!(simple_sum(&GOLDEN, SUM_MASK), 0x4a);
}

#[test]
fn sum_deterministic() {
    for frame in sample_frames() {
        assert_eq!(frame_sum(&frame), frame_sum(&frame));
    }
}

#[test]
fn sum_sees_every_bit_in_mask() {
    for mut frame in sample_frames() {
        let base = frame_sum(&frame);
        for byte in 0..12 {
            for bit in 0..8 {
                frame[byte] ^= 1 << bit;
                let flipped = frame_sum(&frame);
                frame[byte] ^= 1 << bit;

                if in_mask(SUM_MASK, byte, bit) {
                    assert_ne!(flipped, base, "byte {byte} bit {bit}");
                } else {
                    assert_eq!(flipped, base, "byte {byte} bit {bit}");
                }
            }
        }
    }
}

#[test]
fn sum_ignores_preamble() {
    let mut frame = GOLDEN;
    frame[0] = 0x00;
    frame[1] = 0x5a;
    assert_eq!(frame_sum(&frame), 0x4a);
}

// ============================================================================
// CRC-8
// ============================================================================

#[test]
fn crc_golden() {
    assert_eq!(frame_crc(&GOLDEN), 0x55);
    assert_eq!(crc8(&GOLDEN, CRC_MASK, CRC_SEED), 0x55);
}

#[test]
fn crc_depends_on_seed() {
    assert_ne!(crc8(&GOLDEN, CRC_MASK, 0x00), 0x55);
}

#[test]
fn crc_single_bit_flips_detected() {
    for mut frame in sample_frames() {
        let base = frame_crc(&frame);
        for byte in 0..12 {
            for bit in 0..8 {
                frame[byte] ^= 1 << bit;
                let flipped = frame_crc(&frame);
                frame[byte] ^= 1 << bit;

                if in_mask(CRC_MASK, byte, bit) {
                    assert_ne!(flipped, base, "byte {byte} bit {bit}");
                } else {
                    assert_eq!(flipped, base, "byte {byte} bit {bit}");
                }
            }
        }
    }
}

#[test]
fn crc_ignores_rolling_id() {
    let mut frame = GOLDEN;
    frame[5] = 0x00;
    assert_eq!(frame_crc(&frame), 0x55);
    assert_ne!(frame_sum(&frame), 0x4a);
}
