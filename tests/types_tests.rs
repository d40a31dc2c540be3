//! Shared Types Tests
//!
//! Tests for channel validation, rolling IDs and line levels.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test types_tests

use os21_firmware::types::{Channel, Error, Level, RollingId};

// =============================================================================
// Channel Tests
// =============================================================================

#[test]
fn channel_new_valid() {
    for n in 1..=3 {
        let ch = Channel::new(n).unwrap();
        assert_eq!(ch.number(), n);
    }
}

#[test]
fn channel_new_invalid() {
    assert!(Channel::new(0).is_none());
    assert!(Channel::new(4).is_none());
    assert!(Channel::new(255).is_none());
}

#[test]
fn channel_try_from_reports_number() {
    assert_eq!(Channel::try_from(2), Ok(Channel::TWO));
    assert_eq!(Channel::try_from(7), Err(Error::InvalidChannel(7)));
}

#[test]
fn channel_codes_are_one_hot() {
    assert_eq!(Channel::ONE.code(), 0x1);
    assert_eq!(Channel::TWO.code(), 0x2);
    assert_eq!(Channel::THREE.code(), 0x4);
}

#[test]
fn channel_from_code() {
    for ch in [Channel::ONE, Channel::TWO, Channel::THREE] {
        assert_eq!(Channel::from_code(ch.code()), Some(ch));
    }
    assert_eq!(Channel::from_code(0x3), None);
    assert_eq!(Channel::from_code(0x0), None);
}

#[test]
fn channel_default_is_one() {
    assert_eq!(Channel::default(), Channel::ONE);
}

#[test]
fn channel_debug() {
    assert_eq!(format!("{:?}", Channel::THREE), "Channel(3)");
}

#[test]
fn error_display() {
    let text = format!("{}", Error::InvalidChannel(9));
    assert!(text.contains('9'));
    assert!(text.contains("channel"));
}

// =============================================================================
// Rolling ID Tests
// =============================================================================

#[test]
fn rolling_id_round_trip() {
    assert_eq!(RollingId::new(0xbb).value(), 0xbb);
    assert_eq!(RollingId::from(0x42), RollingId::new(0x42));
    assert_eq!(RollingId::default().value(), 0);
}

// =============================================================================
// Level Tests
// =============================================================================

#[test]
fn level_inverted() {
    assert_eq!(Level::Low.inverted(), Level::High);
    assert_eq!(Level::High.inverted(), Level::Low);
}

#[test]
fn level_from_bool() {
    assert_eq!(Level::from(true), Level::High);
    assert_eq!(Level::from(false), Level::Low);
    assert!(Level::High.is_high());
    assert!(!Level::default().is_high());
}
