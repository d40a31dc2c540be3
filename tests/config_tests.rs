//! Configuration and Constants Tests
//!
//! Tests to verify configuration values are valid and consistent.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test config_tests

use os21_firmware::config::*;
use os21_firmware::types::Channel;

// =============================================================================
// Tick Clock Tests
// =============================================================================

#[test]
fn tick_divides_watch_crystal() {
    assert_eq!(REFERENCE_CLOCK_HZ % TICK_RATE_HZ, 0);
    assert_eq!(TICK_DIVIDER, 16);
}

#[test]
fn tick_period_about_488us() {
    assert_eq!(TICK_PERIOD_NS, 488_281);
    assert_eq!(MAX_WORK_PER_TICK_US, 488);
}

// =============================================================================
// Frame and Burst Tests
// =============================================================================

#[test]
fn frame_dimensions() {
    assert_eq!(FRAME_LEN, 12);
    assert_eq!(BITS_PER_BURST, 96);
    assert_eq!(PULSES_PER_BURST, 192);
}

#[test]
fn burst_timing() {
    assert_eq!(BURST_DURATION_US, 93_750);
    assert_eq!(BURSTS_PER_TRANSMIT, 2);
    assert_eq!(INTER_BURST_PAUSE_MS, 55);
}

#[test]
fn default_channel_is_one() {
    assert_eq!(DEFAULT_CHANNEL, Channel::ONE);
}

// =============================================================================
// Range Tests
// =============================================================================

#[test]
fn temperature_range_symmetric() {
    assert_eq!(MIN_TEMPERATURE_C, -MAX_TEMPERATURE_C);
    assert!(MAX_TEMPERATURE_C < 400.0);
}

#[test]
fn humidity_range_two_digits() {
    assert_eq!(MIN_HUMIDITY_PCT, 0.0);
    assert_eq!(MAX_HUMIDITY_PCT, 99.0);
}

#[test]
fn low_battery_threshold_above_cutoff() {
    // 2x AA cells, regulator drops out around 2.0 V
    assert!(LOW_BATTERY_MV > 2_000);
    assert!(LOW_BATTERY_HYSTERESIS_MV < LOW_BATTERY_MV);
}

#[test]
fn pin_and_timer_names() {
    assert_eq!(pins::RF_DATA, "PA8");
    assert_eq!(timers::PULSE_TICK, "LPTIM1");
    assert_ne!(timers::PULSE_TICK, timers::TIME_DRIVER);
}
