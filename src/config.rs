//! System configuration and protocol constants
//!
//! This module defines compile-time constants for the sensor node.
//! Protocol timing, frame layout constants, pin mappings and timer
//! assignments are centralized here.

use crate::types::Channel;

/// Frequency of the external watch crystal feeding the tick counter
pub const REFERENCE_CLOCK_HZ: u32 = 32_768;

/// Pulse clock rate (one pulse per tick)
pub const TICK_RATE_HZ: u32 = 2_048;

/// Divider from reference clock to tick rate
pub const TICK_DIVIDER: u32 = REFERENCE_CLOCK_HZ / TICK_RATE_HZ;

/// Duration of one tick in nanoseconds (~488 us)
pub const TICK_PERIOD_NS: u32 = 1_000_000_000 / TICK_RATE_HZ;

/// Upper bound on work between two pulse edges, in microseconds
///
/// Anything slower than one tick makes the CPU miss a wake-up and the
/// edge lands one tick late.
pub const MAX_WORK_PER_TICK_US: u32 = TICK_PERIOD_NS / 1_000;

/// Length of an encoded frame in bytes
pub const FRAME_LEN: usize = 12;

/// Number of data bits in one burst
pub const BITS_PER_BURST: usize = FRAME_LEN * 8;

/// Number of line pulses in one burst (two per bit)
pub const PULSES_PER_BURST: usize = BITS_PER_BURST * 2;

/// Number of bursts sent per transmit request
pub const BURSTS_PER_TRANSMIT: u8 = 2;

/// Pause between the two bursts of a transmit request
pub const INTER_BURST_PAUSE_MS: u32 = 55;

/// Approximate duration of one burst in microseconds (93.75 ms)
pub const BURST_DURATION_US: u32 = (PULSES_PER_BURST as u32 * 1_000_000) / TICK_RATE_HZ;

/// Default channel when the board has no channel selector
pub const DEFAULT_CHANNEL: Channel = Channel::ONE;

/// Lowest temperature the frame can carry (°C)
pub const MIN_TEMPERATURE_C: f32 = -399.9;

/// Highest temperature the frame can carry (°C)
pub const MAX_TEMPERATURE_C: f32 = 399.9;

/// Lowest humidity the frame can carry (%)
pub const MIN_HUMIDITY_PCT: f32 = 0.0;

/// Highest humidity the frame can carry (%)
pub const MAX_HUMIDITY_PCT: f32 = 99.0;

/// Battery voltage below which the low-battery flag is raised (2x AA)
pub const LOW_BATTERY_MV: u16 = 2_300;

/// Hysteresis applied before the low-battery flag clears again
pub const LOW_BATTERY_HYSTERESIS_MV: u16 = 100;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// 433.92 MHz transmitter data input
    pub const RF_DATA: &str = "PA8";

    /// 32 768 Hz crystal input
    pub const LSE_IN: &str = "PC14";

    /// 32 768 Hz crystal output
    pub const LSE_OUT: &str = "PC15";

    /// Battery voltage divider ADC input
    pub const BATTERY_SENSE: &str = "PB1";
}

/// Timer assignments
pub mod timers {
    //! Hardware timer assignments

    /// Low-power timer borrowed for pulse ticks (clocked from LSE)
    pub const PULSE_TICK: &str = "LPTIM1";

    /// General purpose timer used by the embassy time driver
    pub const TIME_DRIVER: &str = "TIM2";
}
