//! Oregon Scientific v2.1 Sensor Firmware Library
//!
//! This library turns temperature/humidity readings into Oregon Scientific
//! v2.1 frames and sends them through a 433.92 MHz on/off-keyed transmitter
//! with tick-accurate pulse timing, so off-the-shelf weather stations can
//! display them.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RADIO LAYER                             │
//! │  PrecisionTransmitter (bursts, pause)  │  PulseEncoder       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     PROTOCOL LAYER                           │
//! │  FrameEncoder (12-byte frame)  │  Checksum / CRC-8           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    HAL / DRIVER LAYER                        │
//! │  ClockController + TickWaiter  │  RfLine (GPIO)  │  LPTIM1   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Type-driven design**: `Channel` can only hold 1, 2 or 3
//! - **No unsafe in application code**: All unsafe isolated in the LPTIM backend
//! - **Functional core, imperative shell**: Frame encoding is pure; timing
//!   and pins sit behind traits that can be faked on the host
//! - **Scoped hardware borrow**: The tick clock is restored when the
//!   `ClockSession` guard drops, on every exit path
//! - **Explicit error handling**: All fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Tick clock and RF line traits, STM32 LPTIM1 backend.
pub mod hal;

/// Oregon Scientific v2.1 Protocol
///
/// Frame layout, simple sum and CRC-8.
pub mod protocol;

/// Radio Control Logic
///
/// Pulse encoding and the burst transmitter.
pub mod radio;

/// Power Management
///
/// Battery monitoring for the low-battery flag.
pub mod power;

/// Sensor Interface
///
/// Readings handed over by the sensor driver.
pub mod sensor;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::hal::timer::{ClockController, TickWaiter, TimerState};
    pub use crate::protocol::{Frame, FrameEncoder};
    pub use crate::radio::transmit::{PrecisionTransmitter, TxError, TxPhase};
    pub use crate::sensor::{Reading, Sensor};
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal::delay::DelayNs;
    pub use embedded_hal::digital::OutputPin;

    #[cfg(feature = "embedded")]
    pub use crate::hal::lptim::{LptimClock, Os21Transmitter};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
