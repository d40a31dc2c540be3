//! Hardware Abstraction Layer
//!
//! Traits for the borrowed pulse clock and the RF data line, plus the
//! STM32G474 backend used on the real sensor node. The traits compile on
//! the host so the transmitter can be exercised without hardware.

pub mod gpio;
pub mod timer;

#[cfg(feature = "embedded")]
pub mod lptim;
