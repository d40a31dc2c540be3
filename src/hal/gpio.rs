//! GPIO Abstractions
//!
//! Type-safe wrapper for the transmitter data line.

use embedded_hal::digital::OutputPin;

use crate::types::Level;

/// Data input of the 433 MHz on/off-keyed transmitter
///
/// High keys the carrier. The wrapper remembers the last level written so
/// callers can check the carrier is off after a burst.
pub struct RfLine<P> {
    pin: P,
    level: Level,
}

impl<P: OutputPin> RfLine<P> {
    /// Take the pin and drive it low (carrier off)
    ///
    /// # Errors
    ///
    /// Returns the pin error if the initial write fails.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self {
            pin,
            level: Level::Low,
        })
    }

    /// Drive the line to `level`
    ///
    /// # Errors
    ///
    /// Returns the pin error if the write fails; the remembered level is
    /// left unchanged in that case.
    pub fn set(&mut self, level: Level) -> Result<(), P::Error> {
        match level {
            Level::High => self.pin.set_high()?,
            Level::Low => self.pin.set_low()?,
        }
        self.level = level;
        Ok(())
    }

    /// Turn the carrier off
    ///
    /// # Errors
    ///
    /// Returns the pin error if the write fails.
    pub fn off(&mut self) -> Result<(), P::Error> {
        self.set(Level::Low)
    }

}

impl<P> RfLine<P> {
    /// Last level written
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Check if the carrier is keyed
    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        self.level.is_high()
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}
