//! Sensor Interface
//!
//! The transmitter does not talk to the humidity sensor itself. Whatever
//! drives the sensor (power sequencing, warm-up, discarding bad readings)
//! hands over a [`Reading`] through this interface.

/// One temperature/humidity sample ready for transmission
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Reading {
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// Battery below the low-voltage threshold
    pub low_battery: bool,
}

impl Reading {
    /// Create a reading with the battery flag cleared
    #[must_use]
    pub const fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature,
            humidity,
            low_battery: false,
        }
    }

    /// Set the low-battery flag
    #[must_use]
    pub const fn with_low_battery(mut self, low: bool) -> Self {
        self.low_battery = low;
        self
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Reading {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{}C {}% batt_low={}",
            self.temperature,
            self.humidity,
            self.low_battery
        );
    }
}

/// Source of readings
///
/// Implementations decide what counts as a valid reading; anything they
/// return is encoded as-is.
pub trait Sensor {
    /// Error returned when no valid reading is available
    type Error;

    /// Take one reading
    ///
    /// # Errors
    ///
    /// Returns the implementation's error when the sensor could not produce
    /// a plausible value.
    fn read(&mut self) -> Result<Reading, Self::Error>;
}
