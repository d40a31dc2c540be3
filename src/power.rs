//! Power Management
//!
//! Battery monitoring for the low-battery flag carried in every frame.

use crate::config::{LOW_BATTERY_HYSTERESIS_MV, LOW_BATTERY_MV};

/// Battery voltage reading
#[derive(Clone, Copy, Debug)]
pub struct BatteryVoltage {
    /// Raw ADC reading (12-bit)
    raw: u16,
    /// Voltage divider ratio
    divider_ratio: f32,
    /// Reference voltage
    vref: f32,
}

impl BatteryVoltage {
    /// Create from ADC reading
    #[must_use]
    pub const fn from_adc(raw: u16, divider_ratio: f32, vref: f32) -> Self {
        Self {
            raw,
            divider_ratio,
            vref,
        }
    }

    /// Get voltage in volts
    #[must_use]
    pub fn voltage(&self) -> f32 {
        (f32::from(self.raw) / 4095.0) * self.vref * self.divider_ratio
    }

    /// Get voltage in millivolts
    #[must_use]
    pub fn millivolts(&self) -> u16 {
        (self.voltage() * 1000.0) as u16
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BatteryVoltage {
    fn format(&self, f: defmt::Formatter) {
        let mv = self.millivolts();
        defmt::write!(f, "{}.{:03}V", mv / 1000, mv % 1000);
    }
}

/// Low-battery detector with hysteresis
///
/// The flag sets when the battery drops below the threshold and clears only
/// once it recovers above threshold + hysteresis, so a battery hovering at
/// the threshold does not toggle the flag between transmissions.
#[derive(Clone, Copy, Debug)]
pub struct BatteryMonitor {
    threshold_mv: u16,
    hysteresis_mv: u16,
    low: bool,
}

impl BatteryMonitor {
    /// Create a monitor with explicit thresholds
    #[must_use]
    pub const fn new(threshold_mv: u16, hysteresis_mv: u16) -> Self {
        Self {
            threshold_mv,
            hysteresis_mv,
            low: false,
        }
    }

    /// Feed a new voltage measurement, returns the updated flag
    pub fn update(&mut self, millivolts: u16) -> bool {
        if self.low {
            if millivolts >= self.threshold_mv.saturating_add(self.hysteresis_mv) {
                self.low = false;
            }
        } else if millivolts < self.threshold_mv {
            self.low = true;
        }
        self.low
    }

    /// Feed an ADC-based reading
    pub fn update_from(&mut self, reading: BatteryVoltage) -> bool {
        self.update(reading.millivolts())
    }

    /// Check if the battery is currently flagged low
    #[must_use]
    pub const fn is_low(&self) -> bool {
        self.low
    }

    /// Get the threshold in millivolts
    #[must_use]
    pub const fn threshold_mv(&self) -> u16 {
        self.threshold_mv
    }
}

impl Default for BatteryMonitor {
    fn default() -> Self {
        Self::new(LOW_BATTERY_MV, LOW_BATTERY_HYSTERESIS_MV)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BatteryMonitor {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Battery(low={}, <{}mV)", self.low, self.threshold_mv);
    }
}
