//! Shared types used across the sensor firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at construction time so the frame encoder never sees an invalid value.

use core::fmt;

/// Errors reported by the sensor firmware
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Channel number outside 1..=3
    InvalidChannel(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(ch) => write!(f, "invalid channel {ch} (expected 1, 2 or 3)"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidChannel(ch) => defmt::write!(f, "InvalidChannel({})", ch),
        }
    }
}

/// Receiver channel selected on the sensor (1, 2 or 3)
///
/// Weather stations listen on up to three channels. On the air the channel
/// is sent as a one-hot nibble: 1 → `0x1`, 2 → `0x2`, 3 → `0x4`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Channel 1
    pub const ONE: Self = Self(1);

    /// Channel 2
    pub const TWO: Self = Self(2);

    /// Channel 3
    pub const THREE: Self = Self(3);

    /// Create a channel from its number, returns None if not 1..=3
    #[must_use]
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= 3 {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Get the channel number (1..=3)
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Get the one-hot channel code sent on the air
    #[must_use]
    pub const fn code(self) -> u8 {
        1 << (self.0 - 1)
    }

    /// Look up the channel for an on-air code
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x1 => Some(Self::ONE),
            0x2 => Some(Self::TWO),
            0x4 => Some(Self::THREE),
            _ => None,
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u8> for Channel {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number).ok_or(Error::InvalidChannel(number))
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channel({})", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Channel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CH{}", self.0);
    }
}

/// Per-boot sensor identifier
///
/// Chosen by the host at startup (usually from a hardware RNG) so that two
/// sensors on the same channel can be told apart by the receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RollingId(u8);

impl RollingId {
    /// Wrap a raw rolling ID
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for RollingId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RollingId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ID 0x{:02X}", self.0);
    }
}

/// Logic level of the RF data line (carrier keyed when high)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Level {
    /// Carrier off
    #[default]
    Low,
    /// Carrier on
    High,
}

impl Level {
    /// Get the opposite level
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }

    /// Check if the carrier is keyed
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Level {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(f, "L"),
            Self::High => defmt::write!(f, "H"),
        }
    }
}
