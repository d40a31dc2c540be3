//! Frame Encoder
//!
//! Builds the 12-byte Oregon Scientific v2.1 frame for a THGR-style
//! temperature/humidity sensor (sensor ID `1d20`).
//!
//! # Layout
//!
//! Nibbles are listed high nibble first to match the byte values; on the
//! air each byte goes out LSB-first, so the low nibble is sent first.
//!
//! ```text
//! byte  0  ff   preamble
//! byte  1  ff   preamble
//! byte  2  1a   sensor ID | sync (0xa)
//! byte  3  2d   sensor ID
//! byte  4  c0   channel code | sensor ID
//! byte  5  rr   rolling ID
//! byte  6  t8   temperature 10^-1 | 0x8 + battery low (0x4)
//! byte  7  tt   temperature 10^1 | temperature 10^0
//! byte  8  hs   humidity 10^0 | sign (bits 3-2) + temperature 10^2 (bits 1-0)
//! byte  9  8h   fixed | humidity 10^1
//! byte 10  ss   simple sum
//! byte 11  cc   CRC-8
//! ```

use core::fmt;

use crate::config::{
    FRAME_LEN, MAX_HUMIDITY_PCT, MAX_TEMPERATURE_C, MIN_HUMIDITY_PCT, MIN_TEMPERATURE_C,
};
use crate::protocol::checksum;
use crate::sensor::Reading;
use crate::types::{Channel, RollingId};

/// Byte offsets of the frame fields
pub mod offset {
    /// First preamble byte
    pub const PREAMBLE: usize = 0;
    /// Sync nibble and first sensor ID nibble
    pub const SYNC: usize = 2;
    /// Sensor ID (low) and channel code (high)
    pub const CHANNEL: usize = 4;
    /// Rolling ID
    pub const ROLLING_ID: usize = 5;
    /// Battery flag (low) and temperature tenths (high)
    pub const BATTERY: usize = 6;
    /// Temperature ones (low) and tens (high)
    pub const TEMPERATURE: usize = 7;
    /// Temperature hundreds, sign (low) and humidity ones (high)
    pub const SIGN: usize = 8;
    /// Humidity tens (low)
    pub const HUMIDITY: usize = 9;
    /// Simple sum
    pub const CHECKSUM: usize = 10;
    /// CRC-8
    pub const CRC: usize = 11;
}

/// Low-battery flag in byte 6
pub const LOW_BATTERY_BIT: u8 = 0x04;

/// Bit of unknown meaning that real sensors always set in byte 6
pub const FIXED_BATTERY_BIT: u8 = 0x08;

/// Sign value for negative temperatures (byte 8, bits 3-2)
pub const NEGATIVE_SIGN: u8 = 0x08;

/// Frame with the fields that never change
const TEMPLATE: [u8; FRAME_LEN] = [
    0xff, // Preamble
    0xff,
    0x1a, // Sync nibble and sensor ID
    0x2d,
    0x00,
    0x00,
    FIXED_BATTERY_BIT,
    0x00,
    0x00,
    0x80, // Unknown
    0x00,
    0x00,
];

/// An encoded 12-byte frame
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Wrap raw frame bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Get a single byte
    #[must_use]
    pub const fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Get nibble `index` (0..24, low nibble of each byte first)
    #[must_use]
    pub fn nibble(&self, index: usize) -> u8 {
        checksum::nibble(&self.0, index)
    }

    /// Iterate over all 96 bits in transmission order
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..FRAME_LEN * 8).map(move |i| (self.0[i / 8] >> (i % 8)) & 0x1 != 0)
    }

    /// Stored simple sum
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.0[offset::CHECKSUM]
    }

    /// Stored CRC
    #[must_use]
    pub const fn crc(&self) -> u8 {
        self.0[offset::CRC]
    }

    /// Replace the bits selected by `mask` in byte `index`
    fn write_bits(&mut self, index: usize, mask: u8, value: u8) {
        self.0[index] = (self.0[index] & !mask) | (value & mask);
    }

    fn write_low_nibble(&mut self, index: usize, value: u8) {
        self.write_bits(index, 0x0f, value);
    }

    fn write_high_nibble(&mut self, index: usize, value: u8) {
        self.write_bits(index, 0xf0, value << 4);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self(TEMPLATE)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Frame(")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02x}")?;
        }
        f.write_str(")")
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Frame({=[u8]:x})", &self.0[..]);
    }
}

/// Decimal digits of a temperature as carried in the frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TemperatureDigits {
    /// Below zero
    pub negative: bool,
    /// 10^2 digit (0..=3)
    pub hundreds: u8,
    /// 10^1 digit
    pub tens: u8,
    /// 10^0 digit
    pub ones: u8,
    /// 10^-1 digit
    pub tenths: u8,
}

impl TemperatureDigits {
    /// Split a temperature into sign and digits
    ///
    /// The magnitude is scaled to tenths and truncated toward zero, the way
    /// the reference sensors do it; -0.05 therefore encodes as "-0.0".
    #[must_use]
    pub fn from_celsius(celsius: f32) -> Self {
        let t = clamp_temperature(celsius);
        let negative = t < 0.0;
        let scaled = (t * if negative { -10.0 } else { 10.0 }) as i32;

        Self {
            negative,
            hundreds: digit(scaled, 1000),
            tens: digit(scaled, 100),
            ones: digit(scaled, 10),
            tenths: digit(scaled, 1),
        }
    }
}

/// Decimal digits of a relative humidity as carried in the frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HumidityDigits {
    /// 10^1 digit
    pub tens: u8,
    /// 10^0 digit
    pub ones: u8,
}

impl HumidityDigits {
    /// Round a humidity to the nearest percent and split it into digits
    #[must_use]
    pub fn from_percent(percent: f32) -> Self {
        let h = clamp_humidity(percent) + 0.5;
        let scaled = (h * 10.0) as i32;

        Self {
            tens: digit(scaled, 100),
            ones: digit(scaled, 10),
        }
    }
}

/// Decimal digit of `value / divisor`
fn digit(value: i32, divisor: i32) -> u8 {
    ((value / divisor) % 10) as u8
}

/// Clamp to the range the frame can represent (NaN passes through)
fn clamp_temperature(celsius: f32) -> f32 {
    celsius.clamp(MIN_TEMPERATURE_C, MAX_TEMPERATURE_C)
}

fn clamp_humidity(percent: f32) -> f32 {
    percent.clamp(MIN_HUMIDITY_PCT, MAX_HUMIDITY_PCT)
}

/// Maintains one frame and keeps its checksums consistent
#[derive(Clone, Debug)]
pub struct FrameEncoder {
    frame: Frame,
    channel: Channel,
    rolling_id: RollingId,
}

impl FrameEncoder {
    /// Create an encoder for a channel and rolling ID
    #[must_use]
    pub fn new(channel: Channel, rolling_id: RollingId) -> Self {
        let mut encoder = Self {
            frame: Frame::default(),
            channel,
            rolling_id,
        };
        encoder.initialize(channel, rolling_id);
        encoder
    }

    /// Write the per-sensor fields (sync, sensor ID, channel, rolling ID)
    ///
    /// Calling this again with the same arguments leaves the frame unchanged.
    pub fn initialize(&mut self, channel: Channel, rolling_id: RollingId) {
        let bytes = &TEMPLATE[offset::PREAMBLE..offset::CHANNEL];
        self.frame.0[offset::PREAMBLE..offset::CHANNEL].copy_from_slice(bytes);
        self.frame.write_low_nibble(offset::CHANNEL, TEMPLATE[offset::CHANNEL]);

        self.set_channel(channel);
        self.set_rolling_id(rolling_id);
    }

    fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
        self.frame.write_high_nibble(offset::CHANNEL, channel.code());
    }

    fn set_rolling_id(&mut self, rolling_id: RollingId) {
        self.rolling_id = rolling_id;
        self.frame.0[offset::ROLLING_ID] = rolling_id.value();
    }

    /// Get the configured channel
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Get the configured rolling ID
    #[must_use]
    pub const fn rolling_id(&self) -> RollingId {
        self.rolling_id
    }

    /// Write the temperature sign and digits
    pub fn set_temperature(&mut self, celsius: f32) {
        let d = TemperatureDigits::from_celsius(celsius);
        let sign = if d.negative { NEGATIVE_SIGN } else { 0x00 };

        self.frame.write_high_nibble(offset::BATTERY, d.tenths);
        self.frame.write_low_nibble(offset::TEMPERATURE, d.ones);
        self.frame.write_high_nibble(offset::TEMPERATURE, d.tens);
        self.frame.write_bits(offset::SIGN, 0x03, d.hundreds);
        self.frame.write_bits(offset::SIGN, 0x0c, sign);
    }

    /// Write the humidity digits (rounded to the nearest percent)
    pub fn set_humidity(&mut self, percent: f32) {
        let d = HumidityDigits::from_percent(percent);

        self.frame.write_high_nibble(offset::SIGN, d.ones);
        self.frame.write_low_nibble(offset::HUMIDITY, d.tens);
    }

    /// Set or clear the low-battery flag
    pub fn set_low_battery(&mut self, low: bool) {
        let flag = if low { LOW_BATTERY_BIT } else { 0x00 };
        self.frame.write_bits(offset::BATTERY, 0x07, flag);
    }

    /// Recompute the simple sum and CRC from the current contents
    pub fn compute_checksums(&mut self) {
        self.frame.0[offset::CHECKSUM] = checksum::frame_sum(&self.frame.0);
        self.frame.0[offset::CRC] = checksum::frame_crc(&self.frame.0);
    }

    /// Encode a full reading and return the finished frame
    pub fn encode(&mut self, reading: &Reading) -> &Frame {
        self.set_temperature(reading.temperature);
        self.set_humidity(reading.humidity);
        self.set_low_battery(reading.low_battery);
        self.compute_checksums();
        &self.frame
    }

    /// Read-only view of the frame
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Raw bytes of the frame
    #[must_use]
    pub const fn frame_bytes(&self) -> &[u8; FRAME_LEN] {
        self.frame.as_bytes()
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(Channel::default(), RollingId::default())
    }
}
