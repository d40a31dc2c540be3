//! Pulse Encoding
//!
//! Every frame bit is sent as two one-tick pulses, inverted half first:
//!
//! ```text
//! bit 1:  _|‾      (low, high)
//! bit 0:  ‾|_      (high, low)
//! ```
//!
//! Bits are taken LSB-first from each byte, byte 0 first, which gives
//! 192 pulses per 12-byte frame.

use heapless::Vec;

use crate::config::PULSES_PER_BURST;
use crate::protocol::Frame;
use crate::types::Level;

/// Pulse pair for one data bit
#[must_use]
pub const fn bit_pulses(bit: bool) -> [Level; 2] {
    if bit {
        [Level::Low, Level::High]
    } else {
        [Level::High, Level::Low]
    }
}

/// Iterator over the line levels of one burst
#[derive(Clone, Debug)]
pub struct PulseEncoder {
    frame: Frame,
    /// Next pulse index (0..PULSES_PER_BURST)
    position: usize,
}

impl PulseEncoder {
    /// Start encoding a frame
    #[must_use]
    pub const fn new(frame: Frame) -> Self {
        Self { frame, position: 0 }
    }

    /// Data bit at `index` (0..96)
    fn bit(&self, index: usize) -> bool {
        (self.frame.byte(index / 8) >> (index % 8)) & 0x1 != 0
    }

    /// Pulses not yet produced
    #[must_use]
    pub const fn remaining(&self) -> usize {
        PULSES_PER_BURST - self.position
    }

    /// Collect all pulses of a frame
    #[must_use]
    pub fn trace(frame: &Frame) -> Vec<Level, PULSES_PER_BURST> {
        Self::new(*frame).collect()
    }
}

impl Iterator for PulseEncoder {
    type Item = Level;

    fn next(&mut self) -> Option<Level> {
        if self.position >= PULSES_PER_BURST {
            return None;
        }

        let pair = bit_pulses(self.bit(self.position / 2));
        let level = pair[self.position % 2];
        self.position += 1;
        Some(level)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for PulseEncoder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_is_low_then_high() {
        assert_eq!(bit_pulses(true), [Level::Low, Level::High]);
        assert_eq!(bit_pulses(false), [Level::High, Level::Low]);
    }

    #[test]
    fn preamble_pulses() {
        let frame = Frame::from_bytes([0xff; 12]);
        let pulses = PulseEncoder::trace(&frame);
        assert_eq!(pulses.len(), PULSES_PER_BURST);
        assert!(pulses.chunks(2).all(|p| p == [Level::Low, Level::High]));
    }

    #[test]
    fn lsb_goes_first() {
        let mut bytes = [0u8; 12];
        bytes[0] = 0x01;
        let mut enc = PulseEncoder::new(Frame::from_bytes(bytes));
        assert_eq!(enc.len(), 192);
        assert_eq!(enc.next(), Some(Level::Low));
        assert_eq!(enc.next(), Some(Level::High));
        assert_eq!(enc.next(), Some(Level::High));
        assert_eq!(enc.next(), Some(Level::Low));
        assert_eq!(enc.len(), 188);
    }
}
