//! Radio Control Logic
//!
//! Turns an encoded frame into timed on/off pulses on the RF data line.

pub mod pulse;
pub mod transmit;
