//! Oregon Scientific v2.1 Protocol
//!
//! Frame layout and the two integrity checks carried in every frame:
//! - Simple nibble sum (byte 10)
//! - CRC-8 with a protocol-specific seed (byte 11)

pub mod checksum;
pub mod frame;

pub use frame::{Frame, FrameEncoder};
