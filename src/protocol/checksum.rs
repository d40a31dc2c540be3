//! Frame Checksums
//!
//! Both checks run over a subset of the frame's 24 nibbles. Nibbles are
//! numbered low nibble first: nibble `2n` is the low half of byte `n`,
//! nibble `2n + 1` the high half. Bit `i` of an inclusion mask selects
//! nibble `i`.
//!
//! The masks leave out the preamble and the checksum bytes themselves.
//! The CRC additionally skips the rolling ID.

/// Nibbles covered by the simple sum (sync through humidity)
pub const SUM_MASK: u32 = 0x000f_ffe0;

/// Nibbles covered by the CRC (as the sum, without the rolling ID)
pub const CRC_MASK: u32 = 0x000f_f3e0;

/// CRC register seed
pub const CRC_SEED: u8 = 0x42;

/// CRC-8-CCITT polynomial (x^8 + x^2 + x + 1, implicit x^8)
pub const CRC_POLY: u8 = 0x07;

/// Number of nibbles addressable by a mask
pub const NIBBLE_COUNT: usize = 24;

/// Read nibble `index` of `data` (low nibble of each byte first)
#[must_use]
pub fn nibble(data: &[u8], index: usize) -> u8 {
    (data[index / 2] >> ((index % 2) * 4)) & 0x0f
}

/// Iterate over the nibbles selected by `mask`, in transmission order
pub fn masked_nibbles(data: &[u8], mask: u32) -> impl Iterator<Item = u8> + '_ {
    let count = NIBBLE_COUNT.min(data.len() * 2);
    (0..count)
        .filter(move |&i| (mask >> i) & 0x1 != 0)
        .map(move |i| nibble(data, i))
}

/// Simple checksum: 8-bit sum of the selected nibbles with end-around carry
#[must_use]
pub fn simple_sum(data: &[u8], mask: u32) -> u8 {
    let mut sum: u16 = 0;

    for n in masked_nibbles(data, mask) {
        sum += u16::from(n);
        sum += (sum >> 8) & 0x1; // Fold the carry back in
        sum &= 0xff;
    }

    sum as u8
}

/// Shift one bit into the CRC register
const fn crc_step(reg: u8, bit: u8) -> u8 {
    let carry = reg & 0x80 != 0;
    let shifted = (reg << 1) | (bit & 0x1);
    if carry {
        shifted ^ CRC_POLY
    } else {
        shifted
    }
}

/// CRC-8 over the selected nibbles, each shifted in MSB-first
///
/// After the data, eight zero bits are shifted through to drain the
/// register.
#[must_use]
pub fn crc8(data: &[u8], mask: u32, seed: u8) -> u8 {
    let mut reg = seed;

    for n in masked_nibbles(data, mask) {
        for j in (0..4).rev() {
            reg = crc_step(reg, n >> j);
        }
    }

    for _ in 0..8 {
        reg = crc_step(reg, 0);
    }

    reg
}

/// Simple sum with the protocol mask
#[must_use]
pub fn frame_sum(data: &[u8]) -> u8 {
    simple_sum(data, SUM_MASK)
}

/// CRC with the protocol mask and seed
#[must_use]
pub fn frame_crc(data: &[u8]) -> u8 {
    crc8(data, CRC_MASK, CRC_SEED)
}
