//! Signal byte and block indicator layout.
//!
//! A block indicator's top two bits give the number of length extension
//! bytes that follow it; its low six bits are the most significant bits of
//! the run length. The `0b11` prefix is reserved for [`ESCAPE`].

/// Signal byte used when none is configured.
pub const DEFAULT_SIGNAL: u8 = 0xE2;

/// Indicator value marking an escaped literal signal byte.
pub const ESCAPE: u8 = 0xFF;

/// Longest run a single frame can describe (22 bits).
pub const MAX_RUN: usize = (1 << 22) - 1;

/// Longest run described without extension bytes (6 bits).
pub const MAX_SHORT_RUN: usize = (1 << 6) - 1;

/// Longest run described with one extension byte (14 bits).
pub const MAX_MEDIUM_RUN: usize = (1 << 14) - 1;

const LENGTH_MASK: u8 = 0x3F;

/// Number of extension bytes announced by `indicator`, or `None` for the
/// reserved prefix.
pub fn extension_len(indicator: u8) -> Option<usize> {
    match indicator >> 6 {
        0 => Some(0),
        1 => Some(1),
        2 => Some(2),
        _ => None,
    }
}

/// Run length bits carried in the indicator itself.
pub fn indicator_length_bits(indicator: u8) -> usize {
    usize::from(indicator & LENGTH_MASK)
}

/// Number of extension bytes needed for a run of `count` bytes.
pub fn extension_len_for(count: usize) -> usize {
    if count <= MAX_SHORT_RUN {
        0
    } else if count <= MAX_MEDIUM_RUN {
        1
    } else {
        2
    }
}
