//! UUEncode encoder and decoder, the historic unix `uuencode(1)` format.

mod decoder;
mod encoder;

pub use decoder::UuDecoder;
pub use encoder::UuEncoder;

/// Raw bytes per encoded line.
const BYTES_PER_LINE: usize = 45;

/// Maps a 6-bit value into the printable uuencode range, with zero written
/// as back-tick rather than space.
fn uu_encode_char(value: u8) -> u8 {
    if value == 0 {
        b'`'
    } else {
        value + 0x20
    }
}

/// Reverses [`uu_encode_char`]. Accepts both the space and back-tick zero
/// conventions.
fn uu_decode_char(c: u8) -> u8 {
    c.wrapping_sub(0x20) & 0x3F
}
