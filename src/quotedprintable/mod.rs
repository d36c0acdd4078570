//! Quoted-printable encoder and decoder (RFC 2045 section 6.7).

mod decoder;
mod encoder;

pub use decoder::QuotedPrintableDecoder;
pub use encoder::QuotedPrintableEncoder;

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}
