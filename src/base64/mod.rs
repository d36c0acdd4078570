//! Base64 encoder and decoder (RFC 2045 section 6.8).

mod decoder;
mod encoder;

pub use decoder::Base64Decoder;
pub use encoder::Base64Encoder;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Inverse of [`ALPHABET`]; `0xFF` marks bytes outside the alphabet.
const fn build_rank() -> [u8; 256] {
    let mut table = [0xFFu8; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const RANK: [u8; 256] = build_rank();
