//! yEnc encoder and decoder, the Usenet binary encoding with minimal
//! expansion (<http://www.yenc.org>).

mod decoder;
mod encoder;

pub use decoder::{CrcStatus, YDecoder};
pub use encoder::YEncoder;

/// Default encoded line width per the yEnc 1.3 draft.
const DEFAULT_LINE_LENGTH: usize = 128;

/// The escape character and the offsets applied to escaped bytes.
const ESCAPE: u8 = b'=';
const SHIFT: u8 = 42;
const ESCAPE_SHIFT: u8 = 64;
