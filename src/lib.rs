//! MIME content-transfer-encoding codecs and text utilities.
//!
//! This crate provides streaming codecs for the content encodings used in
//! mail and news transport:
//! - Base64 encoding with line wrapping (RFC 2045)
//! - Quoted-printable encoding (RFC 2045)
//! - Classic uuencode with begin/end framing
//! - yEnc with CRC-32 integrity checking
//! - Pass-through for 7bit/8bit/binary content
//!
//! Every codec follows the same chunked contract: feed input in pieces of
//! any size with [`Codec::process`], finish with [`Codec::flush`], and size
//! output buffers with [`Codec::estimate_output_length`]. State carried
//! across chunk boundaries makes the output independent of how the input
//! was split.
//!
//! Beyond the codecs, [`Parameter`] encodes header parameter values per
//! RFC 2047/2231 with line folding, and [`TextToFlowed`] rewraps plain
//! text as RFC 3676 format=flowed. Async streams plug in through the
//! adapters in [`filters`].

pub mod base64;
pub mod codec;
pub mod error;
pub mod filters;
pub mod flowed;
pub mod grammar;
pub mod parameter;
pub mod passthrough;
pub mod quotedprintable;
pub mod uuencode;
pub mod yencode;

// Re-export commonly used types
pub use self::base64::{Base64Decoder, Base64Encoder};
pub use codec::{Codec, ContentEncoding, NewLineFormat};
pub use error::{Error, Result};
pub use flowed::TextToFlowed;
pub use parameter::{FormatOptions, Parameter, ParameterEncodingMethod};
pub use passthrough::{PassThroughDecoder, PassThroughEncoder};
pub use quotedprintable::{QuotedPrintableDecoder, QuotedPrintableEncoder};
pub use uuencode::{UuDecoder, UuEncoder};
pub use yencode::{CrcStatus, YDecoder, YEncoder};
