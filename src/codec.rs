//! The streaming codec contract shared by every content-transfer-encoding.
//!
//! Encoders and decoders are synchronous, buffer-to-buffer transforms that
//! carry partial state (unfinished byte groups, pending escape sequences,
//! running checksums) across calls. A given instance belongs to exactly one
//! logical stream; use [`Codec::clone_codec`] to fork an independent instance
//! with the same state, for example to compute a trial encoding without
//! disturbing a checkpointed stream.

use std::fmt;
use std::str::FromStr;

use crate::base64::{Base64Decoder, Base64Encoder};
use crate::error::{Error, Result};
use crate::passthrough::{PassThroughDecoder, PassThroughEncoder};
use crate::quotedprintable::{QuotedPrintableDecoder, QuotedPrintableEncoder};
use crate::uuencode::{UuDecoder, UuEncoder};
use crate::yencode::{YDecoder, YEncoder};

/// A content transfer encoding, as carried in a Content-Transfer-Encoding
/// header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentEncoding {
    /// No encoding declared.
    #[default]
    None,
    /// 7bit: US-ASCII text, lines no longer than 998 octets.
    SevenBit,
    /// 8bit: arbitrary octets, but still line-oriented.
    EightBit,
    /// binary: arbitrary octets, no line structure.
    Binary,
    /// base64 (RFC 2045 section 6.8).
    Base64,
    /// quoted-printable (RFC 2045 section 6.7).
    QuotedPrintable,
    /// The historic unix uuencode format.
    UUEncode,
    /// The Usenet yEnc format.
    YEncode,
}

impl ContentEncoding {
    /// Returns the canonical header token for this encoding.
    ///
    /// [`ContentEncoding::None`] has no token and maps to the empty string.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentEncoding::None => "",
            ContentEncoding::SevenBit => "7bit",
            ContentEncoding::EightBit => "8bit",
            ContentEncoding::Binary => "binary",
            ContentEncoding::Base64 => "base64",
            ContentEncoding::QuotedPrintable => "quoted-printable",
            ContentEncoding::UUEncode => "x-uuencode",
            ContentEncoding::YEncode => "x-yencode",
        }
    }

    /// Creates an encoder for this content encoding.
    ///
    /// `None`, `SevenBit`, `EightBit` and `Binary` all produce a
    /// pass-through encoder tagged with the respective encoding. The
    /// uuencode and yEnc encoders are created with placeholder framing
    /// values; construct [`UuEncoder`] or [`YEncoder`] directly to control
    /// the file name, mode and size written into the begin lines.
    pub fn new_encoder(self) -> Box<dyn Codec> {
        match self {
            ContentEncoding::Base64 => Box::new(Base64Encoder::new()),
            ContentEncoding::QuotedPrintable => Box::new(QuotedPrintableEncoder::new()),
            ContentEncoding::UUEncode => Box::new(UuEncoder::new(0o644, "file")),
            ContentEncoding::YEncode => Box::new(YEncoder::new(0, "file")),
            other => Box::new(PassThroughEncoder::new(other)),
        }
    }

    /// Creates a decoder for this content encoding.
    pub fn new_decoder(self) -> Box<dyn Codec> {
        match self {
            ContentEncoding::Base64 => Box::new(Base64Decoder::new()),
            ContentEncoding::QuotedPrintable => Box::new(QuotedPrintableDecoder::new()),
            ContentEncoding::UUEncode => Box::new(UuDecoder::new()),
            ContentEncoding::YEncode => Box::new(YDecoder::new()),
            other => Box::new(PassThroughDecoder::new(other)),
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentEncoding {
    type Err = Error;

    /// Parses a Content-Transfer-Encoding header value.
    ///
    /// Matching is case-insensitive and accepts the common non-canonical
    /// aliases seen in the wild (`7-bit`, `uuencode`, `x-uue`, ...).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(ContentEncoding::None),
            "7bit" | "7-bit" => Ok(ContentEncoding::SevenBit),
            "8bit" | "8-bit" => Ok(ContentEncoding::EightBit),
            "binary" => Ok(ContentEncoding::Binary),
            "base64" => Ok(ContentEncoding::Base64),
            "quoted-printable" => Ok(ContentEncoding::QuotedPrintable),
            "x-uuencode" | "uuencode" | "x-uue" => Ok(ContentEncoding::UUEncode),
            "x-yencode" | "yencode" | "yenc" => Ok(ContentEncoding::YEncode),
            other => Err(Error::InvalidEncoding(other.to_string())),
        }
    }
}

/// The newline sequence written by line-wrapping encoders and converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewLineFormat {
    /// Unix-style `\n`.
    #[default]
    Lf,
    /// Wire-format `\r\n`.
    CrLf,
}

impl NewLineFormat {
    /// The newline sequence itself.
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineFormat::Lf => "\n",
            NewLineFormat::CrLf => "\r\n",
        }
    }

    /// The newline sequence as bytes.
    pub fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

/// The operation set shared by every encoder and decoder in this crate.
///
/// `process` and `flush` always consume the entire input slice and return
/// only the number of bytes written to `output`; whatever cannot be emitted
/// yet (an unfinished base64 group, half an escape sequence) is carried in
/// the codec's internal state until the next call. The caller owns and sizes
/// the output buffer: it must be at least
/// [`estimate_output_length`](Codec::estimate_output_length) of the input
/// length, or the call fails before writing anything.
pub trait Codec: Send {
    /// The content encoding this codec implements, fixed at construction.
    fn encoding(&self) -> ContentEncoding;

    /// Returns an upper bound on the number of bytes that processing
    /// `input_length` bytes of input can produce, including any flush
    /// overhead and pending carry state.
    fn estimate_output_length(&self, input_length: usize) -> usize;

    /// Encodes or decodes `input` into `output`, updating internal carry
    /// state, and returns the number of bytes written.
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Like [`process`](Codec::process), but also finalizes the stream:
    /// emits padding, terminating frame lines, checksum trailers and any
    /// bytes still held in carry state.
    fn flush(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Clears all carry state so the instance can start a new stream.
    fn reset(&mut self);

    /// Returns a new boxed instance with identical carry state. The clone
    /// and the original evolve independently from this point on.
    fn clone_codec(&self) -> Box<dyn Codec>;
}

impl Clone for Box<dyn Codec> {
    fn clone(&self) -> Self {
        self.clone_codec()
    }
}

impl fmt::Debug for dyn Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("encoding", &self.encoding())
            .finish_non_exhaustive()
    }
}

/// Verifies that `output` can hold `needed` bytes before a codec writes
/// anything into it.
pub(crate) fn check_output_length(needed: usize, output: &[u8]) -> Result<()> {
    if output.len() < needed {
        return Err(Error::OutputBufferTooSmall {
            needed,
            available: output.len(),
        });
    }

    Ok(())
}
