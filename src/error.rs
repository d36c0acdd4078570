//! Error types for the mime-codecs crate.

use std::io;
use thiserror::Error;

/// The main error type for the mime-codecs crate.
///
/// Argument errors are detected before any output is written, so a failed
/// call never leaves partial output in the caller's buffer. Malformed input
/// on the decode path is deliberately *not* an error: decoders recover
/// locally and keep going (see the individual decoder docs).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The caller-supplied output buffer is smaller than
    /// `estimate_output_length` requires for the given input.
    #[error("output buffer too small: need {needed} bytes, got {available}")]
    OutputBufferTooSmall {
        /// Minimum output buffer length for this input length.
        needed: usize,
        /// Length of the buffer that was supplied.
        available: usize,
    },

    /// Invalid parameter name or value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unrecognized Content-Transfer-Encoding token
    #[error("Invalid content encoding: {0}")]
    InvalidEncoding(String),
}

/// Specialized Result type for mime-codecs operations.
pub type Result<T> = std::result::Result<T, Error>;
