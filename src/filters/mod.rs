//! Async I/O adapters that run a [`Codec`](crate::Codec) over a stream.
//!
//! The codecs themselves are synchronous call-and-return transforms; these
//! adapters move bytes between them and tokio's `AsyncRead`/`AsyncWrite`
//! traits. [`EncodeWriter`] pushes data through a codec on the way to a
//! writer, [`DecodeReader`] pulls data through a codec from a reader.
//! Either adapter works with either direction of codec; the names reflect
//! the common pairing.

mod reader;
mod writer;

pub use reader::DecodeReader;
pub use writer::EncodeWriter;
