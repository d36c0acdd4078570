//! Codec reader adapter.

use bytes::{Buf, BytesMut};
use pin_project::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use crate::codec::Codec;

const SCRATCH_SIZE: usize = 4096;

/// An `AsyncRead` adapter that pulls bytes from the inner reader and
/// transforms them through a [`Codec`].
///
/// End of input on the inner reader flushes the codec, so trailing carry
/// (padding groups, framing trailers) is delivered before this reader
/// reports EOF.
#[pin_project]
pub struct DecodeReader<C, R> {
    #[pin]
    inner: R,
    codec: C,
    /// Transformed bytes not yet handed to the caller.
    decoded: BytesMut,
    eof: bool,
}

impl<C: Codec, R: AsyncRead> DecodeReader<C, R> {
    /// Creates a new adapter running `codec` behind `inner`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mime_codecs::filters::DecodeReader;
    /// use mime_codecs::Base64Decoder;
    /// use tokio::io::AsyncReadExt;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let data = b"TWFu\n";
    /// let mut reader = DecodeReader::new(Base64Decoder::new(), &data[..]);
    /// let mut output = Vec::new();
    /// reader.read_to_end(&mut output).await?;
    /// assert_eq!(output, b"Man");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(codec: C, inner: R) -> Self {
        Self {
            inner,
            codec,
            decoded: BytesMut::new(),
            eof: false,
        }
    }

    /// The codec driving this adapter. Useful after EOF for codecs that
    /// carry post-decode state, such as a verified checksum.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Unwraps the adapter, discarding buffered decoded bytes.
    pub fn into_inner(self) -> (C, R) {
        (self.codec, self.inner)
    }
}

impl<C: Codec, R: AsyncRead> AsyncRead for DecodeReader<C, R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut this = self.project();

        loop {
            if !this.decoded.is_empty() {
                let n = this.decoded.len().min(buf.remaining());
                buf.put_slice(&this.decoded[..n]);
                this.decoded.advance(n);
                return Poll::Ready(Ok(()));
            }

            if *this.eof {
                return Poll::Ready(Ok(()));
            }

            let mut scratch = [0u8; SCRATCH_SIZE];
            let mut scratch_buf = ReadBuf::new(&mut scratch);
            ready!(this.inner.as_mut().poll_read(cx, &mut scratch_buf))?;
            let chunk = scratch_buf.filled();

            this.decoded
                .resize(this.codec.estimate_output_length(chunk.len()), 0);
            let n = if chunk.is_empty() {
                *this.eof = true;
                this.codec.flush(b"", this.decoded)
            } else {
                this.codec.process(chunk, this.decoded)
            }
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            this.decoded.truncate(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64::Base64Decoder;
    use crate::quotedprintable::QuotedPrintableDecoder;
    use crate::yencode::{YDecoder, YEncoder};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_base64_reader() {
        let data = b"TWFu\nTWE=\n";
        let mut reader = DecodeReader::new(Base64Decoder::new(), &data[..]);
        let mut output = Vec::new();
        reader.read_to_end(&mut output).await.unwrap();
        assert_eq!(output, b"ManMa");
    }

    #[tokio::test]
    async fn test_quoted_printable_reader() {
        let data = b"Hello=20World=\nstill one line";
        let mut reader = DecodeReader::new(QuotedPrintableDecoder::new(), &data[..]);
        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        assert_eq!(output, "Hello Worldstill one line");
    }

    #[tokio::test]
    async fn test_small_destination_buffer() {
        let data = b"TWFuIGlzIGRpc3Rpbmd1aXNoZWQ=\n";
        let mut reader = DecodeReader::new(Base64Decoder::new(), &data[..]);
        let mut output = Vec::new();
        let mut chunk = [0u8; 3];
        loop {
            let n = reader.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            output.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(output, b"Man is distinguished");
    }

    #[tokio::test]
    async fn test_codec_queryable_after_eof() {
        let input = b"checked payload";
        let mut encoder = YEncoder::new(input.len() as u64, "f");
        let mut encoded = vec![0u8; encoder.estimate_output_length(input.len())];
        let n = encoder.flush(input, &mut encoded).unwrap();
        encoded.truncate(n);

        let mut reader = DecodeReader::new(YDecoder::new(), &encoded[..]);
        let mut output = Vec::new();
        reader.read_to_end(&mut output).await.unwrap();

        assert_eq!(output, input);
        assert_eq!(
            reader.codec().crc_status(),
            crate::yencode::CrcStatus::Valid
        );
    }
}
