//! Codec writer adapter.

use bytes::{Buf, BytesMut};
use pin_project::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::AsyncWrite;

use crate::codec::Codec;

/// An `AsyncWrite` adapter that transforms everything written through a
/// [`Codec`] before handing it to the inner writer.
///
/// The codec's final carry is emitted at shutdown, so [`close`] (or an
/// explicit `poll_shutdown`) must run for the output to be complete.
///
/// [`close`]: EncodeWriter::close
#[pin_project]
pub struct EncodeWriter<C, W> {
    #[pin]
    inner: W,
    codec: C,
    /// Transformed bytes not yet accepted by the inner writer.
    pending: BytesMut,
    finished: bool,
}

impl<C: Codec, W: AsyncWrite> EncodeWriter<C, W> {
    /// Creates a new adapter running `codec` in front of `inner`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mime_codecs::filters::EncodeWriter;
    /// use mime_codecs::Base64Encoder;
    /// use tokio::io::AsyncWriteExt;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut output = Vec::new();
    /// let mut writer = EncodeWriter::new(Base64Encoder::new(), &mut output);
    /// writer.write_all(b"Hello World").await?;
    /// writer.close().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(codec: C, inner: W) -> Self {
        Self {
            inner,
            codec,
            pending: BytesMut::new(),
            finished: false,
        }
    }

    /// The codec driving this adapter.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Unwraps the adapter. Pending bytes and the codec's carry are
    /// discarded; call [`close`](EncodeWriter::close) first for complete
    /// output.
    pub fn into_inner(self) -> (C, W) {
        (self.codec, self.inner)
    }

    /// Closes the writer, flushing the codec and the inner writer.
    ///
    /// This must be called to ensure all data is written.
    pub async fn close(self) -> io::Result<()> {
        let mut pinned = Box::pin(self);
        futures::future::poll_fn(|cx| pinned.as_mut().poll_shutdown(cx)).await
    }
}

impl<C: Codec, W: AsyncWrite> AsyncWrite for EncodeWriter<C, W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut this = self.project();

        ready!(drain_pending(&mut this.inner, this.pending, cx))?;

        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        this.pending
            .resize(this.codec.estimate_output_length(buf.len()), 0);
        let n = this
            .codec
            .process(buf, this.pending)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        this.pending.truncate(n);

        // The input is fully absorbed into `pending`; the next call (or
        // flush/shutdown) pushes it down to the inner writer.
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();

        ready!(drain_pending(&mut this.inner, this.pending, cx))?;

        this.inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();

        if !*this.finished {
            let start = this.pending.len();
            this.pending
                .resize(start + this.codec.estimate_output_length(0), 0);
            let n = this
                .codec
                .flush(b"", &mut this.pending[start..])
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            this.pending.truncate(start + n);
            *this.finished = true;
        }

        ready!(drain_pending(&mut this.inner, this.pending, cx))?;

        this.inner.poll_shutdown(cx)
    }
}

fn drain_pending<W: AsyncWrite>(
    inner: &mut Pin<&mut W>,
    pending: &mut BytesMut,
    cx: &mut Context<'_>,
) -> Poll<io::Result<()>> {
    while !pending.is_empty() {
        let n = ready!(inner.as_mut().poll_write(cx, pending.chunk()))?;
        if n == 0 {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write encoded data",
            )));
        }
        pending.advance(n);
    }

    Poll::Ready(Ok(()))
}
