//! Streaming quoted-printable encoder.

use super::UPPER_HEX;
use crate::codec::{check_output_length, Codec, ContentEncoding, NewLineFormat};
use crate::error::Result;

/// The line-length convention of the quoted-printable encoding itself.
const DEFAULT_MAX_LINE_LENGTH: usize = 76;

/// The smallest usable line width: room for a soft break plus one escape
/// triplet.
const MIN_MAX_LINE_LENGTH: usize = 8;

/// A streaming quoted-printable encoder.
///
/// Printable ASCII (33-126 except `=`) passes through verbatim; every other
/// byte, including CR and LF, becomes an uppercase `=XX` escape, so the
/// output is a single logical line broken only by soft line breaks. The
/// most recent space or tab is held back in carry state: if the stream ends
/// there, [`flush`](Codec::flush) escapes it so trailing whitespace
/// survives transport.
#[derive(Debug, Clone)]
pub struct QuotedPrintableEncoder {
    max_line: usize,
    newline: NewLineFormat,
    line_len: usize,
    pending_ws: Option<u8>,
}

impl QuotedPrintableEncoder {
    /// Creates a new quoted-printable encoder with the conventional
    /// 76-character line limit and `\n` line endings.
    pub fn new() -> Self {
        Self::with_options(DEFAULT_MAX_LINE_LENGTH, NewLineFormat::default())
    }

    /// Creates a new quoted-printable encoder with a specific line limit
    /// and newline sequence. Widths below 8 are clamped to 8.
    pub fn with_options(max_line: usize, newline: NewLineFormat) -> Self {
        Self {
            max_line: max_line.max(MIN_MAX_LINE_LENGTH),
            newline,
            line_len: 0,
            pending_ws: None,
        }
    }

    fn soft_break(&mut self, output: &mut [u8], outpos: &mut usize) {
        output[*outpos] = b'=';
        *outpos += 1;
        let newline = self.newline.as_bytes();
        output[*outpos..*outpos + newline.len()].copy_from_slice(newline);
        *outpos += newline.len();
        self.line_len = 0;
    }

    /// Writes `width` bytes worth of encoded data, inserting a soft break
    /// first if they would not leave room for a later soft break on this
    /// line. Escape triplets are never split.
    fn reserve(&mut self, width: usize, output: &mut [u8], outpos: &mut usize) {
        if self.line_len + width > self.max_line - 1 {
            self.soft_break(output, outpos);
        }
        self.line_len += width;
    }

    fn write_literal(&mut self, byte: u8, output: &mut [u8], outpos: &mut usize) {
        self.reserve(1, output, outpos);
        output[*outpos] = byte;
        *outpos += 1;
    }

    fn write_escaped(&mut self, byte: u8, output: &mut [u8], outpos: &mut usize) {
        self.reserve(3, output, outpos);
        output[*outpos] = b'=';
        output[*outpos + 1] = UPPER_HEX[(byte >> 4) as usize];
        output[*outpos + 2] = UPPER_HEX[(byte & 0x0F) as usize];
        *outpos += 3;
    }

    fn encode_into(&mut self, input: &[u8], output: &mut [u8], outpos: &mut usize) {
        for &byte in input {
            // A held space or tab is no longer at the end of the stream;
            // it may be emitted bare. If it lands at the end of an output
            // line, the soft break that follows keeps it legal.
            if let Some(ws) = self.pending_ws.take() {
                self.write_literal(ws, output, outpos);
            }

            match byte {
                b' ' | b'\t' => self.pending_ws = Some(byte),
                b'!'..=b'~' if byte != b'=' => self.write_literal(byte, output, outpos),
                _ => self.write_escaped(byte, output, outpos),
            }
        }
    }
}

impl Default for QuotedPrintableEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for QuotedPrintableEncoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::QuotedPrintable
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        let data = input_length * 3;
        let soft_breaks = (data / (self.max_line - 4) + 2) * 3;
        data + soft_breaks + 8
    }

    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(self.estimate_output_length(input.len()), output)?;

        let mut outpos = 0;
        self.encode_into(input, output, &mut outpos);

        Ok(outpos)
    }

    fn flush(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(self.estimate_output_length(input.len()), output)?;

        let mut outpos = 0;
        self.encode_into(input, output, &mut outpos);

        // Whitespace at the very end of the stream must not be left bare.
        if let Some(ws) = self.pending_ws.take() {
            self.write_escaped(ws, output, &mut outpos);
        }

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.line_len = 0;
        self.pending_ws = None;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}
