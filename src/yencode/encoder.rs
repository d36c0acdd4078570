//! Streaming yEnc encoder.

use super::{DEFAULT_LINE_LENGTH, ESCAPE, ESCAPE_SHIFT, SHIFT};
use crate::codec::{check_output_length, Codec, ContentEncoding, NewLineFormat};
use crate::error::Result;

/// A streaming yEnc encoder.
///
/// Shifts every byte by +42 (mod 256) and escapes the shifted value when it
/// collides with NUL, LF, CR, the escape character itself, or a `.` at the
/// start of a line. A CRC-32 over the original bytes accumulates as data
/// streams through and is written into the `=yend` trailer at flush time.
///
/// The `size` given at construction is the declared total written into the
/// `=ybegin` header; the `=yend` trailer reports the byte count actually
/// encoded.
#[derive(Debug, Clone)]
pub struct YEncoder {
    size: u64,
    name: String,
    max_line: usize,
    newline: NewLineFormat,
    crc: crc32fast::Hasher,
    begun: bool,
    line_len: usize,
    total: u64,
}

impl YEncoder {
    /// Creates a new yEnc encoder declaring `size` total bytes for the file
    /// `name`. Streams of unknown length may declare 0.
    pub fn new(size: u64, name: &str) -> Self {
        Self {
            size,
            name: name.to_string(),
            max_line: DEFAULT_LINE_LENGTH,
            newline: NewLineFormat::default(),
            crc: crc32fast::Hasher::new(),
            begun: false,
            line_len: 0,
            total: 0,
        }
    }

    /// Sets the encoded line width. Widths below 8 are clamped to 8.
    pub fn with_line_length(mut self, max_line: usize) -> Self {
        self.max_line = max_line.max(8);
        self
    }

    /// Sets the newline sequence used between encoded lines.
    pub fn with_newline(mut self, newline: NewLineFormat) -> Self {
        self.newline = newline;
        self
    }

    fn write_str(&self, text: &str, output: &mut [u8], outpos: &mut usize) {
        output[*outpos..*outpos + text.len()].copy_from_slice(text.as_bytes());
        *outpos += text.len();
    }

    fn write_newline(&mut self, output: &mut [u8], outpos: &mut usize) {
        let newline = self.newline.as_bytes();
        output[*outpos..*outpos + newline.len()].copy_from_slice(newline);
        *outpos += newline.len();
        self.line_len = 0;
    }

    fn encode_into(&mut self, input: &[u8], output: &mut [u8], outpos: &mut usize) {
        if !self.begun {
            let begin = format!(
                "=ybegin line={} size={} name={}{}",
                self.max_line,
                self.size,
                self.name,
                self.newline.as_str()
            );
            self.write_str(&begin, output, outpos);
            self.begun = true;
        }

        self.crc.update(input);
        self.total += input.len() as u64;

        for &byte in input {
            if self.line_len >= self.max_line {
                self.write_newline(output, outpos);
            }

            let shifted = byte.wrapping_add(SHIFT);
            let needs_escape = matches!(shifted, 0x00 | b'\n' | b'\r' | ESCAPE)
                || (self.line_len == 0 && shifted == b'.');

            if needs_escape {
                output[*outpos] = ESCAPE;
                output[*outpos + 1] = shifted.wrapping_add(ESCAPE_SHIFT);
                *outpos += 2;
                self.line_len += 2;
            } else {
                output[*outpos] = shifted;
                *outpos += 1;
                self.line_len += 1;
            }
        }
    }
}

impl Codec for YEncoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::YEncode
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        // Every byte may escape to two characters, plus a newline per line
        // and the begin/end framing.
        let data = input_length * 2;
        let lines = data / self.max_line + 2;
        data + lines * 2 + self.name.len() + 160
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

        if self.line_len > 0 {
            self.write_newline(output, &mut outpos);
        }

        let crc = self.crc.clone().finalize();
        let trailer = format!(
            "=yend size={} crc32={:08x}{}",
            self.total,
            crc,
            self.newline.as_str()
        );
        self.write_str(&trailer, output, &mut outpos);

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.crc = crc32fast::Hasher::new();
        self.begun = false;
        self.line_len = 0;
        self.total = 0;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}
