//! Streaming uuencode decoder.

use super::uu_decode_char;
use crate::codec::{check_output_length, Codec, ContentEncoding};
use crate::error::Result;

/// A streaming uuencode decoder.
///
/// Skips everything before the `begin` line, uses each data line's length
/// character to discard the zero-padding at the end of the final group, and
/// stops at the zero-length terminator / `end` line. Truncated or damaged
/// lines decode to whatever can be recovered, matching the format's
/// historical tolerance.
#[derive(Debug, Clone)]
pub struct UuDecoder {
    /// The unfinished line carried across calls.
    carry: Vec<u8>,
    begun: bool,
    ended: bool,
}

impl UuDecoder {
    /// Creates a new uuencode decoder.
    pub fn new() -> Self {
        Self {
            carry: Vec::new(),
            begun: false,
            ended: false,
        }
    }

    /// Decodes one complete line into `output`, returning the bytes written.
    fn decode_line(&mut self, line: &[u8], output: &mut [u8], outpos: usize) -> usize {
        let line = match line.last() {
            Some(b'\r') => &line[..line.len() - 1],
            _ => line,
        };

        if self.ended {
            return 0;
        }

        if !self.begun {
            if line.starts_with(b"begin ") {
                self.begun = true;
            }
            return 0;
        }

        if line.starts_with(b"end") {
            self.ended = true;
            return 0;
        }

        let Some(&length_char) = line.first() else {
            return 0;
        };

        let expected = uu_decode_char(length_char) as usize;
        if expected == 0 {
            // Zero-length terminator; the "end" line follows.
            return 0;
        }

        let mut written = 0;
        for chunk in line[1..].chunks(4) {
            let c0 = uu_decode_char(chunk[0]);
            let c1 = uu_decode_char(chunk.get(1).copied().unwrap_or(b'`'));
            let c2 = uu_decode_char(chunk.get(2).copied().unwrap_or(b'`'));
            let c3 = uu_decode_char(chunk.get(3).copied().unwrap_or(b'`'));

            let triple = [
                (c0 << 2) | (c1 >> 4),
                (c1 << 4) | (c2 >> 2),
                (c2 << 6) | c3,
            ];

            for &byte in &triple {
                if written == expected {
                    break;
                }
                output[outpos + written] = byte;
                written += 1;
            }

            if written == expected {
                break;
            }
        }

        written
    }

    fn decode_into(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let mut outpos = 0;

        for &byte in input {
            if byte == b'\n' {
                let line = std::mem::take(&mut self.carry);
                outpos += self.decode_line(&line, output, outpos);
            } else {
                self.carry.push(byte);
            }
        }

        outpos
    }
}

impl Default for UuDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for UuDecoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::UUEncode
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        // A data line never yields more than 63 bytes, regardless of how
        // much of it was carried from earlier calls; one line may complete
        // here and one more is drained at flush time.
        input_length + 128
    }

    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(self.estimate_output_length(input.len()), output)?;

        Ok(self.decode_into(input, output))
    }

    fn flush(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(self.estimate_output_length(input.len()), output)?;

        let mut outpos = self.decode_into(input, output);

        // Input that ends mid-line still decodes; premature end-of-input is
        // not a failure in this format.
        if !self.carry.is_empty() {
            let line = std::mem::take(&mut self.carry);
            outpos += self.decode_line(&line, output, outpos);
        }

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.carry.clear();
        self.begun = false;
        self.ended = false;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}
