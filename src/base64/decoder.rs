//! Streaming base64 decoder.

use super::RANK;
use crate::codec::{check_output_length, Codec, ContentEncoding};
use crate::error::Result;

/// A streaming base64 decoder.
///
/// Whitespace, line breaks and any other byte outside the base64 alphabet
/// are skipped rather than treated as fatal; a damaged message decodes to
/// whatever can be recovered. Padding determines the length of the final
/// group, and a missing final pad is tolerated at flush time.
#[derive(Debug, Clone)]
pub struct Base64Decoder {
    /// Accumulated 6-bit groups, most recent in the low bits.
    saved: u32,
    nsaved: u8,
}

impl Base64Decoder {
    /// Creates a new base64 decoder.
    pub fn new() -> Self {
        Self { saved: 0, nsaved: 0 }
    }

    fn decode_into(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let mut outpos = 0;

        for &byte in input {
            if byte == b'=' {
                // Padding closes the pending group early.
                outpos += self.drain_partial(output, outpos);
                continue;
            }

            let rank = RANK[byte as usize];
            if rank == 0xFF {
                continue;
            }

            self.saved = (self.saved << 6) | u32::from(rank);
            self.nsaved += 1;

            if self.nsaved == 4 {
                output[outpos] = (self.saved >> 16) as u8;
                output[outpos + 1] = (self.saved >> 8) as u8;
                output[outpos + 2] = self.saved as u8;
                outpos += 3;
                self.saved = 0;
                self.nsaved = 0;
            }
        }

        outpos
    }

    /// Emits the bytes represented by a 2- or 3-character partial group.
    fn drain_partial(&mut self, output: &mut [u8], outpos: usize) -> usize {
        let written = match self.nsaved {
            2 => {
                output[outpos] = (self.saved >> 4) as u8;
                1
            }
            3 => {
                output[outpos] = (self.saved >> 10) as u8;
                output[outpos + 1] = (self.saved >> 2) as u8;
                2
            }
            // A lone character carries fewer than 8 bits; nothing to recover.
            _ => 0,
        };

        self.saved = 0;
        self.nsaved = 0;

        written
    }
}

impl Default for Base64Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for Base64Decoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::Base64
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        input_length + 3
    }

    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(self.estimate_output_length(input.len()), output)?;

        Ok(self.decode_into(input, output))
    }

    fn flush(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(self.estimate_output_length(input.len()), output)?;

        let mut outpos = self.decode_into(input, output);
        // Tolerate a stream truncated before its padding.
        outpos += self.drain_partial(output, outpos);

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.saved = 0;
        self.nsaved = 0;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}
