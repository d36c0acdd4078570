//! Streaming base64 encoder.

use super::ALPHABET;
use crate::codec::{check_output_length, Codec, ContentEncoding, NewLineFormat};
use crate::error::Result;

/// Encoded output is wrapped after this many characters (RFC 2045).
const MAX_LINE_LENGTH: usize = 76;
const QUARTETS_PER_LINE: usize = MAX_LINE_LENGTH / 4;

/// A streaming base64 encoder.
///
/// Groups input into 3-byte units mapped to 4 output characters, carrying
/// up to two unconsumed bytes across calls. Output lines are wrapped at 76
/// characters; [`flush`](Codec::flush) emits the `=`-padded final group and
/// a terminating newline.
#[derive(Debug, Clone)]
pub struct Base64Encoder {
    newline: NewLineFormat,
    saved: [u8; 3],
    nsaved: usize,
    /// Quartets emitted on the current output line.
    quartets: usize,
}

impl Base64Encoder {
    /// Creates a new base64 encoder using `\n` line endings.
    pub fn new() -> Self {
        Self::with_newline(NewLineFormat::default())
    }

    /// Creates a new base64 encoder using the given line ending.
    pub fn with_newline(newline: NewLineFormat) -> Self {
        Self {
            newline,
            saved: [0; 3],
            nsaved: 0,
            quartets: 0,
        }
    }

    fn write_quartet(&mut self, triple: [u8; 3], output: &mut [u8], outpos: &mut usize) {
        let word =
            (u32::from(triple[0]) << 16) | (u32::from(triple[1]) << 8) | u32::from(triple[2]);

        output[*outpos] = ALPHABET[(word >> 18) as usize & 0x3F];
        output[*outpos + 1] = ALPHABET[(word >> 12) as usize & 0x3F];
        output[*outpos + 2] = ALPHABET[(word >> 6) as usize & 0x3F];
        output[*outpos + 3] = ALPHABET[word as usize & 0x3F];
        *outpos += 4;

        self.quartets += 1;
        if self.quartets == QUARTETS_PER_LINE {
            self.write_newline(output, outpos);
        }
    }

    fn write_newline(&mut self, output: &mut [u8], outpos: &mut usize) {
        let newline = self.newline.as_bytes();
        output[*outpos..*outpos + newline.len()].copy_from_slice(newline);
        *outpos += newline.len();
        self.quartets = 0;
    }

    fn encode_into(&mut self, input: &[u8], output: &mut [u8], outpos: &mut usize) {
        for &byte in input {
            self.saved[self.nsaved] = byte;
            self.nsaved += 1;

            if self.nsaved == 3 {
                let triple = self.saved;
                self.nsaved = 0;
                self.write_quartet(triple, output, outpos);
            }
        }
    }
}

impl Default for Base64Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for Base64Encoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::Base64
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        // Up to two carried bytes join the input, plus one padded quartet
        // at flush time.
        let quartets = input_length / 3 + 2;
        let lines = quartets / QUARTETS_PER_LINE + 2;
        quartets * 4 + lines * 2
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

        if self.nsaved > 0 {
            let word = if self.nsaved == 1 {
                u32::from(self.saved[0]) << 16
            } else {
                (u32::from(self.saved[0]) << 16) | (u32::from(self.saved[1]) << 8)
            };

            output[outpos] = ALPHABET[(word >> 18) as usize & 0x3F];
            output[outpos + 1] = ALPHABET[(word >> 12) as usize & 0x3F];
            output[outpos + 2] = if self.nsaved == 2 {
                ALPHABET[(word >> 6) as usize & 0x3F]
            } else {
                b'='
            };
            output[outpos + 3] = b'=';
            outpos += 4;
            self.quartets += 1;
        }

        if self.quartets > 0 {
            self.write_newline(output, &mut outpos);
        }

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.saved = [0; 3];
        self.nsaved = 0;
        self.quartets = 0;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}
