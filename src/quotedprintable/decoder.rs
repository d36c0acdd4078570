//! Streaming quoted-printable decoder.

use super::hex_value;
use crate::codec::{check_output_length, Codec, ContentEncoding};
use crate::error::Result;

/// What the decoder is in the middle of when input runs out mid-escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Copying bytes through.
    PassThrough,
    /// Seen `=`.
    EqualSign,
    /// Seen `=\r`; an `\n` completes a soft break.
    SoftBreakCr,
    /// Seen `=` and one hex digit.
    DecodeByte(u8),
}

/// A streaming quoted-printable decoder.
///
/// Reverses `=XX` escapes (either hex case) and removes soft line breaks
/// (`=` immediately before a line break), rejoining the broken line.
/// Malformed escapes are passed through as literal text instead of failing;
/// partial recovery of a damaged message beats rejecting it outright.
#[derive(Debug, Clone)]
pub struct QuotedPrintableDecoder {
    state: State,
}

impl QuotedPrintableDecoder {
    /// Creates a new quoted-printable decoder.
    pub fn new() -> Self {
        Self {
            state: State::PassThrough,
        }
    }

    /// Handles a byte in pass-through position.
    fn pass_byte(&mut self, byte: u8, output: &mut [u8], outpos: &mut usize) {
        if byte == b'=' {
            self.state = State::EqualSign;
        } else {
            output[*outpos] = byte;
            *outpos += 1;
        }
    }

    fn decode_into(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let mut outpos = 0;

        for &byte in input {
            match self.state {
                State::PassThrough => self.pass_byte(byte, output, &mut outpos),
                State::EqualSign => match byte {
                    b'\n' => self.state = State::PassThrough,
                    b'\r' => self.state = State::SoftBreakCr,
                    _ if hex_value(byte).is_some() => self.state = State::DecodeByte(byte),
                    _ => {
                        // Not an escape after all; keep the '=' as text.
                        output[outpos] = b'=';
                        outpos += 1;
                        self.state = State::PassThrough;
                        self.pass_byte(byte, output, &mut outpos);
                    }
                },
                State::SoftBreakCr => {
                    if byte == b'\n' {
                        self.state = State::PassThrough;
                    } else {
                        output[outpos] = b'=';
                        output[outpos + 1] = b'\r';
                        outpos += 2;
                        self.state = State::PassThrough;
                        self.pass_byte(byte, output, &mut outpos);
                    }
                }
                State::DecodeByte(high) => {
                    if let Some(low) = hex_value(byte) {
                        // hex_value(high) succeeded when we entered the state.
                        let value = (hex_value(high).unwrap_or(0) << 4) | low;
                        output[outpos] = value;
                        outpos += 1;
                        self.state = State::PassThrough;
                    } else {
                        output[outpos] = b'=';
                        output[outpos + 1] = high;
                        outpos += 2;
                        self.state = State::PassThrough;
                        self.pass_byte(byte, output, &mut outpos);
                    }
                }
            }
        }

        outpos
    }

    /// Emits whatever half-finished escape is pending, as literal text.
    fn drain_state(&mut self, output: &mut [u8], outpos: usize) -> usize {
        let written = match self.state {
            State::PassThrough => 0,
            State::EqualSign => {
                output[outpos] = b'=';
                1
            }
            State::SoftBreakCr => {
                output[outpos] = b'=';
                output[outpos + 1] = b'\r';
                2
            }
            State::DecodeByte(high) => {
                output[outpos] = b'=';
                output[outpos + 1] = high;
                2
            }
        };

        self.state = State::PassThrough;

        written
    }
}

impl Default for QuotedPrintableDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for QuotedPrintableDecoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::QuotedPrintable
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
        outpos += self.drain_state(output, outpos);

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.state = State::PassThrough;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}
