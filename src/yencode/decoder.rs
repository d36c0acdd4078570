//! Streaming yEnc decoder.

use super::{ESCAPE, SHIFT};
use crate::codec::{check_output_length, Codec, ContentEncoding};
use crate::error::Result;

/// Outcome of comparing the decoder's own CRC-32 against the `=yend`
/// trailer.
///
/// A mismatch is an integrity warning, not a decode failure: the decoded
/// bytes are delivered either way and the caller decides whether to surface
/// the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrcStatus {
    /// No trailer CRC was seen, or the stream has not been flushed yet.
    #[default]
    Unknown,
    /// The trailer CRC matches the decoded bytes.
    Valid,
    /// The trailer CRC does not match the decoded bytes.
    Mismatch,
}

/// A streaming yEnc decoder.
///
/// Skips everything before the `=ybegin` line, reverses the +42 shift and
/// `=` escape pairs byte-for-byte, and accumulates its own CRC-32 over the
/// recovered bytes. After [`flush`](Codec::flush), [`crc_status`] reports
/// whether the trailer checksum matched.
///
/// [`crc_status`]: YDecoder::crc_status
#[derive(Debug, Clone)]
pub struct YDecoder {
    crc: crc32fast::Hasher,
    expected_crc: Option<u32>,
    status: CrcStatus,
    /// Control-line buffer (`=ybegin`, `=ypart`, `=yend`, and anything
    /// before the stream starts).
    control: Vec<u8>,
    in_control: bool,
    started: bool,
    ended: bool,
    escaped: bool,
    escape_at_line_start: bool,
    line_start: bool,
}

impl YDecoder {
    /// Creates a new yEnc decoder.
    pub fn new() -> Self {
        Self {
            crc: crc32fast::Hasher::new(),
            expected_crc: None,
            status: CrcStatus::Unknown,
            control: Vec::new(),
            in_control: false,
            started: false,
            ended: false,
            escaped: false,
            escape_at_line_start: false,
            line_start: true,
        }
    }

    /// The integrity outcome for the last flushed stream.
    pub fn crc_status(&self) -> CrcStatus {
        self.status
    }

    fn handle_control_line(&mut self) {
        if !self.started {
            if self.control.starts_with(b"=ybegin") {
                self.started = true;
            }
        } else if self.control.starts_with(b"=yend") {
            self.expected_crc = parse_trailer_crc(&self.control);
            self.ended = true;
        }
        // "=ypart" and unrecognized control lines carry nothing we need.

        self.control.clear();
        self.in_control = false;
    }

    fn emit(&mut self, byte: u8, output: &mut [u8], outpos: &mut usize) {
        output[*outpos] = byte;
        *outpos += 1;
        self.crc.update(&[byte]);
    }

    fn decode_into(&mut self, input: &[u8], output: &mut [u8]) -> usize {
        let mut outpos = 0;

        for &byte in input {
            if self.ended {
                break;
            }

            // Before =ybegin, and inside any =y control line, bytes are
            // collected per line rather than decoded.
            if !self.started || self.in_control {
                if byte == b'\n' {
                    self.handle_control_line();
                    self.line_start = true;
                } else {
                    self.control.push(byte);
                }
                continue;
            }

            match byte {
                b'\r' => {}
                b'\n' => {
                    // A dangling escape at end of line is malformed; drop it.
                    self.escaped = false;
                    self.line_start = true;
                }
                _ if self.escaped => {
                    self.escaped = false;
                    if byte == b'y' && self.escape_at_line_start {
                        // "=y" at the start of a line opens a control line.
                        self.in_control = true;
                        self.control.clear();
                        self.control.extend_from_slice(b"=y");
                    } else {
                        self.emit(byte.wrapping_sub(SHIFT).wrapping_sub(64), output, &mut outpos);
                    }
                }
                ESCAPE => {
                    self.escaped = true;
                    self.escape_at_line_start = self.line_start;
                    self.line_start = false;
                }
                _ => {
                    self.line_start = false;
                    self.emit(byte.wrapping_sub(SHIFT), output, &mut outpos);
                }
            }
        }

        outpos
    }
}

impl Default for YDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for YDecoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::YEncode
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

        let outpos = self.decode_into(input, output);

        // A trailer cut off before its newline still counts.
        if self.in_control && !self.control.is_empty() {
            self.handle_control_line();
        }

        let computed = self.crc.clone().finalize();
        let status = match self.expected_crc {
            None => CrcStatus::Unknown,
            Some(expected) if expected == computed => CrcStatus::Valid,
            Some(_) => CrcStatus::Mismatch,
        };

        self.reset();
        self.status = status;

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.crc = crc32fast::Hasher::new();
        self.expected_crc = None;
        self.status = CrcStatus::Unknown;
        self.control.clear();
        self.in_control = false;
        self.started = false;
        self.ended = false;
        self.escaped = false;
        self.escape_at_line_start = false;
        self.line_start = true;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}

/// Pulls the `crc32=` value out of an `=yend` line, if present and well
/// formed.
fn parse_trailer_crc(line: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(line).ok()?;
    let (_, rest) = text.split_once(" crc32=")?;
    let hex: String = rest
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u32::from_str_radix(&hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yencode::YEncoder;

    fn encode(input: &[u8]) -> Vec<u8> {
        let mut encoder = YEncoder::new(input.len() as u64, "test.bin");
        let mut output = vec![0u8; encoder.estimate_output_length(input.len())];
        let n = encoder.flush(input, &mut output).unwrap();
        output.truncate(n);
        output
    }

    fn decode_all(decoder: &mut YDecoder, input: &[u8]) -> Vec<u8> {
        let mut output = vec![0u8; decoder.estimate_output_length(input.len())];
        let n = decoder.flush(input, &mut output).unwrap();
        output.truncate(n);
        output
    }

    #[test]
    fn test_round_trip_all_bytes() {
        let input: Vec<u8> = (0u8..=255).collect();
        let encoded = encode(&input);

        let mut decoder = YDecoder::new();
        assert_eq!(decode_all(&mut decoder, &encoded), input);
        assert_eq!(decoder.crc_status(), CrcStatus::Valid);
    }

    #[test]
    fn test_round_trip_chunked() {
        let input: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        let encoded = encode(&input);

        let mut decoder = YDecoder::new();
        let mut decoded = Vec::new();
        for chunk in encoded.chunks(3) {
            let mut output = vec![0u8; decoder.estimate_output_length(chunk.len())];
            let n = decoder.process(chunk, &mut output).unwrap();
            decoded.extend_from_slice(&output[..n]);
        }
        let mut output = vec![0u8; decoder.estimate_output_length(0)];
        let n = decoder.flush(b"", &mut output).unwrap();
        decoded.extend_from_slice(&output[..n]);

        assert_eq!(decoded, input);
        assert_eq!(decoder.crc_status(), CrcStatus::Valid);
    }

    #[test]
    fn test_crc_mismatch_is_nonfatal() {
        let input = b"hello yenc world";
        let mut encoded = encode(input);

        // Corrupt one data byte (line 2 starts after the =ybegin line).
        let data_start = encoded.iter().position(|&b| b == b'\n').unwrap() + 1;
        encoded[data_start] ^= 0x01;

        let mut decoder = YDecoder::new();
        let decoded = decode_all(&mut decoder, &encoded);

        assert_eq!(decoded.len(), input.len());
        assert_eq!(decoder.crc_status(), CrcStatus::Mismatch);
    }

    #[test]
    fn test_missing_trailer_is_unknown() {
        let input = b"partial";
        let encoded = encode(input);

        // Drop the =yend line entirely.
        let trailer_start = encoded
            .windows(5)
            .position(|w| w == b"=yend")
            .unwrap();

        let mut decoder = YDecoder::new();
        let decoded = decode_all(&mut decoder, &encoded[..trailer_start]);

        assert_eq!(decoded, input);
        assert_eq!(decoder.crc_status(), CrcStatus::Unknown);
    }

    #[test]
    fn test_leading_garbage_skipped() {
        let input = b"data";
        let mut encoded = Vec::from(&b"Subject: a post\n\n"[..]);
        encoded.extend_from_slice(&encode(input));

        let mut decoder = YDecoder::new();
        assert_eq!(decode_all(&mut decoder, &encoded), input);
    }

    #[test]
    fn test_trailing_data_after_yend_ignored() {
        let input = b"data";
        let mut encoded = encode(input);
        encoded.extend_from_slice(b"signature line\n");

        let mut decoder = YDecoder::new();
        assert_eq!(decode_all(&mut decoder, &encoded), input);
        assert_eq!(decoder.crc_status(), CrcStatus::Valid);
    }
}
