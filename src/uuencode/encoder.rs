//! Streaming uuencode encoder.

use super::{uu_encode_char, BYTES_PER_LINE};
use crate::codec::{check_output_length, Codec, ContentEncoding, NewLineFormat};
use crate::error::Result;

/// A streaming uuencode encoder.
///
/// Emits a `begin <mode> <name>` header before the first data line, then
/// one length-prefixed line per 45 bytes of input. The mode and file name
/// are supplied by the caller at construction; [`flush`](Codec::flush)
/// writes the final partial line, the zero-length terminator and the `end`
/// line.
#[derive(Debug, Clone)]
pub struct UuEncoder {
    mode: u32,
    name: String,
    newline: NewLineFormat,
    begun: bool,
    line: [u8; BYTES_PER_LINE],
    nline: usize,
}

impl UuEncoder {
    /// Creates a new uuencode encoder. `mode` is the unix permission value
    /// written into the begin line, conventionally `0o644`.
    pub fn new(mode: u32, name: &str) -> Self {
        Self {
            mode,
            name: name.to_string(),
            newline: NewLineFormat::default(),
            begun: false,
            line: [0; BYTES_PER_LINE],
            nline: 0,
        }
    }

    /// Sets the newline sequence used for every emitted line.
    pub fn with_newline(mut self, newline: NewLineFormat) -> Self {
        self.newline = newline;
        self
    }

    fn write_str(&self, text: &str, output: &mut [u8], outpos: &mut usize) {
        output[*outpos..*outpos + text.len()].copy_from_slice(text.as_bytes());
        *outpos += text.len();
    }

    fn write_begin(&mut self, output: &mut [u8], outpos: &mut usize) {
        let begin = format!("begin {:o} {}{}", self.mode, self.name, self.newline.as_str());
        self.write_str(&begin, output, outpos);
        self.begun = true;
    }

    /// Encodes the buffered line: a length character followed by 4-character
    /// groups, one group per 3 raw bytes (zero-padded at the tail).
    fn write_line(&mut self, output: &mut [u8], outpos: &mut usize) {
        output[*outpos] = uu_encode_char(self.nline as u8);
        *outpos += 1;

        for chunk in self.line[..self.nline].chunks(3) {
            let b0 = chunk[0];
            let b1 = chunk.get(1).copied().unwrap_or(0);
            let b2 = chunk.get(2).copied().unwrap_or(0);

            output[*outpos] = uu_encode_char(b0 >> 2);
            output[*outpos + 1] = uu_encode_char(((b0 & 0x03) << 4) | (b1 >> 4));
            output[*outpos + 2] = uu_encode_char(((b1 & 0x0F) << 2) | (b2 >> 6));
            output[*outpos + 3] = uu_encode_char(b2 & 0x3F);
            *outpos += 4;
        }

        let newline = self.newline.as_bytes();
        output[*outpos..*outpos + newline.len()].copy_from_slice(newline);
        *outpos += newline.len();

        self.nline = 0;
    }

    fn encode_into(&mut self, input: &[u8], output: &mut [u8], outpos: &mut usize) {
        if !self.begun {
            self.write_begin(output, outpos);
        }

        for &byte in input {
            self.line[self.nline] = byte;
            self.nline += 1;

            if self.nline == BYTES_PER_LINE {
                self.write_line(output, outpos);
            }
        }
    }
}

impl Codec for UuEncoder {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::UUEncode
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        // A full line is 1 length char + 60 data chars + newline; the
        // constant tail covers the begin line, the carried partial line,
        // the terminator and the end line.
        (input_length / BYTES_PER_LINE + 2) * 63 + self.name.len() + 32
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

        if self.nline > 0 {
            self.write_line(output, &mut outpos);
        }

        // Zero-length terminator line, then the end marker.
        self.write_str("`", output, &mut outpos);
        self.write_str(self.newline.as_str(), output, &mut outpos);
        self.write_str("end", output, &mut outpos);
        self.write_str(self.newline.as_str(), output, &mut outpos);

        self.reset();

        Ok(outpos)
    }

    fn reset(&mut self) {
        self.begun = false;
        self.nline = 0;
    }

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(encoder: &mut UuEncoder, input: &[u8]) -> String {
        let mut output = vec![0u8; encoder.estimate_output_length(input.len())];
        let n = encoder.flush(input, &mut output).unwrap();
        String::from_utf8(output[..n].to_vec()).unwrap()
    }

    #[test]
    fn test_framing() {
        let mut encoder = UuEncoder::new(0o644, "report.doc");
        let encoded = encode_all(&mut encoder, b"Cat");
        let lines: Vec<&str> = encoded.lines().collect();

        assert_eq!(lines[0], "begin 644 report.doc");
        assert_eq!(lines[lines.len() - 2], "`");
        assert_eq!(lines[lines.len() - 1], "end");
    }

    #[test]
    fn test_classic_vector() {
        // The canonical uuencode example: "Cat" encodes to "#0V%T".
        let mut encoder = UuEncoder::new(0o644, "cat.txt");
        let encoded = encode_all(&mut encoder, b"Cat");
        assert_eq!(encoded.lines().nth(1), Some("#0V%T"));
    }

    #[test]
    fn test_line_length() {
        let input = vec![0xABu8; 120];
        let mut encoder = UuEncoder::new(0o644, "blob.bin");
        let encoded = encode_all(&mut encoder, &input);
        let lines: Vec<&str> = encoded.lines().collect();

        // begin + two full lines + one 30-byte line + "`" + end
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1].len(), 61);
        assert!(lines[1].starts_with('M'));
        assert_eq!(lines[2].len(), 61);
        assert_eq!(lines[3].len(), 41);
    }

    #[test]
    fn test_zero_maps_to_backtick() {
        let mut encoder = UuEncoder::new(0o644, "zeros");
        let encoded = encode_all(&mut encoder, &[0u8; 3]);
        assert_eq!(encoded.lines().nth(1), Some("#````"));
    }

    #[test]
    fn test_output_bound() {
        for len in [0usize, 1, 44, 45, 46, 90, 500] {
            let input = vec![0x55u8; len];
            let mut encoder = UuEncoder::new(0o644, "bound.bin");
            let estimate = encoder.estimate_output_length(len);
            let mut output = vec![0u8; estimate];
            let n = encoder.flush(&input, &mut output).unwrap();
            assert!(n <= estimate);
        }
    }

    #[test]
    fn test_chunked_matches_whole() {
        let input: Vec<u8> = (0u8..=255).collect();
        let mut encoder = UuEncoder::new(0o600, "all.bin");
        let whole = encode_all(&mut encoder, &input);

        let mut encoder = UuEncoder::new(0o600, "all.bin");
        let mut chunked = Vec::new();
        for chunk in input.chunks(11) {
            let mut output = vec![0u8; encoder.estimate_output_length(chunk.len())];
            let n = encoder.process(chunk, &mut output).unwrap();
            chunked.extend_from_slice(&output[..n]);
        }
        let mut output = vec![0u8; encoder.estimate_output_length(0)];
        let n = encoder.flush(b"", &mut output).unwrap();
        chunked.extend_from_slice(&output[..n]);

        assert_eq!(whole.as_bytes(), chunked.as_slice());
    }
}
