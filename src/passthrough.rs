//! Pass-through encoder and decoder.
//!
//! The identity transform, used for content that carries no
//! transfer-encoding (`7bit`, `8bit`, `binary`) and as the baseline
//! implementation of the [`Codec`] contract.

use crate::codec::{check_output_length, Codec, ContentEncoding};
use crate::error::Result;

/// An encoder that copies its input verbatim.
#[derive(Debug, Clone)]
pub struct PassThroughEncoder {
    encoding: ContentEncoding,
}

impl PassThroughEncoder {
    /// Creates a new pass-through encoder reporting the given encoding tag.
    pub fn new(encoding: ContentEncoding) -> Self {
        Self { encoding }
    }
}

impl Codec for PassThroughEncoder {
    fn encoding(&self) -> ContentEncoding {
        self.encoding
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        input_length
    }

    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(input.len(), output)?;

        output[..input.len()].copy_from_slice(input);

        Ok(input.len())
    }

    fn flush(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.process(input, output)
    }

    fn reset(&mut self) {}

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}

/// A decoder that copies its input verbatim.
#[derive(Debug, Clone)]
pub struct PassThroughDecoder {
    encoding: ContentEncoding,
}

impl PassThroughDecoder {
    /// Creates a new pass-through decoder reporting the given encoding tag.
    pub fn new(encoding: ContentEncoding) -> Self {
        Self { encoding }
    }
}

impl Codec for PassThroughDecoder {
    fn encoding(&self) -> ContentEncoding {
        self.encoding
    }

    fn estimate_output_length(&self, input_length: usize) -> usize {
        input_length
    }

    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        check_output_length(input.len(), output)?;

        output[..input.len()].copy_from_slice(input);

        Ok(input.len())
    }

    fn flush(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.process(input, output)
    }

    fn reset(&mut self) {}

    fn clone_codec(&self) -> Box<dyn Codec> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let mut encoder = PassThroughEncoder::new(ContentEncoding::Binary);
        let input = b"any bytes at all \x00\xff\x80";
        let mut output = vec![0u8; encoder.estimate_output_length(input.len())];

        let n = encoder.process(input, &mut output).unwrap();
        assert_eq!(&output[..n], input);

        let n = encoder.flush(b"", &mut []).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_output_too_small() {
        let mut encoder = PassThroughEncoder::new(ContentEncoding::SevenBit);
        let mut output = [0u8; 2];
        assert!(encoder.process(b"hello", &mut output).is_err());
    }

    #[test]
    fn test_decoder_identity() {
        let mut decoder = PassThroughDecoder::new(ContentEncoding::EightBit);
        let input = b"caf\xc3\xa9";
        let mut output = vec![0u8; input.len()];

        let n = decoder.flush(input, &mut output).unwrap();
        assert_eq!(&output[..n], input);
    }
}
