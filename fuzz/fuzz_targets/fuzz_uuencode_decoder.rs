#![no_main]

use libfuzzer_sys::fuzz_target;
use mime_codecs::{Codec, UuDecoder};

fuzz_target!(|data: &[u8]| {
    // Arbitrary input, including damaged begin/end framing and bogus length
    // characters, must decode without panicking or overflowing the
    // estimated output size.
    let mut decoder = UuDecoder::new();
    let mut total = 0;
    for chunk in data.chunks(7) {
        let estimate = decoder.estimate_output_length(chunk.len());
        let mut out = vec![0u8; estimate];
        let n = decoder.process(chunk, &mut out).unwrap();
        assert!(n <= estimate);
        total += n;
    }
    let estimate = decoder.estimate_output_length(0);
    let mut out = vec![0u8; estimate];
    let n = decoder.flush(b"", &mut out).unwrap();
    assert!(n <= estimate);
    let _ = total + n;
});
