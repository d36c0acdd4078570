#![no_main]

use libfuzzer_sys::fuzz_target;
use mime_codecs::{Codec, YDecoder};

fuzz_target!(|data: &[u8]| {
    // Arbitrary input, including corrupt =ybegin/=yend lines and stray
    // escapes, must decode without panicking; the CRC outcome is a status,
    // never an error.
    let mut decoder = YDecoder::new();
    for chunk in data.chunks(5) {
        let estimate = decoder.estimate_output_length(chunk.len());
        let mut out = vec![0u8; estimate];
        let n = decoder.process(chunk, &mut out).unwrap();
        assert!(n <= estimate);
    }
    let estimate = decoder.estimate_output_length(0);
    let mut out = vec![0u8; estimate];
    let n = decoder.flush(b"", &mut out).unwrap();
    assert!(n <= estimate);
    let _ = decoder.crc_status();
});
