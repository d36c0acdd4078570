#![no_main]

use libfuzzer_sys::fuzz_target;
use mime_codecs::{Codec, QuotedPrintableDecoder};

fuzz_target!(|data: &[u8]| {
    let mut whole = QuotedPrintableDecoder::new();
    let mut out = vec![0u8; whole.estimate_output_length(data.len())];
    let n = whole.flush(data, &mut out).unwrap();
    let expected = &out[..n];

    // Chunk boundaries inside =XX escapes and soft breaks must not change
    // the output.
    let mut chunked = QuotedPrintableDecoder::new();
    let mut decoded = Vec::new();
    for chunk in data.chunks(2) {
        let mut out = vec![0u8; chunked.estimate_output_length(chunk.len())];
        let n = chunked.process(chunk, &mut out).unwrap();
        decoded.extend_from_slice(&out[..n]);
    }
    let mut out = vec![0u8; chunked.estimate_output_length(0)];
    let n = chunked.flush(b"", &mut out).unwrap();
    decoded.extend_from_slice(&out[..n]);

    assert_eq!(decoded, expected);
});
