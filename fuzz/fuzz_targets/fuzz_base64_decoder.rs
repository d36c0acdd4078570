#![no_main]

use libfuzzer_sys::fuzz_target;
use mime_codecs::{Base64Decoder, Codec};

fuzz_target!(|data: &[u8]| {
    // Decode arbitrary bytes whole, then again in small chunks; both must
    // succeed (the decoder is lenient) and agree.
    let mut whole = Base64Decoder::new();
    let mut out = vec![0u8; whole.estimate_output_length(data.len())];
    let n = whole.flush(data, &mut out).unwrap();
    let expected = &out[..n];

    let mut chunked = Base64Decoder::new();
    let mut decoded = Vec::new();
    for chunk in data.chunks(3) {
        let mut out = vec![0u8; chunked.estimate_output_length(chunk.len())];
        let n = chunked.process(chunk, &mut out).unwrap();
        decoded.extend_from_slice(&out[..n]);
    }
    let mut out = vec![0u8; chunked.estimate_output_length(0)];
    let n = chunked.flush(b"", &mut out).unwrap();
    decoded.extend_from_slice(&out[..n]);

    assert_eq!(decoded, expected);
});
