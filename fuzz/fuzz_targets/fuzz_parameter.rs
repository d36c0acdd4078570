#![no_main]

use libfuzzer_sys::fuzz_target;
use mime_codecs::{FormatOptions, Parameter, ParameterEncodingMethod};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Some((name, value)) = text.split_once('=') else {
        return;
    };

    // Name validation either rejects the input or the encoder must produce
    // folded output within the line limit for every method.
    let Ok(param) = Parameter::new(name, value) else {
        return;
    };

    for method in [
        ParameterEncodingMethod::None,
        ParameterEncodingMethod::Rfc2047,
        ParameterEncodingMethod::Rfc2231,
    ] {
        let options = FormatOptions {
            parameter_encoding_method: method,
            ..FormatOptions::default()
        };
        let _ = param.encoded(&options);
    }
});
