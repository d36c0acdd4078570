use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mime_codecs::*;

fn encode_all(mut codec: Box<dyn Codec>, input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; codec.estimate_output_length(input.len())];
    let n = codec.flush(input, &mut output).unwrap();
    output.truncate(n);
    output
}

// Benchmark the encoders over a mixed text/binary payload
fn bench_encoders(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let input: Vec<u8> = (0u8..=255).cycle().take(64 * 1024).collect();
    group.throughput(Throughput::Bytes(input.len() as u64));

    for encoding in [
        ContentEncoding::Base64,
        ContentEncoding::QuotedPrintable,
        ContentEncoding::UUEncode,
        ContentEncoding::YEncode,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(encoding.as_str()),
            &input,
            |b, input| {
                let mut output = vec![0u8; encoding.new_encoder().estimate_output_length(input.len())];
                b.iter(|| {
                    let mut encoder = encoding.new_encoder();
                    encoder.flush(black_box(input), &mut output).unwrap()
                });
            },
        );
    }

    group.finish();
}

// Benchmark the decoders against their own encoder's output
fn bench_decoders(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let input: Vec<u8> = (0u8..=255).cycle().take(64 * 1024).collect();

    for encoding in [
        ContentEncoding::Base64,
        ContentEncoding::QuotedPrintable,
        ContentEncoding::UUEncode,
        ContentEncoding::YEncode,
    ] {
        let encoded = encode_all(encoding.new_encoder(), &input);
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(encoding.as_str()),
            &encoded,
            |b, encoded| {
                let mut output =
                    vec![0u8; encoding.new_decoder().estimate_output_length(encoded.len())];
                b.iter(|| {
                    let mut decoder = encoding.new_decoder();
                    decoder.flush(black_box(encoded), &mut output).unwrap()
                });
            },
        );
    }

    group.finish();
}

// Benchmark header parameter encoding
fn bench_parameter(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter");

    let options = FormatOptions::default();

    let ascii = Parameter::new("filename", "quarterly-report-final-v2.xlsx").unwrap();
    group.bench_function("ascii_token", |b| {
        b.iter(|| ascii.encoded(black_box(&options)))
    });

    let unicode = Parameter::new("filename", "отчёт-за-квартал-окончательный.xlsx").unwrap();
    group.bench_function("rfc2231", |b| {
        b.iter(|| unicode.encoded(black_box(&options)))
    });

    let rfc2047 = unicode
        .clone()
        .with_encoding_method(ParameterEncodingMethod::Rfc2047);
    group.bench_function("rfc2047", |b| {
        b.iter(|| rfc2047.encoded(black_box(&options)))
    });

    group.finish();
}

// Benchmark plain text to flowed conversion
fn bench_flowed(c: &mut Criterion) {
    let mut group = c.benchmark_group("flowed");

    let paragraph = "The quick brown fox jumps over the lazy dog and keeps going well \
                     past the point where a fixed-width mail client would have wrapped. "
        .repeat(40);
    group.throughput(Throughput::Bytes(paragraph.len() as u64));

    let converter = TextToFlowed::new();
    group.bench_function("convert", |b| {
        b.iter(|| converter.convert_string(black_box(&paragraph)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encoders,
    bench_decoders,
    bench_parameter,
    bench_flowed
);
criterion_main!(benches);
