//! Benchmarks for the streaming base64 record decoder
//!
//! Measures decode throughput over a 10k point colored cloud at several
//! point ratios, against a full decode followed by striding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pointstream::codec;
use pointstream::test_utils::{COLORED_RECORD_SIZE, colored_spiral_frame};
use pointstream::types::Payload;
use std::hint::black_box;

const POINTS: usize = 10_000;

fn spiral_text() -> String {
    match colored_spiral_frame(POINTS, true).payload {
        Payload::Text(text) => text.to_string(),
        Payload::Binary(_) => unreachable!("text frame requested"),
    }
}

fn bench_streaming_decode(c: &mut Criterion) {
    let text = spiral_text();
    let mut output = vec![0u8; POINTS * COLORED_RECORD_SIZE];

    let mut group = c.benchmark_group("streaming_decode");
    group.throughput(Throughput::Bytes(text.len() as u64));

    for ratio in [1usize, 2, 4, 10] {
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |b, &ratio| {
            b.iter(|| {
                let records =
                    codec::decode(black_box(text.as_bytes()), &mut output, COLORED_RECORD_SIZE, ratio);
                black_box(records)
            })
        });
    }

    group.finish();
}

fn bench_full_decode_then_stride(c: &mut Criterion) {
    let text = spiral_text();

    let mut group = c.benchmark_group("full_decode_then_stride");
    group.throughput(Throughput::Bytes(text.len() as u64));

    for ratio in [1usize, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(ratio), &ratio, |b, &ratio| {
            b.iter(|| {
                let bytes = STANDARD.decode(black_box(text.as_bytes())).expect("valid base64");
                let kept: Vec<&[u8]> = bytes.chunks_exact(COLORED_RECORD_SIZE).step_by(ratio).collect();
                black_box(kept.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_streaming_decode, bench_full_decode_then_stride);
criterion_main!(benches);
