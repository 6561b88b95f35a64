//! Benchmarks for the full per-frame pipeline
//!
//! Covers decode, history push and compositing through
//! `PointCloudProcessor::process` for binary and text payloads.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pointstream::test_utils::colored_spiral_frame;
use pointstream::{CloudConfig, PointCloudProcessor};
use std::hint::black_box;

const POINTS: usize = 10_000;

fn bench_process_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_frame");
    group.throughput(Throughput::Elements(POINTS as u64));

    for (name, as_text) in [("binary", false), ("base64", true)] {
        let frame = colored_spiral_frame(POINTS, as_text);
        let mut processor = PointCloudProcessor::new(CloudConfig::default().with_max_points(POINTS))
            .expect("valid config");

        group.bench_function(name, |b| {
            b.iter(|| {
                let written = processor.process(black_box(&frame)).expect("valid frame");
                black_box(written)
            })
        });
    }

    group.finish();
}

fn bench_decay_depth(c: &mut Criterion) {
    let frame = colored_spiral_frame(POINTS, true);
    let mut group = c.benchmark_group("decay_depth");

    for depth in [1usize, 4, 8] {
        let config = CloudConfig::default()
            .with_max_points(POINTS * depth)
            .with_decay_depth(depth);
        let mut processor = PointCloudProcessor::new(config).expect("valid config");

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(processor.process(black_box(&frame)).expect("valid frame")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process_frame, bench_decay_depth);
criterion_main!(benches);
