//! Benchmarks for style size computation
//!
//! Tests size spec parsing and the area-matching dimension calculation.

use attachforge_common::SizeSpec;
use attachforge_imaging::{compute, Dimensions};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");

    let cases = [
        ("landscape", Dimensions::new(4000, 3000), Dimensions::new(200, 200), true),
        ("portrait", Dimensions::new(3000, 6000), Dimensions::new(100, 60), true),
        ("no_upscale", Dimensions::new(64, 64), Dimensions::new(300, 300), true),
        ("exact", Dimensions::new(4000, 3000), Dimensions::new(100, 60), false),
    ];

    for (name, original, target, keep_ratio) in cases {
        group.bench_with_input(BenchmarkId::new("case", name), &(original, target), |b, (o, t)| {
            b.iter(|| compute(black_box(*o), black_box(*t), keep_ratio));
        });
    }

    group.finish();
}

fn bench_parse_spec(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_spec");

    for spec in ["150x75", "!100x60", "1920x1080"] {
        group.bench_with_input(BenchmarkId::new("parse", spec), &spec, |b, spec| {
            b.iter(|| black_box(*spec).parse::<SizeSpec>());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute, bench_parse_spec);
criterion_main!(benches);
