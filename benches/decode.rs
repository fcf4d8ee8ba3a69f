//! Benchmarks for tick decoding and rendering

use chrono::NaiveTime;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tick_subscriber::tick::{decode, render, DecodeMode};

const PAYLOAD: &str = "09:30:00;4518.25;4522.00;4517.75;4521.50;12345;0.072;3.25";

fn benchmark_decode(c: &mut Criterion) {
    c.bench_function("decode_permissive", |b| {
        b.iter(|| decode(black_box(PAYLOAD), DecodeMode::Permissive))
    });

    c.bench_function("decode_strict", |b| {
        b.iter(|| decode(black_box(PAYLOAD), DecodeMode::Strict))
    });
}

fn benchmark_render(c: &mut Criterion) {
    let record = decode(PAYLOAD, DecodeMode::Permissive).unwrap();
    let at = NaiveTime::from_hms_opt(14, 32, 7).unwrap();

    c.bench_function("render_line", |b| {
        b.iter(|| render(black_box("ES1"), black_box(&record), at))
    });
}

criterion_group!(benches, benchmark_decode, benchmark_render);
criterion_main!(benches);
