//! Benchmark: fast-path and formatter dispatch over common payloads.
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use jsonwire::{
    FormatterRegistry, JsonOptions,
    formatters::{ListFormatter, TupleFormatter},
};

type Row = (i64, String, Option<f64>);

fn options() -> JsonOptions {
    let registry = FormatterRegistry::with_builtins();
    registry
        .register_with::<Row, _, _>(TupleFormatter::<Row>::new)
        .register_with::<Vec<Row>, _, _>(ListFormatter::<Row>::new);
    JsonOptions::new(registry.into_shared())
}

fn rows(len: usize) -> Vec<Row> {
    (0..len)
        .map(|i| (i as i64 * 31, format!("row number {i}"), (i % 3 != 0).then_some(i as f64 / 7.0)))
        .collect()
}

fn bench_integers(c: &mut Criterion) {
    let options = options();
    let mut group = c.benchmark_group("vec_i64");
    for len in [16usize, 1_024, 65_536] {
        let values: Vec<i64> = (0..len as i64).map(|i| i * 7_919 - 1_000_000).collect();
        let bytes = jsonwire::to_vec(&values, &options).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("serialize", len), &values, |b, values| {
            b.iter(|| jsonwire::to_vec(black_box(values), &options).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("deserialize", len), &bytes, |b, bytes| {
            b.iter(|| jsonwire::from_slice::<Vec<i64>>(black_box(bytes), &options).unwrap());
        });
    }
    group.finish();
}

fn bench_rows(c: &mut Criterion) {
    let options = options();
    let mut group = c.benchmark_group("vec_row");
    for len in [16usize, 4_096] {
        let values = rows(len);
        let bytes = jsonwire::to_vec(&values, &options).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("serialize", len), &values, |b, values| {
            b.iter(|| jsonwire::to_vec(black_box(values), &options).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("deserialize", len), &bytes, |b, bytes| {
            b.iter(|| jsonwire::from_slice::<Vec<Row>>(black_box(bytes), &options).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("serde_json_value", len), &bytes, |b, bytes| {
            b.iter(|| serde_json::from_slice::<serde_json::Value>(black_box(bytes)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_integers, bench_rows);
criterion_main!(benches);
