//! Benchmark – cold parsing vs cached parsing vs streaming.
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonmill::{parse, produce_chunks, ParserEngine, StreamOptions, StreamingParser};

/// Produce a deterministic JSON document of roughly `records` array entries
/// with repeated keys, the shape that exercises interning and cache reuse.
fn make_json_payload(records: usize) -> String {
    let mut s = String::from("[");
    for i in 0..records {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&format!(
            "{{\"id\":{i},\"name\":\"record-{i}\",\"active\":{},\"score\":{}.5}}",
            i % 2 == 0,
            i % 100,
        ));
    }
    s.push(']');
    s
}

fn bench_cold_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_parse");
    for &records in &[10usize, 100, 1_000] {
        let payload = make_json_payload(records);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(records),
            &payload,
            |b, payload| {
                b.iter(|| black_box(parse(black_box(payload)).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_cached_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_parse");
    for &records in &[10usize, 100, 1_000] {
        let payload = make_json_payload(records);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(records),
            &payload,
            |b, payload| {
                let mut engine = ParserEngine::default();
                engine.parse(payload).unwrap();
                b.iter(|| black_box(engine.parse(black_box(payload)).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_streaming(c: &mut Criterion) {
    let payload = make_json_payload(1_000);
    let mut group = c.benchmark_group("streaming_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    for &parts in &[10usize, 100, 1_000] {
        let chunks = produce_chunks(&payload, parts);
        group.bench_with_input(BenchmarkId::from_parameter(parts), &chunks, |b, chunks| {
            b.iter(|| {
                let mut session = StreamingParser::new(StreamOptions::default());
                let mut produced = 0usize;
                for chunk in chunks {
                    produced += session.write(black_box(chunk.as_bytes())).unwrap().len();
                }
                produced += session.end().unwrap().len();
                black_box(produced)
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_cold_parse, bench_cached_parse, bench_streaming
}
criterion_main!(benches);
