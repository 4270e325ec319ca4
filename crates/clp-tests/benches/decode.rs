use clp_decoder::{DecodeSession, NextEvent, ReaderSource};
use clp_encoder::IrEncoder;
use clp_tests::{SAMPLE_REFERENCE, sample_stream, synthetic_events};
use clp_types::QueryFilter;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn encode_synthetic(n: usize) -> Vec<u8> {
    let mut encoder = IrEncoder::new(SAMPLE_REFERENCE);
    for (ts, message) in synthetic_events(n) {
        encoder.add_event(ts, message);
    }
    encoder.encode().unwrap()
}

fn count_matches(bytes: &[u8], filter: Option<&QueryFilter>) -> usize {
    let mut session = DecodeSession::new(bytes);
    session.decode_preamble().unwrap();
    let mut n = 0;
    while let NextEvent::Event(_) = session.decode_next(filter).unwrap() {
        n += 1;
    }
    n
}

fn bench_decode_sample(c: &mut Criterion) {
    let bytes = sample_stream();

    c.bench_function("decode_sample", |b| {
        b.iter(|| count_matches(&bytes, None));
    });
}

fn bench_decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");

    for events in [1_000, 10_000, 100_000] {
        let bytes = encode_synthetic(events);
        group.throughput(Throughput::Elements(events as u64));
        group.bench_with_input(BenchmarkId::new("events", events), &bytes, |b, bytes| {
            b.iter(|| count_matches(bytes, None));
        });
    }

    group.finish();
}

fn bench_decode_chunked(c: &mut Criterion) {
    let bytes = encode_synthetic(10_000);
    let mut group = c.benchmark_group("decode_chunk_size");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    for chunk in [64, 4 * 1024, 64 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut session = DecodeSession::new(ReaderSource::with_chunk_size(bytes.as_slice(), chunk));
                session.decode_preamble().unwrap();
                while let NextEvent::Event(_) = session.decode_next(None).unwrap() {}
                session.decoded_count()
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let bytes = encode_synthetic(10_000);
    let pattern = QueryFilter::builder().add_pattern("*cache miss*").build().unwrap();
    // Ends a tenth of the way in, so the scan stops early.
    let early_stop = QueryFilter::builder()
        .end(SAMPLE_REFERENCE + 10_000)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("search");
    group.bench_function("unfiltered", |b| b.iter(|| count_matches(&bytes, None)));
    group.bench_function("pattern", |b| b.iter(|| count_matches(&bytes, Some(&pattern))));
    group.bench_function("time_range_early_stop", |b| {
        b.iter(|| count_matches(&bytes, Some(&early_stop)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_decode_sample,
    bench_decode_throughput,
    bench_decode_chunked,
    bench_search
);
criterion_main!(benches);
