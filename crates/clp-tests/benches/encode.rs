use clp_encoder::{IrEncoder, IrWriter};
use clp_tests::{SAMPLE_REFERENCE, sample_events, synthetic_events};
use clp_types::StreamMetadata;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn bench_encode_sample(c: &mut Criterion) {
    let events = sample_events();

    c.bench_function("encode_sample", |b| {
        b.iter(|| {
            let mut encoder = IrEncoder::new(SAMPLE_REFERENCE);
            for &(ts, message) in &events {
                encoder.add_event(ts, message);
            }
            encoder.encode().unwrap()
        });
    });
}

fn bench_write_throughput(c: &mut Criterion) {
    let metadata = StreamMetadata::new(SAMPLE_REFERENCE, "", "UTC");
    let mut group = c.benchmark_group("write_throughput");

    for n in [1_000, 10_000] {
        let events = synthetic_events(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("events", n), &events, |b, events| {
            b.iter(|| {
                let mut writer = IrWriter::new(Vec::with_capacity(n * 32));
                writer.write_preamble(&metadata).unwrap();
                for (ts, message) in events {
                    writer.write_event(*ts, message).unwrap();
                }
                writer.finish().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_encode_compressed(c: &mut Criterion) {
    let events = synthetic_events(10_000);
    let build = |compress: bool| {
        let mut encoder = IrEncoder::new(SAMPLE_REFERENCE);
        for (ts, message) in &events {
            encoder.add_event(*ts, message.as_str());
        }
        if compress {
            encoder.compress_stream();
        }
        encoder
    };
    let raw = build(false);
    let compressed = build(true);

    let mut group = c.benchmark_group("encode_compression");
    group.bench_function("raw", |b| b.iter(|| raw.encode().unwrap()));
    group.bench_function("zstd", |b| b.iter(|| compressed.encode().unwrap()));
    group.finish();
}

criterion_group!(
    benches,
    bench_encode_sample,
    bench_write_throughput,
    bench_encode_compressed
);
criterion_main!(benches);
