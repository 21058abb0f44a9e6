//! Benchmarks for buffer and streaming compression.

use brotli_bridge::{compress_file, encode_buffer, BridgeConfig, Quality};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_test_data(size: usize) -> Vec<u8> {
    // Generate compressible data (repeated text)
    let text = "Hello, World! This is test data for compression benchmarks. ";
    text.repeat(size / text.len() + 1).into_bytes()[..size].to_vec()
}

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let dir = tempfile::TempDir::new().expect("temp dir");
    let config = BridgeConfig::default();

    for size in [1024, 10240, 102400].iter() {
        let data = generate_test_data(*size);
        let input = dir.path().join(format!("input-{}.bin", size));
        let output = dir.path().join(format!("output-{}.br", size));
        std::fs::write(&input, &data).expect("write input");

        group.bench_with_input(BenchmarkId::new("buffer", size), &data, |b, data| {
            b.iter(|| encode_buffer(black_box(data), Quality::default()))
        });

        group.bench_with_input(BenchmarkId::new("stream", size), &input, |b, input| {
            b.iter(|| compress_file(black_box(input), &output, Quality::default(), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compression);
criterion_main!(benches);
