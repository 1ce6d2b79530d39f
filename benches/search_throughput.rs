use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use byteshift::{ByteArrayReader, SignedHashSearcher};

const HAYSTACK_LEN: usize = 1 << 20;

/// Pseudo-random haystack that never contains the benchmark patterns.
fn haystack() -> Vec<u8> {
    (0..HAYSTACK_LEN as u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 25) as u8 & 0x7F)
        .collect()
}

/// Absent pattern: high bit set keeps it out of the 7-bit haystack.
fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| 0x80 | (i as u8)).collect()
}

fn bench_forward_array(c: &mut Criterion) {
    let data = haystack();
    let mut group = c.benchmark_group("forward_array");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for len in [8usize, 16, 32, 64] {
        let searcher = SignedHashSearcher::from_bytes(&pattern(len)).unwrap();
        searcher.prepare_forward();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(searcher.search_forward_array(black_box(&data), 0, data.len())))
        });
    }
    group.finish();
}

fn bench_backward_array(c: &mut Criterion) {
    let data = haystack();
    let mut group = c.benchmark_group("backward_array");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for len in [8usize, 32] {
        let searcher = SignedHashSearcher::from_bytes(&pattern(len)).unwrap();
        searcher.prepare_backward();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                black_box(searcher.search_backward_array(black_box(&data), data.len(), 0))
            })
        });
    }
    group.finish();
}

fn bench_forward_stream(c: &mut Criterion) {
    let data = haystack();
    let searcher = SignedHashSearcher::from_bytes(&pattern(16)).unwrap();
    searcher.prepare_forward();

    let mut group = c.benchmark_group("forward_stream");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for window_size in [4usize << 10, 64 << 10] {
        group.bench_with_input(
            BenchmarkId::from_parameter(window_size),
            &window_size,
            |b, &window_size| {
                b.iter(|| {
                    let mut reader = ByteArrayReader::with_window_size(data.clone(), window_size);
                    black_box(
                        searcher
                            .search_forward_stream(&mut reader, 0, data.len() as u64)
                            .unwrap(),
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_fallback_short_pattern(c: &mut Criterion) {
    let data = haystack();
    let searcher = SignedHashSearcher::from_bytes(&pattern(3)).unwrap();

    let mut group = c.benchmark_group("shift_or_fallback");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("len3", |b| {
        b.iter(|| black_box(searcher.search_forward_array(black_box(&data), 0, data.len())))
    });
    group.finish();
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    for len in [16usize, 64, 256] {
        let bytes = pattern(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                let searcher = SignedHashSearcher::from_bytes(&bytes).unwrap();
                searcher.prepare_forward();
                black_box(searcher)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_forward_array,
    bench_backward_array,
    bench_forward_stream,
    bench_fallback_short_pattern,
    bench_preprocessing
);
criterion_main!(benches);
