use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sfnt_read::{compute_checksum, CancelToken, ChecksumBuffer, SliceSource};

// 1 MiB of deterministic noise, plus a ragged tail
fn sample_data() -> Vec<u8> {
    let mut state = 0x2545_F491u32;
    (0..(1 << 20) + 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

pub fn in_memory(c: &mut Criterion) {
    let data = sample_data();
    c.bench_function("compute_checksum", |b| {
        b.iter(|| compute_checksum(black_box(&data)))
    });
}

pub fn streaming(c: &mut Criterion) {
    let data = sample_data();
    let cancel = CancelToken::new();
    let mut group = c.benchmark_group("region_checksum");
    for size in [4096usize, 64 * 1024, 1 << 20] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut buffer = ChecksumBuffer::new(size);
            b.iter(|| {
                let mut source = SliceSource::new(&data);
                buffer
                    .region_checksum(&mut source, 0, data.len() as u64, &cancel)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, in_memory, streaming);
criterion_main!(benches);
