use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use elscout::{GridIndex, LetterStream, StrideSweeper, SweepOptions};
use std::num::NonZeroUsize;

const ALPHABET: &[char] = &[
    'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ',
    'ק', 'ר', 'ש', 'ת',
];

// Deterministic pseudo-random letters so runs are comparable
fn create_stream(len: usize) -> LetterStream {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ALPHABET[(state % ALPHABET.len() as u64) as usize]
        })
        .collect()
}

fn bench_build_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("Build Grid");
    for len in [1_000, 10_000, 100_000] {
        let stream = create_stream(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &stream, |b, stream| {
            b.iter(|| black_box(GridIndex::build(stream, 22, 48).unwrap()));
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let stream = create_stream(10_000);
    let grid = GridIndex::build(&stream, 22, 48).unwrap();

    let mut group = c.benchmark_group("Grid Find");
    for query in ["משה", "החושן", "קדש הקדשים"] {
        group.bench_function(query, |b| {
            b.iter(|| black_box(grid.find(query).unwrap()));
        });
    }
    group.finish();
}

fn bench_sweep_concurrency(c: &mut Criterion) {
    let stream = create_stream(5_000);
    let mut group = c.benchmark_group("Sweep Concurrency");
    group.sample_size(10);

    for workers in [1, 2, 4, 8] {
        let sweeper = StrideSweeper::new(SweepOptions {
            max_concurrency: NonZeroUsize::new(workers).unwrap(),
            max_stride: Some(500),
            ..SweepOptions::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(workers), &sweeper, |b, sweeper| {
            b.iter(|| black_box(sweeper.scan(&stream, "תורה").unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_grid, bench_find, bench_sweep_concurrency);
criterion_main!(benches);
