//! Benchmark – `jsonpool::Pool::emit`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jsonpool::{Node, NodeId, OutBuf, Pool, PoolError, Progress};

const KEYS: [&str; 8] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

/// An object of `rows` members, each an array of eight mixed scalars.
fn build_document(pool: &mut Pool<'static, '_>, rows: usize) -> Result<NodeId, PoolError> {
    let root = pool.object(&[])?;
    for row in 0..rows {
        let scalars = [
            pool.integer(i64::try_from(row).unwrap_or(i64::MAX))?,
            pool.float(0.25)?,
            pool.float(1024.0)?,
            pool.string("telemetry")?,
            pool.true_()?,
            pool.null()?,
            pool.integer(-1)?,
            pool.float(-3.75)?,
        ];
        let array = pool.array(&scalars)?;
        pool.object_add(root, KEYS[row % KEYS.len()], array)?;
    }
    Ok(root)
}

/// Emit the whole tree through a `window`-byte buffer; returns bytes written.
fn run_emit(pool: &mut Pool<'_, '_>, root: NodeId, buf: &mut [u8]) -> usize {
    pool.rewind(root);
    let mut out = OutBuf::new(buf);
    let mut total = 0;
    let mut cursor = root;
    loop {
        let progress = pool.emit(cursor, &mut |_: u8| (), &mut out);
        total += out.len();
        out.clear();
        match progress {
            Progress::Complete => return total,
            Progress::Suspended(at) => cursor = at,
        }
    }
}

fn bench_emit(c: &mut Criterion) {
    let mut storage = vec![Node::EMPTY; 64 * 9 + 1];
    let mut pool = Pool::new(&mut storage);
    let root = build_document(&mut pool, 64).unwrap();

    let mut group = c.benchmark_group("emit_window");
    for &window in &[1usize, 16, 64, 4096] {
        let mut buf = vec![0u8; window];
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, _| {
            b.iter(|| black_box(run_emit(&mut pool, root, &mut buf)));
        });
    }

    group.bench_function("unbounded", |b| {
        b.iter(|| {
            pool.rewind(root);
            let mut count = 0usize;
            let progress = pool.emit(root, &mut |_: u8| count += 1, &mut OutBuf::unbounded());
            black_box((progress, count))
        });
    });
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_emit }
criterion_main!(benches);
