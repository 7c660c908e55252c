use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use cyclid::{
    CachingScriptExecutor, CycleSequence, MemoryStore, RandSource, ThreadRandom, ThreadSleep,
    TimeSource, TokenGenerator,
};
use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
    time::Instant,
};

/// Advances on every read so the generator never waits on the clock.
#[derive(Clone)]
struct TickingMockTime {
    millis: Arc<AtomicU64>,
}

impl TimeSource<u64> for TickingMockTime {
    fn current_millis(&self) -> u64 {
        self.millis.fetch_add(1, Ordering::Relaxed)
    }
}

// Number of operations per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_OPS: usize = 4096;

fn ticking_generator() -> TokenGenerator<TickingMockTime, ThreadRandom, ThreadSleep> {
    TokenGenerator::new(
        TickingMockTime {
            millis: Arc::new(AtomicU64::new(1)),
        },
        ThreadRandom,
        ThreadSleep,
    )
}

/// Token minting when the clock is never the bottleneck.
fn bench_token_hot_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("token/hot");
    group.throughput(Throughput::Elements(TOTAL_OPS as u64));

    group.bench_function(format!("elems/{TOTAL_OPS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = ticking_generator();
                for _ in 0..TOTAL_OPS {
                    black_box(generator.generate_unique_token_value("bench"));
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

/// Token minting under contention from every core.
fn bench_token_threaded(c: &mut Criterion) {
    let threads = num_cpus::get();
    let mut group = c.benchmark_group("token/threaded");
    group.throughput(Throughput::Elements((TOTAL_OPS * threads) as u64));

    group.bench_function(format!("threads/{threads}/elems/{TOTAL_OPS}"), |b| {
        b.iter_custom(|iters| {
            let mut total = core::time::Duration::ZERO;
            for _ in 0..iters {
                let generator = ticking_generator();
                let barrier = Barrier::new(threads + 1);
                total += scope(|s| {
                    for _ in 0..threads {
                        let generator = generator.clone();
                        let barrier = &barrier;
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..TOTAL_OPS {
                                black_box(generator.generate_unique_token_value("bench"));
                            }
                        });
                    }
                    barrier.wait();
                    Instant::now()
                })
                .elapsed();
            }
            total
        });
    });

    group.finish();
}

/// Real wall clock: bounded by one token per millisecond.
fn bench_token_wall_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("token/wall_clock");
    group.sample_size(10);
    group.throughput(Throughput::Elements(32));

    group.bench_function("elems/32", |b| {
        let generator = TokenGenerator::default();
        b.iter(|| {
            for _ in 0..32 {
                black_box(generator.generate_unique_token_value("bench"));
            }
        });
    });

    group.finish();
}

fn bench_random(c: &mut Criterion) {
    c.bench_function("rand/thread_random", |b| {
        b.iter(|| black_box(ThreadRandom.rand()));
    });
}

/// Cycle advances against the in-memory store (one atomic script per call).
fn bench_cycle_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle/memory");
    group.throughput(Throughput::Elements(TOTAL_OPS as u64));

    let store = Arc::new(MemoryStore::new());
    let executor = Arc::new(CachingScriptExecutor::new(Arc::clone(&store)));
    let cycle = CycleSequence::new("bench", store, executor);
    cycle
        .create((0..16).map(|i| format!("element-{i}")))
        .unwrap();

    group.bench_function(format!("elems/{TOTAL_OPS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_OPS {
                black_box(cycle.advance().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_token_hot_path,
    bench_token_threaded,
    bench_token_wall_clock,
    bench_random,
    bench_cycle_advance,
);
criterion_main!(benches);
