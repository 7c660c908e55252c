use super::{Throughput, config::StressConfig};
use anyhow::{Context, bail};
use cyclid::{CachingScriptExecutor, CycleSequence, MemoryStore};
use std::{
    collections::HashMap,
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

const CYCLE: &str = "cyclid-stress";

/// Advances one shared cycle from every thread and checks that each element
/// was handed out exactly as often as the number of slots it owns.
///
/// The first thread periodically flushes the store's script cache so the
/// executor's re-registration path runs under contention.
pub fn run(config: &StressConfig) -> anyhow::Result<Throughput> {
    let store = Arc::new(MemoryStore::new());
    let executor = Arc::new(CachingScriptExecutor::new(Arc::clone(&store)));
    let cycle = CycleSequence::new(CYCLE, Arc::clone(&store), executor);

    let elements: Vec<String> = (0..config.elements).map(|i| format!("e{i}")).collect();
    cycle.create(elements.clone())?;

    let barrier = Barrier::new(config.threads + 1);
    let (seen, elapsed) = scope(|s| {
        let workers: Vec<_> = (0..config.threads)
            .map(|worker| {
                let cycle = &cycle;
                let store = &store;
                let barrier = &barrier;
                s.spawn(move || -> anyhow::Result<HashMap<String, usize>> {
                    let mut seen = HashMap::new();
                    barrier.wait();
                    for call in 1..=config.calls {
                        let element = cycle
                            .advance()?
                            .context("cycle vanished while advancing")?;
                        *seen.entry(element).or_default() += 1;

                        if worker == 0 && config.flush_every.is_some_and(|n| call % n == 0) {
                            tracing::debug!(call, "flushing scripts");
                            store.flush_scripts();
                        }
                    }
                    Ok(seen)
                })
            })
            .collect();

        barrier.wait();
        let start = Instant::now();
        let seen: Vec<_> = workers
            .into_iter()
            .map(|w| w.join().unwrap_or_else(|_| Err(anyhow::anyhow!("worker panicked"))))
            .collect();
        (seen, start.elapsed())
    });

    let mut counts: HashMap<String, usize> = HashMap::new();
    for worker in seen {
        for (element, n) in worker? {
            *counts.entry(element).or_default() += n;
        }
    }

    let total = config.total_calls();
    let n = config.elements;
    for (i, element) in elements.iter().enumerate() {
        let expected = total / n + usize::from(i < total % n);
        let got = counts.remove(element).unwrap_or(0);
        if got != expected {
            bail!("element {element} handed out {got} times, expected {expected}");
        }
    }
    if let Some(stray) = counts.keys().next() {
        bail!("cycle handed out unknown element {stray}");
    }

    let next = cycle.advance()?;
    let expected = &elements[total % n];
    if next.as_ref() != Some(expected) {
        bail!("cycle resumed at {next:?}, expected {expected}");
    }

    cycle.delete()?;
    Ok(Throughput {
        ops: total,
        elapsed,
    })
}
