use super::{Throughput, config::StressConfig};
use anyhow::bail;
use cyclid::TokenGenerator;
use std::{
    collections::HashSet,
    sync::Barrier,
    thread::scope,
    time::Instant,
};

const LOCK: &str = "cyclid-stress";

pub struct TokenReport {
    pub throughput: Throughput,
    /// Tokens whose timestamp was lower than the previous token minted by the
    /// same thread. The wall clock may step backwards, so this only warns.
    pub out_of_order: usize,
}

/// Mints tokens from one shared generator on every thread and checks that no
/// two are equal.
pub fn run(config: &StressConfig) -> anyhow::Result<TokenReport> {
    let generator = TokenGenerator::default();
    let barrier = Barrier::new(config.threads + 1);

    let (minted, elapsed) = scope(|s| {
        let workers: Vec<_> = (0..config.threads)
            .map(|_| {
                let generator = generator.clone();
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    (0..config.tokens_per_thread)
                        .map(|_| generator.generate_unique_token_value(LOCK).into_token())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        barrier.wait();
        let start = Instant::now();
        let minted: Vec<_> = workers.into_iter().map(|w| w.join()).collect();
        (minted, start.elapsed())
    });

    let mut unique = HashSet::with_capacity(config.total_tokens());
    let mut out_of_order = 0;
    for worker in minted {
        let Ok(tokens) = worker else {
            bail!("token worker panicked");
        };
        out_of_order += tokens
            .windows(2)
            .filter(|pair| pair[1].timestamp() < pair[0].timestamp())
            .count();
        for token in tokens {
            let rendered = token.to_string();
            if !unique.insert(rendered.clone()) {
                bail!("duplicate token {rendered}");
            }
        }
    }

    if out_of_order > 0 {
        tracing::warn!(out_of_order, "token timestamps went backwards within a thread");
    }

    Ok(TokenReport {
        throughput: Throughput {
            ops: unique.len(),
            elapsed,
        },
        out_of_order,
    })
}
