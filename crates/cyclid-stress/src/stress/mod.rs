pub mod config;
pub mod cycle;
pub mod telemetry;
pub mod token;

use std::time::Duration;

/// Outcome of one stress phase.
#[derive(Debug, Clone, Copy)]
pub struct Throughput {
    pub ops: usize,
    pub elapsed: Duration,
}

impl Throughput {
    pub fn per_second(&self) -> f64 {
        self.ops as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}
