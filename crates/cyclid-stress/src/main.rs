#![doc = include_str!("../README.md")]

mod stress;

use clap::Parser;
use stress::config::{CliArgs, StressConfig};
use stress::telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = StressConfig::try_from(args)?;

    init_telemetry();
    log_startup_info(&config);

    let cycle = stress::cycle::run(&config)?;
    tracing::info!(
        advances = cycle.ops,
        elapsed = ?cycle.elapsed,
        per_sec = cycle.per_second(),
        "cycle stress passed"
    );

    let tokens = stress::token::run(&config)?;
    tracing::info!(
        tokens = tokens.throughput.ops,
        elapsed = ?tokens.throughput.elapsed,
        per_sec = tokens.throughput.per_second(),
        out_of_order = tokens.out_of_order,
        "token stress passed"
    );

    Ok(())
}

fn log_startup_info(config: &StressConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting stress run with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting stress run: {} threads x {} advances, {} tokens",
            config.threads,
            config.calls,
            config.total_tokens()
        );
    }
}
