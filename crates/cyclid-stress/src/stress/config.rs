use anyhow::bail;
use clap::Parser;

/// Runtime configuration for the `cyclid-stress` binary.
///
/// Every value can come from a CLI flag or an environment variable (a `.env`
/// file is honored).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cyclid-stress",
    version,
    about = "Hammers a shared cycle and token generator from many threads"
)]
pub struct CliArgs {
    /// Number of threads advancing the cycle and minting tokens.
    ///
    /// Environment variable: `CYCLID_THREADS`
    #[arg(long, env = "CYCLID_THREADS", default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Cycle advances performed by each thread.
    ///
    /// Environment variable: `CYCLID_CALLS`
    #[arg(long, env = "CYCLID_CALLS", default_value_t = 10_000)]
    pub calls: usize,

    /// Number of elements in the stressed cycle.
    ///
    /// Environment variable: `CYCLID_ELEMENTS`
    #[arg(long, env = "CYCLID_ELEMENTS", default_value_t = 7)]
    pub elements: usize,

    /// Total tokens minted across all threads.
    ///
    /// Tokens are bounded by the wall clock to one per millisecond, so this
    /// phase takes at least this many milliseconds.
    ///
    /// Environment variable: `CYCLID_TOKENS`
    #[arg(long, env = "CYCLID_TOKENS", default_value_t = 2_000)]
    pub tokens: usize,

    /// Flush the store's script cache every N advances of the first thread.
    /// `0` never flushes.
    ///
    /// Environment variable: `CYCLID_FLUSH_EVERY`
    #[arg(long, env = "CYCLID_FLUSH_EVERY", default_value_t = 1_000)]
    pub flush_every: usize,
}

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub threads: usize,
    pub calls: usize,
    pub elements: usize,
    pub tokens_per_thread: usize,
    pub flush_every: Option<usize>,
}

impl StressConfig {
    pub fn total_calls(&self) -> usize {
        self.threads * self.calls
    }

    pub fn total_tokens(&self) -> usize {
        self.threads * self.tokens_per_thread
    }
}

impl TryFrom<CliArgs> for StressConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.threads == 0 {
            bail!("CYCLID_THREADS must be greater than 0");
        }

        if args.elements == 0 {
            bail!("CYCLID_ELEMENTS must be greater than 0");
        }

        if args.threads.checked_mul(args.calls).is_none() {
            bail!(
                "CYCLID_THREADS ({}) x CYCLID_CALLS ({}) overflows",
                args.threads,
                args.calls
            );
        }

        if args.tokens < args.threads {
            bail!(
                "CYCLID_TOKENS ({}) must be at least CYCLID_THREADS ({})",
                args.tokens,
                args.threads
            );
        }

        Ok(Self {
            threads: args.threads,
            calls: args.calls,
            elements: args.elements,
            tokens_per_thread: args.tokens / args.threads,
            flush_every: (args.flush_every > 0).then_some(args.flush_every),
        })
    }
}
