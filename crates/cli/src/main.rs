//! The `dragnet` binary: ingests Ethereum event logs and storage diffs into
//! Postgres and dispatches them to registered transformers.

mod commands;
mod config;
mod exports;

use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info_span, Instrument};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dragnet",
    version,
    about = "Ingests Ethereum event logs and storage diffs into Postgres"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the configured event and storage watchers until a fatal error.
    Execute {
        /// Re-check already-checked headers for watched events.
        #[arg(short = 'r', long)]
        recheck_headers: bool,
        /// Seconds to sleep between retries on execution error.
        #[arg(short = 'i', long, default_value_t = 7)]
        retry_interval: u64,
        /// Consecutive unexpected errors to allow before exiting.
        #[arg(short = 'm', long, default_value_t = 5)]
        max_unexpected_errs: u32,
        /// Only process diffs within this many blocks of head; -1 processes
        /// every pending diff.
        #[arg(short = 'd', long, default_value_t = -1, allow_hyphen_values = true)]
        diff_blocks_from_head: i64,
    },
    /// Back-fill events across headers that may already be marked checked.
    ///
    /// Useful after adding a new event transformer to an instance that has
    /// been running and checking headers against the previous (now
    /// incomplete) subscription set.
    BackfillEvents {
        /// Last block to back-fill events for.
        #[arg(short = 'e', long)]
        ending_block_number: i64,
    },
    /// Reset a header's check count so its logs are inspected again.
    ResetHeaderCheckCount {
        /// Block number of the header to reset.
        #[arg(short = 'b', long)]
        header_block_number: i64,
    },
    /// Apply any pending schema migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Execute {
            recheck_headers,
            retry_interval,
            max_unexpected_errs,
            diff_blocks_from_head,
        } => {
            commands::execute(
                config::Env::load()?,
                recheck_headers,
                Duration::from_secs(retry_interval),
                max_unexpected_errs,
                diff_blocks_from_head,
            )
            .instrument(info_span!("execute"))
            .await
        }
        Command::BackfillEvents { ending_block_number } => {
            commands::backfill_events(config::Env::load()?, ending_block_number)
                .instrument(info_span!("backfillEvents"))
                .await
        }
        Command::ResetHeaderCheckCount { header_block_number } => {
            commands::reset_header_check_count(config::Env::load()?, header_block_number)
                .instrument(info_span!("resetHeaderCheckCount"))
                .await
        }
        Command::Migrate => {
            commands::migrate(&config::database_url()?).instrument(info_span!("migrate")).await
        }
    }
}
