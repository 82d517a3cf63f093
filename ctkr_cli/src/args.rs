//! Command-line arguments for the ctkr driver.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::{Parser, Subcommand};
use ctkr_common::QuoteAttribute;
use ctkr_common::defaults::{DEFAULT_CONCURRENCY, DEFAULT_SNAPSHOT_PATH};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON catalog describing the sources, their markets and quotes.
    #[clap(long)]
    pub catalog: String,

    /// Snapshot file holding the market data of every source.
    #[clap(long, default_value = DEFAULT_SNAPSHOT_PATH)]
    pub cache: String,

    /// Number of sources queried at the same time.
    #[clap(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub workers: usize,

    /// Fetch fresh market data even if a snapshot exists.
    #[clap(long)]
    pub refresh: bool,

    /// Refetch the snapshot when it is older than this many hours.
    #[clap(long, allow_negative_numbers = true)]
    pub max_age_hours: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to print.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the market snapshot with a per-kind failure summary.
    Markets,
    /// Print one quote attribute of a symbol from every source listing it.
    Ticker {
        /// Market symbol, e.g. BTC/USD.
        symbol: String,

        /// Only sources operating in this country.
        #[clap(long)]
        country: Option<String>,

        /// Quote attribute to read.
        #[clap(long, value_enum, default_value_t = QuoteAttribute::LastPrice)]
        attribute: QuoteAttribute,

        /// Report zero values as numbers instead of N/A.
        #[clap(long)]
        keep_zero: bool,
    },
}
