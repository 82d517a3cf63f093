//! ctkr: prints market metadata and quotes gathered from many sources at once.
//!
//! The market snapshot is loaded from `--cache` or, when missing (or when
//! `--refresh` is given), fetched from every source of the catalog and saved
//! there. Output is JSON on stdout; logs go to stderr.
//!
//! Usage example (CLI):
//! ```bash
//! ctkr --catalog ./catalog.json --refresh markets
//! ctkr --catalog ./catalog.json ticker BTC/USD --country US --attribute bid
//! ```
#![warn(missing_docs)]
mod args;
mod catalog;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use ctkr_common::{CtkrError, MarketRecord, Result, SourceId};
use ctkr_core::{
    MarketSnapshotStore, SnapshotOrigin, SnapshotSummary, StoreConfig, TickerQuery, TickerRequest,
    ZeroValuePolicy,
};
use log::{info, warn};
use serde::Serialize;

use crate::args::{Args, Command};
use crate::catalog::CatalogConnector;

#[derive(Serialize)]
struct MarketsReport<'a> {
    cache: String,
    fetched_at: String,
    origin: SnapshotOrigin,
    summary: SnapshotSummary,
    markets: BTreeMap<&'a SourceId, &'a MarketRecord>,
}

fn main() -> Result<(), CtkrError> {
    init_logger();
    let args = Args::parse();

    let catalog_path = normalize_path(&args.catalog);
    let connector = CatalogConnector::from_path(&catalog_path)?;
    info!(
        "Catalog {} lists {} sources",
        catalog_path.display(),
        connector.len()
    );
    if connector.is_empty() {
        warn!("Catalog {} has no sources", catalog_path.display());
    }

    let store = MarketSnapshotStore::open(connector, store_config(&args)?)?;

    match args.command {
        Command::Markets => {
            let report = MarketsReport {
                cache: store.path().display().to_string(),
                fetched_at: store.fetched_at().to_rfc3339(),
                origin: store.origin(),
                summary: store.summary(),
                markets: store.snapshot().iter().collect(),
            };
            print_json(&report)
        }
        Command::Ticker {
            symbol,
            country,
            attribute,
            keep_zero,
        } => {
            let mut request = TickerRequest::new(symbol)
                .with_attribute(attribute)
                .with_concurrency_limit(args.workers);
            if let Some(country) = country {
                request = request.in_country(country);
            }
            if keep_zero {
                request = request.with_zero_policy(ZeroValuePolicy::KeepZero);
            }

            let quotes = TickerQuery::new(&store).query(&request)?;
            let sorted: BTreeMap<_, _> = quotes.into_iter().collect();
            print_json(&sorted)
        }
    }
}

fn store_config(args: &Args) -> Result<StoreConfig> {
    let config = StoreConfig::new(normalize_path(&args.cache))
        .with_refresh(args.refresh)
        .with_concurrency_limit(args.workers);
    match args.max_age_hours {
        Some(hours) => config.with_max_age_hours(hours),
        None => Ok(config),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
