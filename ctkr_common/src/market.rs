//! Market metadata of a source and the snapshot that collects it.
//!
//! A `MarketRecord` is either the full listing of a source or the kind name
//! of the failure that prevented fetching it, never a mix of both.
use std::collections::HashMap;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize, Serializer};

use crate::connector::{ConnectorError, TaskPanic};
use crate::defaults::{NOT_AVAILABLE, SNAPSHOT_FORMAT_VERSION, UNAVAILABLE};

/// Identifier of one remote source.
pub type SourceId = String;

/// Mapping from source to its market record, one entry per queried source.
pub type Snapshot = HashMap<SourceId, MarketRecord>;

/// Listing returned by a connector for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Countries the source operates in.
    pub countries: Vec<String>,
    /// Coins/currencies traded on the source.
    pub coins: Vec<String>,
    /// Market symbols (e.g. `BTC/USD`).
    pub symbols: Vec<String>,
}

/// Outcome of describing one source.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MarketRecord {
    /// The source answered; all three lists are populated.
    Available(MarketInfo),
    /// The source failed; `error` is the failure kind name.
    Unavailable {
        /// Failure kind name.
        error: String,
    },
}

impl MarketRecord {
    /// Failed record tagged with `kind`.
    pub fn unavailable(kind: impl Into<String>) -> Self {
        MarketRecord::Unavailable { error: kind.into() }
    }

    /// Convert a connector answer into a record, tagging failures with their kind.
    pub fn from_outcome(outcome: Result<MarketInfo, ConnectorError>) -> Self {
        match outcome {
            Ok(info) => MarketRecord::Available(info),
            Err(e) => MarketRecord::unavailable(e.kind()),
        }
    }

    /// True when the source answered.
    pub fn is_available(&self) -> bool {
        matches!(self, MarketRecord::Available(_))
    }

    /// Listing of an available record.
    pub fn info(&self) -> Option<&MarketInfo> {
        match self {
            MarketRecord::Available(info) => Some(info),
            MarketRecord::Unavailable { .. } => None,
        }
    }

    /// Countries, or `None` for a failed record.
    pub fn countries(&self) -> Option<&[String]> {
        self.info().map(|i| i.countries.as_slice())
    }

    /// Coins, or `None` for a failed record.
    pub fn coins(&self) -> Option<&[String]> {
        self.info().map(|i| i.coins.as_slice())
    }

    /// Symbols, or `None` for a failed record.
    pub fn symbols(&self) -> Option<&[String]> {
        self.info().map(|i| i.symbols.as_slice())
    }

    /// Failure kind name, or `"N/A"` when the source answered.
    pub fn error(&self) -> &str {
        match self {
            MarketRecord::Available(_) => NOT_AVAILABLE,
            MarketRecord::Unavailable { error } => error.as_str(),
        }
    }

    /// Whether the source lists `symbol`. Always false for a failed record.
    pub fn lists_symbol(&self, symbol: &str) -> bool {
        self.symbols()
            .is_some_and(|symbols| symbols.iter().any(|s| s == symbol))
    }

    /// Whether the source operates in `country`. Always false for a failed record.
    pub fn lists_country(&self, country: &str) -> bool {
        self.countries()
            .is_some_and(|countries| countries.iter().any(|c| c == country))
    }
}

impl From<TaskPanic> for MarketRecord {
    fn from(_: TaskPanic) -> Self {
        MarketRecord::unavailable(TaskPanic::KIND)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ListView<'a> {
    Listed(&'a [String]),
    Unavailable(&'static str),
}

impl<'a> From<Option<&'a [String]>> for ListView<'a> {
    fn from(list: Option<&'a [String]>) -> Self {
        list.map_or(ListView::Unavailable(UNAVAILABLE), ListView::Listed)
    }
}

#[derive(Serialize)]
struct RecordView<'a> {
    countries: ListView<'a>,
    coins: ListView<'a>,
    symbols: ListView<'a>,
    error: &'a str,
}

/// Serialized in the flat `{countries, coins, symbols, error}` shape, with the
/// `"unavailable"` marker in place of the lists of a failed record.
impl Serialize for MarketRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecordView {
            countries: self.countries().into(),
            coins: self.coins().into(),
            symbols: self.symbols().into(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

/// Persisted form of a snapshot.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SnapshotFile {
    /// Layout version, see `SNAPSHOT_FORMAT_VERSION`.
    pub format_version: u32,
    /// UTC time of the refresh pass that produced the snapshot, ms since the epoch.
    pub fetched_at_ms: i64,
    /// The snapshot itself.
    pub markets: Snapshot,
}

impl SnapshotFile {
    /// Wrap `markets` with the current format version.
    pub fn new(markets: Snapshot, fetched_at_ms: i64) -> Self {
        SnapshotFile {
            format_version: SNAPSHOT_FORMAT_VERSION,
            fetched_at_ms,
            markets,
        }
    }
}
