//! Connector backed by a JSON catalog file.
//!
//! The catalog lists every source with either its market listing or the kind
//! of failure it reports, plus the quotes it serves:
//!
//! ```json
//! {
//!   "sources": {
//!     "kraken": {
//!       "market": { "countries": ["US"], "coins": ["BTC", "USD"], "symbols": ["BTC/USD"] },
//!       "quotes": { "BTC/USD": { "last_price": 64000.5, "bid": 64000.0 } },
//!       "quote_errors": { "ETH/USD": "RequestTimeout" }
//!     },
//!     "zaif": { "error": "ExchangeNotAvailable" }
//!   }
//! }
//! ```
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ctkr_common::{ConnectorError, MarketInfo, Quote, Result, SourceConnector, SourceId};
use serde::Deserialize;

/// One source in the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    /// Listing returned by `describe_market`.
    pub market: Option<MarketInfo>,
    /// Failure kind returned by `describe_market` instead of the listing.
    pub error: Option<String>,
    /// Quotes by symbol.
    pub quotes: HashMap<String, Quote>,
    /// Failure kinds by symbol.
    pub quote_errors: HashMap<String, String>,
}

/// Parsed catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConnector {
    #[serde(default)]
    sources: BTreeMap<SourceId, CatalogEntry>,
}

impl CatalogConnector {
    /// Read a catalog from `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a catalog from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Number of sources in the catalog.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the catalog lists no source.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn entry(&self, source: &str) -> std::result::Result<&CatalogEntry, ConnectorError> {
        self.sources
            .get(source)
            .ok_or_else(|| ConnectorError::ExchangeNotAvailable(source.to_string()))
    }
}

impl SourceConnector for CatalogConnector {
    fn list_sources(&self) -> Vec<SourceId> {
        self.sources.keys().cloned().collect()
    }

    fn describe_market(&self, source: &str) -> std::result::Result<MarketInfo, ConnectorError> {
        let entry = self.entry(source)?;
        if let Some(kind) = &entry.error {
            return Err(ConnectorError::other(kind.as_str(), format!("{} failed", source)));
        }
        entry
            .market
            .clone()
            .ok_or_else(|| ConnectorError::NotSupported(format!("{} has no market listing", source)))
    }

    fn get_quote(&self, source: &str, symbol: &str) -> std::result::Result<Quote, ConnectorError> {
        let entry = self.entry(source)?;
        if let Some(kind) = entry.quote_errors.get(symbol) {
            return Err(ConnectorError::other(kind.as_str(), format!("{} on {}", symbol, source)));
        }
        entry
            .quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| ConnectorError::BadSymbol(symbol.to_string()))
    }
}
