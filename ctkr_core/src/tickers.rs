//! Ticker queries over the market snapshot.
//!
//! A query first narrows the snapshot to the sources listing the symbol (and
//! operating in the country, when one is given), then asks each of them for a
//! live quote through the dispatcher and reads the requested attribute.
use std::collections::HashMap;

use ctkr_common::defaults::DEFAULT_CONCURRENCY;
use ctkr_common::{QuoteAttribute, QuoteResult, Result, Snapshot, SourceConnector, SourceId};
use log::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::store::MarketSnapshotStore;

/// How a quote attribute equal to zero is reported.
///
/// `TreatZeroAsMissing` reports zero the same way as an absent attribute
/// (`N/A`), so a genuine zero quote cannot be told apart from a missing one.
/// `KeepZero` reports it as a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroValuePolicy {
    /// Zero becomes `QuoteResult::NotAvailable`.
    #[default]
    TreatZeroAsMissing,
    /// Zero is returned as `QuoteResult::Value(0.0)`.
    KeepZero,
}

impl ZeroValuePolicy {
    /// Turn the attribute read off a quote into a result.
    pub fn resolve(self, value: Option<f64>) -> QuoteResult {
        match value {
            None => QuoteResult::NotAvailable,
            Some(v) if v == 0.0 && self == ZeroValuePolicy::TreatZeroAsMissing => {
                QuoteResult::NotAvailable
            }
            Some(v) => QuoteResult::Value(v),
        }
    }
}

/// Parameters of one ticker query.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerRequest {
    /// Market symbol, e.g. `BTC/USD`.
    pub symbol: String,
    /// Restrict to sources operating in this country.
    pub country: Option<String>,
    /// Attribute read off each quote.
    pub attribute: QuoteAttribute,
    /// Number of sources queried at the same time.
    pub concurrency_limit: usize,
    /// Reporting of zero values.
    pub zero_policy: ZeroValuePolicy,
}

impl TickerRequest {
    /// Request the last price of `symbol` from every source listing it.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            country: None,
            attribute: QuoteAttribute::default(),
            concurrency_limit: DEFAULT_CONCURRENCY,
            zero_policy: ZeroValuePolicy::default(),
        }
    }

    /// Only sources operating in `country`.
    pub fn in_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Attribute to read instead of the last price.
    pub fn with_attribute(mut self, attribute: QuoteAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    /// Number of sources queried at the same time.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// How zero values are reported.
    pub fn with_zero_policy(mut self, policy: ZeroValuePolicy) -> Self {
        self.zero_policy = policy;
        self
    }
}

/// Sources of `snapshot` listing `symbol`, and operating in `country` if given.
///
/// Failed records list nothing and never match. The result is sorted.
pub fn filter_markets(snapshot: &Snapshot, symbol: &str, country: Option<&str>) -> Vec<SourceId> {
    let mut sources: Vec<SourceId> = snapshot
        .iter()
        .filter(|(_, record)| record.lists_symbol(symbol))
        .filter(|(_, record)| country.is_none_or(|c| record.lists_country(c)))
        .map(|(source, _)| source.clone())
        .collect();
    sources.sort();
    sources
}

/// Query layer bound to a store.
pub struct TickerQuery<'a, C> {
    store: &'a MarketSnapshotStore<C>,
}

impl<'a, C: SourceConnector> TickerQuery<'a, C> {
    /// Query the sources of `store`'s snapshot.
    pub fn new(store: &'a MarketSnapshotStore<C>) -> Self {
        Self { store }
    }

    /// Candidate sources for a symbol/country pair.
    pub fn filter_markets(&self, symbol: &str, country: Option<&str>) -> Vec<SourceId> {
        filter_markets(self.store.snapshot(), symbol, country)
    }

    /// Fetch the requested attribute from every candidate source.
    ///
    /// The map holds exactly one entry per candidate: the value, `N/A`, or the
    /// kind of the failure reported by the connector. Only an invalid
    /// concurrency limit fails the whole query.
    pub fn query(&self, request: &TickerRequest) -> Result<HashMap<SourceId, QuoteResult>> {
        let dispatcher = Dispatcher::new(request.concurrency_limit)?;
        let sources = self.filter_markets(&request.symbol, request.country.as_deref());
        info!(
            "Requesting {} of {} from {} sources",
            request.attribute,
            request.symbol,
            sources.len()
        );

        let connector = self.store.connector();
        dispatcher.run(
            |source: &SourceId| {
                fetch_quote(
                    connector,
                    source,
                    &request.symbol,
                    request.attribute,
                    request.zero_policy,
                )
            },
            sources,
        )
    }

    /// Convenience form taking the attribute by name.
    ///
    /// An unknown attribute name fails with `CtkrError::UnsupportedAttribute`
    /// before any source is contacted.
    pub fn query_tickers(
        &self,
        symbol: &str,
        country: Option<&str>,
        attribute: &str,
        concurrency_limit: usize,
    ) -> Result<HashMap<SourceId, QuoteResult>> {
        let mut request = TickerRequest::new(symbol)
            .with_attribute(QuoteAttribute::from_name(attribute)?)
            .with_concurrency_limit(concurrency_limit);
        request.country = country.map(str::to_string);
        self.query(&request)
    }
}

fn fetch_quote<C: SourceConnector>(
    connector: &C,
    source: &str,
    symbol: &str,
    attribute: QuoteAttribute,
    policy: ZeroValuePolicy,
) -> QuoteResult {
    match connector.get_quote(source, symbol) {
        Ok(quote) => policy.resolve(quote.get(attribute)),
        Err(e) => {
            debug!("Quote {} on {} failed: {}", symbol, source, e);
            QuoteResult::failed(&e)
        }
    }
}
