//! Scripted connector shared by the integration tests.
#![allow(dead_code)]
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use ctkr_common::{ConnectorError, MarketInfo, Quote, SourceConnector, SourceId};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
pub struct FakeConnector {
    markets: HashMap<SourceId, Result<MarketInfo, ConnectorError>>,
    quotes: HashMap<(SourceId, String), Result<Quote, ConnectorError>>,
    list_calls: AtomicUsize,
    quote_calls: AtomicUsize,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, source: &str, symbols: &[&str], countries: &[&str]) -> Self {
        let info = MarketInfo {
            countries: countries.iter().map(|c| c.to_string()).collect(),
            coins: symbols
                .iter()
                .flat_map(|s| s.split('/'))
                .map(str::to_string)
                .collect(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        };
        self.markets.insert(source.to_string(), Ok(info));
        self
    }

    pub fn with_market_error(mut self, source: &str, err: ConnectorError) -> Self {
        self.markets.insert(source.to_string(), Err(err));
        self
    }

    pub fn with_quote(mut self, source: &str, symbol: &str, quote: Quote) -> Self {
        self.quotes
            .insert((source.to_string(), symbol.to_string()), Ok(quote));
        self
    }

    pub fn with_quote_error(mut self, source: &str, symbol: &str, err: ConnectorError) -> Self {
        self.quotes
            .insert((source.to_string(), symbol.to_string()), Err(err));
        self
    }

    /// Number of refresh passes started (each begins with `list_sources`).
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

impl SourceConnector for FakeConnector {
    fn list_sources(&self) -> Vec<SourceId> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut sources: Vec<SourceId> = self.markets.keys().cloned().collect();
        sources.sort();
        sources
    }

    fn describe_market(&self, source: &str) -> Result<MarketInfo, ConnectorError> {
        self.markets
            .get(source)
            .cloned()
            .unwrap_or_else(|| Err(ConnectorError::ExchangeNotAvailable(source.to_string())))
    }

    fn get_quote(&self, source: &str, symbol: &str) -> Result<Quote, ConnectorError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(&(source.to_string(), symbol.to_string()))
            .cloned()
            .unwrap_or_else(|| Err(ConnectorError::BadSymbol(symbol.to_string())))
    }
}

pub fn price(last_price: f64) -> Quote {
    Quote {
        last_price: Some(last_price),
        ..Quote::default()
    }
}
