//! Interface to the remote data sources.
//!
//! The engine never talks to a source directly. It goes through a
//! `SourceConnector`, which knows the universe of sources and how to ask one
//! of them for its market listing or a live quote. Any failure is reported
//! as a `ConnectorError`, whose kind name is what ends up tagged on the
//! per-source outcome.
use strum_macros::IntoStaticStr;
use thiserror::Error;

use crate::market::{MarketInfo, SourceId};
use crate::quote::Quote;

/// Failure reported by a connector for a single source.
#[derive(Error, Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum ConnectorError {
    /// Transport level failure (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    NetworkError(String),

    /// The source did not answer in time.
    #[error("request timed out")]
    RequestTimeout,

    /// The source is down, in maintenance or otherwise not serving requests.
    #[error("source not available: {0}")]
    ExchangeNotAvailable(String),

    /// The symbol is not listed on the source.
    #[error("bad symbol: {0}")]
    BadSymbol(String),

    /// The source does not implement the requested call.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The source refused the request for lack of credentials.
    #[error("authentication error: {0}")]
    AuthenticationError(String),

    /// Any other failure, tagged with its own kind name.
    #[error("{kind}: {message}")]
    Other {
        /// Kind name reported as the failure tag.
        kind: String,
        /// Human-readable detail.
        message: String,
    },
}

impl ConnectorError {
    /// Build an error carrying an arbitrary kind name.
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Kind name used as the failure tag on records and quote results.
    pub fn kind(&self) -> &str {
        match self {
            ConnectorError::Other { kind, .. } => kind.as_str(),
            _ => <&'static str>::from(self),
        }
    }
}

/// Marker for a dispatched task that panicked instead of returning an outcome.
///
/// Outcome types implement `From<TaskPanic>` so the dispatcher can still
/// produce an entry for the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPanic;

impl TaskPanic {
    /// Kind name reported for a panicked task.
    pub const KIND: &'static str = "TaskPanic";
}

/// Access to the remote sources.
///
/// Implementations are called from several worker threads at once, so they
/// must be `Send + Sync`. Calls are blocking.
pub trait SourceConnector: Send + Sync {
    /// Every source known to the connector.
    fn list_sources(&self) -> Vec<SourceId>;

    /// Market listing (countries, coins, symbols) of one source.
    fn describe_market(&self, source: &str) -> Result<MarketInfo, ConnectorError>;

    /// Live quote for `symbol` on `source`.
    fn get_quote(&self, source: &str, symbol: &str) -> Result<Quote, ConnectorError>;
}

impl<C: SourceConnector + ?Sized> SourceConnector for std::sync::Arc<C> {
    fn list_sources(&self) -> Vec<SourceId> {
        (**self).list_sources()
    }

    fn describe_market(&self, source: &str) -> Result<MarketInfo, ConnectorError> {
        (**self).describe_market(source)
    }

    fn get_quote(&self, source: &str, symbol: &str) -> Result<Quote, ConnectorError> {
        (**self).get_quote(source, symbol)
    }
}
