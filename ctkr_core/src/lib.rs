//! Concurrent acquisition engine.
//!
//! - `dispatcher`: bounded worker pool returning one outcome per input key.
//! - `codec`: snapshot file encoding and whole-file replacement.
//! - `store`: the market snapshot store (load, refresh, save).
//! - `tickers`: symbol/country filtering and per-source quote fetching.
#![warn(missing_docs)]
pub mod codec;
pub mod dispatcher;
pub mod store;
pub mod tickers;

pub use dispatcher::Dispatcher;
pub use store::{MarketSnapshotStore, SnapshotOrigin, SnapshotSummary, StoreConfig, StoreState};
pub use tickers::{TickerQuery, TickerRequest, ZeroValuePolicy, filter_markets};
