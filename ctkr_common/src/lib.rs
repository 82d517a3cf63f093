//!
//! Common types shared by the acquisition engine and the command-line driver.
//!
//! This crate aggregates:
//! - `error`: unified error type `CtkrError` used across the workspace.
//! - `result`: handy `Result<T, CtkrError>` alias.
//! - `connector`: the `SourceConnector` interface and its `ConnectorError`.
//! - `market`: market records and the snapshot mapping.
//! - `quote`: quotes, quote attributes and per-source quote results.
//! - `defaults`: sentinels and default settings.
#![warn(missing_docs)]
pub mod connector;
pub mod defaults;
pub mod error;
pub mod market;
pub mod quote;
pub mod result;

pub use connector::{ConnectorError, SourceConnector, TaskPanic};
pub use error::CtkrError;
pub use market::{MarketInfo, MarketRecord, Snapshot, SnapshotFile, SourceId};
pub use quote::{Quote, QuoteAttribute, QuoteResult};
pub use result::Result;
