//! Error types shared across the workspace.
//!
//! `CtkrError` covers the control-path failures of the engine: persistence,
//! serialization, invalid configuration and worker channel failures. Failures
//! of a single source never surface here; they are carried as values inside
//! `MarketRecord` and `QuoteResult`.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the library crates and the CLI.
#[derive(Error, Debug)]
pub enum CtkrError {
    /// I/O error other than a missing snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No snapshot file exists at the given path. Recoverable: triggers a refresh.
    #[error("Snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    /// The snapshot file exists but cannot be decoded. Fatal, never auto-repaired.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Failure while encoding with `bincode`.
    #[error("Bincode serialization error: {0}")]
    BincodeEncode(#[from] bincode::error::EncodeError),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Concurrency limit must be at least one.
    #[error("Invalid concurrency limit: {0} (must be >= 1)")]
    InvalidConcurrency(usize),

    /// Maximum snapshot age must be a non-negative number of hours within range.
    #[error("Invalid maximum snapshot age: {0} hours")]
    InvalidMaxAge(i64),

    /// Requested quote attribute is not one of the supported fields.
    #[error("Unsupported quote attribute: {0}")]
    UnsupportedAttribute(String),

    /// Crossbeam channel send failed; contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),
}
