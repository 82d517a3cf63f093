//! Shared constants and defaults.

/// Where the market snapshot is persisted unless configured otherwise.
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/market_data.bin";
/// Default number of sources queried at the same time.
pub const DEFAULT_CONCURRENCY: usize = 40;

/// Sentinel for "no error" on a market record and for a missing quote value.
pub const NOT_AVAILABLE: &str = "N/A";
/// Sentinel rendered in place of the lists of a failed market record.
pub const UNAVAILABLE: &str = "unavailable";

/// Leading bytes of every snapshot file.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"CTKR";
/// Bumped whenever the persisted layout changes; older files are rejected as corrupt.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
