//! Market snapshot store.
//!
//! Owns the mapping of every known source to its `MarketRecord`. On open the
//! store either loads the persisted snapshot or, when asked to refresh or when
//! no snapshot exists yet, queries every source through the dispatcher and
//! persists the result.
//!
//! Refreshing takes `&mut self`: a store is refreshed by one caller at a time.
//! Sharing a store between threads that may refresh it requires an outer
//! `Mutex` or `RwLock`.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use ctkr_common::defaults::{DEFAULT_CONCURRENCY, DEFAULT_SNAPSHOT_PATH};
use ctkr_common::{
    CtkrError, MarketRecord, Result, Snapshot, SnapshotFile, SourceConnector, SourceId,
};
use log::{debug, info, warn};
use serde::Serialize;

use crate::codec;
use crate::dispatcher::Dispatcher;

/// Settings for opening a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Snapshot file location.
    pub path: PathBuf,
    /// Skip the persisted snapshot and fetch fresh data on open.
    pub refresh: bool,
    /// Number of sources described at the same time during a refresh.
    pub concurrency_limit: usize,
    /// Age after which a loaded snapshot is considered stale and refetched.
    pub max_age: Option<TimeDelta>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            refresh: false,
            concurrency_limit: DEFAULT_CONCURRENCY,
            max_age: None,
        }
    }
}

impl StoreConfig {
    /// Default settings with the snapshot stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Whether to ignore the persisted snapshot on open.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Worker count used for refreshes.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Refetch loaded snapshots older than `max_age`.
    pub fn with_max_age(mut self, max_age: TimeDelta) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Refetch loaded snapshots older than `hours`.
    ///
    /// Negative or out-of-range hour counts fail with `CtkrError::InvalidMaxAge`.
    pub fn with_max_age_hours(self, hours: i64) -> Result<Self> {
        match TimeDelta::try_hours(hours) {
            Some(max_age) if hours >= 0 => Ok(self.with_max_age(max_age)),
            _ => Err(CtkrError::InvalidMaxAge(hours)),
        }
    }
}

/// Lifecycle of a store's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StoreState {
    /// No snapshot yet.
    Uninitialized,
    /// A snapshot is held and within its maximum age.
    Loaded,
    /// The held snapshot is older than the configured maximum age.
    Stale,
}

/// Where the held snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapshotOrigin {
    /// Read from the snapshot file.
    Cache,
    /// Produced by a refresh pass of this store.
    Refresh,
}

/// Counts over a snapshot, failures grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    /// Number of sources in the snapshot.
    pub total: usize,
    /// Sources that answered.
    pub available: usize,
    /// Sources that failed.
    pub unavailable: usize,
    /// Failed sources per failure kind.
    pub errors_by_kind: BTreeMap<String, usize>,
}

impl SnapshotSummary {
    /// Count the records of `snapshot`.
    pub fn of(snapshot: &Snapshot) -> Self {
        let mut summary = SnapshotSummary {
            total: snapshot.len(),
            ..Self::default()
        };
        for record in snapshot.values() {
            match record {
                MarketRecord::Available(_) => summary.available += 1,
                MarketRecord::Unavailable { error } => {
                    summary.unavailable += 1;
                    *summary.errors_by_kind.entry(error.clone()).or_default() += 1;
                }
            }
        }
        summary
    }
}

/// Owner of the market snapshot and of the connector used to refresh it.
pub struct MarketSnapshotStore<C> {
    connector: C,
    config: StoreConfig,
    file: Option<SnapshotFile>,
    origin: SnapshotOrigin,
}

impl<C: SourceConnector> MarketSnapshotStore<C> {
    /// Load the persisted snapshot or fetch a fresh one.
    ///
    /// - `refresh` set: fetch fresh, ignoring any existing file.
    /// - file missing: fetch fresh.
    /// - file present: load it; refetch once if older than `max_age`.
    /// - any other load failure is returned as is.
    pub fn open(connector: C, config: StoreConfig) -> Result<Self> {
        Dispatcher::new(config.concurrency_limit)?;
        let mut store = Self {
            connector,
            config,
            file: None,
            origin: SnapshotOrigin::Refresh,
        };

        if store.config.refresh {
            info!("Refresh requested, ignoring {}", store.config.path.display());
            store.fetch_fresh()?;
            return Ok(store);
        }

        match codec::load(&store.config.path) {
            Ok(file) => {
                info!(
                    "Loaded {} markets from {}",
                    file.markets.len(),
                    store.config.path.display()
                );
                store.file = Some(file);
                store.origin = SnapshotOrigin::Cache;
                if store.state() == StoreState::Stale {
                    info!("Snapshot fetched at {} is stale", store.fetched_at());
                    store.fetch_fresh()?;
                }
            }
            Err(CtkrError::SnapshotNotFound(path)) => {
                info!("No snapshot at {}, fetching markets", path.display());
                store.fetch_fresh()?;
            }
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    /// Describe every source known to the connector, persist the new snapshot
    /// and replace the held one.
    ///
    /// A source that fails yields an `Unavailable` record tagged with the
    /// failure kind; it never fails the pass. If persisting fails the held
    /// snapshot is left untouched.
    pub fn fetch_fresh(&mut self) -> Result<&Snapshot> {
        let sources = self.connector.list_sources();
        info!(
            "Requesting markets from {} sources ({} workers)",
            sources.len(),
            self.config.concurrency_limit
        );

        let connector = &self.connector;
        let markets = Dispatcher::new(self.config.concurrency_limit)?
            .run(|source: &SourceId| describe_source(connector, source), sources)?;

        let file = SnapshotFile::new(markets, Utc::now().timestamp_millis());
        codec::save(&self.config.path, &file)?;

        let summary = SnapshotSummary::of(&file.markets);
        info!(
            "Saved {} markets to {} ({} available, {} unavailable)",
            summary.total,
            self.config.path.display(),
            summary.available,
            summary.unavailable
        );
        for (kind, count) in &summary.errors_by_kind {
            warn!("{} sources failed with {}", count, kind);
        }

        self.origin = SnapshotOrigin::Refresh;
        Ok(&self.file.insert(file).markets)
    }

    /// Refetch if the held snapshot is missing or stale. Returns whether a
    /// refresh ran.
    pub fn refresh_if_stale(&mut self) -> Result<bool> {
        match self.state() {
            StoreState::Loaded => Ok(false),
            StoreState::Uninitialized | StoreState::Stale => {
                self.fetch_fresh()?;
                Ok(true)
            }
        }
    }

    /// The connector this store refreshes from.
    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C> MarketSnapshotStore<C> {
    /// Read a snapshot file without opening a store.
    pub fn load(path: &Path) -> Result<SnapshotFile> {
        codec::load(path)
    }

    /// Persist the held snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        match &self.file {
            Some(file) => codec::save(path, file),
            None => {
                debug!("Nothing to save to {}", path.display());
                Ok(())
            }
        }
    }

    /// Read-only view of the current snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        static EMPTY: LazyLock<Snapshot> = LazyLock::new(Snapshot::new);
        self.file.as_ref().map_or(&*EMPTY, |f| &f.markets)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        match (&self.file, self.config.max_age) {
            (None, _) => StoreState::Uninitialized,
            (Some(_), Some(max_age)) if Utc::now() - self.fetched_at() > max_age => {
                StoreState::Stale
            }
            (Some(_), _) => StoreState::Loaded,
        }
    }

    /// Where the held snapshot came from.
    pub fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    /// Time of the refresh pass that produced the held snapshot.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.file
            .as_ref()
            .and_then(|f| DateTime::from_timestamp_millis(f.fetched_at_ms))
            .unwrap_or_default()
    }

    /// Counts over the held snapshot.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary::of(self.snapshot())
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Settings this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

fn describe_source<C: SourceConnector>(connector: &C, source: &str) -> MarketRecord {
    let record = MarketRecord::from_outcome(connector.describe_market(source));
    if let MarketRecord::Unavailable { error } = &record {
        debug!("Source {} unavailable: {}", source, error);
    }
    record
}
