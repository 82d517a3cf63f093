mod common;

use std::fs;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use common::{FakeConnector, init_logger};
use ctkr_common::{ConnectorError, CtkrError, MarketRecord, Snapshot, SnapshotFile};
use ctkr_core::{MarketSnapshotStore, SnapshotOrigin, StoreConfig, StoreState, codec};

fn exchanges() -> FakeConnector {
    FakeConnector::new()
        .with_market("kraken", &["BTC/USD", "ETH/USD"], &["US"])
        .with_market("bitflyer", &["BTC/JPY"], &["JP"])
        .with_market_error("coinfloor", ConnectorError::RequestTimeout)
        .with_market_error("zaif", ConnectorError::other("DDoSProtection", "blocked"))
}

#[test]
fn missing_cache_triggers_exactly_one_fetch() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("market_data.bin");

    let store = MarketSnapshotStore::open(exchanges(), StoreConfig::new(&path)).unwrap();

    assert_eq!(store.connector().list_calls(), 1);
    assert_eq!(store.origin(), SnapshotOrigin::Refresh);
    assert_eq!(store.state(), StoreState::Loaded);
    assert_eq!(store.snapshot().len(), 4);
    assert!(path.exists());
}

#[test]
fn existing_cache_is_loaded_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");
    let first = MarketSnapshotStore::open(exchanges(), StoreConfig::new(&path)).unwrap();

    let second = MarketSnapshotStore::open(exchanges(), StoreConfig::new(&path)).unwrap();

    assert_eq!(second.connector().list_calls(), 0);
    assert_eq!(second.origin(), SnapshotOrigin::Cache);
    assert_eq!(second.snapshot(), first.snapshot());
    assert_eq!(second.fetched_at(), first.fetched_at());
}

#[test]
fn refresh_flag_ignores_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");
    let stale = FakeConnector::new().with_market("kraken", &["BTC/USD"], &["US"]);
    MarketSnapshotStore::open(stale, StoreConfig::new(&path)).unwrap();

    let store =
        MarketSnapshotStore::open(exchanges(), StoreConfig::new(&path).with_refresh(true)).unwrap();

    assert_eq!(store.connector().list_calls(), 1);
    assert_eq!(store.snapshot().len(), 4);
    assert_eq!(MarketSnapshotStore::<FakeConnector>::load(&path).unwrap().markets.len(), 4);
}

#[test]
fn corrupt_cache_is_fatal_and_not_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");
    fs::write(&path, b"definitely not a snapshot").unwrap();

    let connector = Arc::new(exchanges());
    let result = MarketSnapshotStore::open(Arc::clone(&connector), StoreConfig::new(&path));

    assert!(matches!(result, Err(CtkrError::CorruptSnapshot(_))));
    assert_eq!(connector.list_calls(), 0);
}

#[test]
fn invalid_concurrency_fails_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");

    let connector = Arc::new(exchanges());
    let result = MarketSnapshotStore::open(
        Arc::clone(&connector),
        StoreConfig::new(&path).with_concurrency_limit(0),
    );

    assert!(matches!(result, Err(CtkrError::InvalidConcurrency(0))));
    assert_eq!(connector.list_calls(), 0);
    assert!(!path.exists());
}

#[test]
fn failures_are_tagged_with_their_kind() {
    let dir = tempfile::tempdir().unwrap();
    let store = MarketSnapshotStore::open(
        exchanges(),
        StoreConfig::new(dir.path().join("market_data.bin")).with_concurrency_limit(2),
    )
    .unwrap();
    let snapshot = store.snapshot();

    assert_eq!(snapshot["coinfloor"], MarketRecord::unavailable("RequestTimeout"));
    assert_eq!(snapshot["zaif"].error(), "DDoSProtection");
    assert!(snapshot["zaif"].symbols().is_none());
    assert_eq!(snapshot["kraken"].error(), "N/A");
    assert_eq!(
        snapshot["kraken"].symbols().unwrap(),
        &["BTC/USD".to_string(), "ETH/USD".to_string()]
    );

    let summary = store.summary();
    assert_eq!(summary.available, 2);
    assert_eq!(summary.unavailable, 2);
}

#[test]
fn stale_cache_is_refetched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");
    codec::save(&path, &SnapshotFile::new(Snapshot::new(), 0)).unwrap();

    let store = MarketSnapshotStore::open(
        exchanges(),
        StoreConfig::new(&path).with_max_age(TimeDelta::hours(1)),
    )
    .unwrap();

    assert_eq!(store.connector().list_calls(), 1);
    assert_eq!(store.origin(), SnapshotOrigin::Refresh);
    assert_eq!(store.snapshot().len(), 4);
    assert!(Utc::now() - store.fetched_at() < TimeDelta::hours(1));
}

#[test]
fn fresh_cache_within_max_age_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");
    MarketSnapshotStore::open(exchanges(), StoreConfig::new(&path)).unwrap();

    let mut store = MarketSnapshotStore::open(
        exchanges(),
        StoreConfig::new(&path).with_max_age(TimeDelta::hours(1)),
    )
    .unwrap();

    assert_eq!(store.state(), StoreState::Loaded);
    assert!(!store.refresh_if_stale().unwrap());
    assert_eq!(store.connector().list_calls(), 0);
}

#[test]
fn fetch_fresh_replaces_snapshot_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market_data.bin");
    let mut store = MarketSnapshotStore::open(exchanges(), StoreConfig::new(&path)).unwrap();

    let refreshed = store.fetch_fresh().unwrap().len();

    assert_eq!(refreshed, 4);
    assert_eq!(store.connector().list_calls(), 2);
    assert_eq!(codec::load(&path).unwrap().markets, *store.snapshot());
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = MarketSnapshotStore::open(
        exchanges(),
        StoreConfig::new(dir.path().join("market_data.bin")),
    )
    .unwrap();
    let copy = dir.path().join("copy.bin");

    store.save(&copy).unwrap();
    let loaded = MarketSnapshotStore::<FakeConnector>::load(&copy).unwrap();

    assert_eq!(loaded.markets, *store.snapshot());
    assert_eq!(loaded.fetched_at_ms, store.fetched_at().timestamp_millis());
}
