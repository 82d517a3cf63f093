use std::collections::HashSet;

use ctkr_common::{MarketRecord, QuoteResult};
use ctkr_core::dispatcher;
use proptest::prelude::*;

// ── Completeness ─────────────────────────────────────────────────────

proptest! {
    /// Every distinct input key gets exactly one entry, however many tasks fail.
    #[test]
    fn every_key_gets_an_outcome(
        keys in prop::collection::vec(0u16..500, 0..80),
        limit in 1usize..16,
        fail_every in 1u16..7,
    ) {
        let sources: Vec<String> = keys.iter().map(|k| format!("source-{}", k)).collect();
        let expected: HashSet<String> = sources.iter().cloned().collect();

        let out = dispatcher::run(
            |source: &String| {
                let n: u16 = source.trim_start_matches("source-").parse().unwrap_or(0);
                if n % fail_every == 0 {
                    MarketRecord::unavailable("NetworkError")
                } else {
                    MarketRecord::Available(Default::default())
                }
            },
            limit,
            sources,
        )
        .unwrap();

        prop_assert_eq!(out.len(), expected.len());
        let got: HashSet<String> = out.keys().cloned().collect();
        prop_assert_eq!(got, expected);
    }

    /// Isolation: the outcome of a key depends only on its own task.
    #[test]
    fn failures_do_not_leak_to_other_keys(n in 1u32..40, bad in 0u32..40, limit in 1usize..8) {
        let out = dispatcher::run(
            |k: &u32| {
                if *k == bad {
                    QuoteResult::Failed("ExchangeNotAvailable".into())
                } else {
                    QuoteResult::Value(f64::from(*k) + 0.5)
                }
            },
            limit,
            0..n,
        )
        .unwrap();

        prop_assert_eq!(out.len() as u32, n);
        for (k, v) in &out {
            if *k == bad {
                prop_assert_eq!(v, &QuoteResult::Failed("ExchangeNotAvailable".into()));
            } else {
                prop_assert_eq!(v, &QuoteResult::Value(f64::from(*k) + 0.5));
            }
        }
    }
}
