//! Bounded fan-out of one task over a set of keys.
//!
//! The dispatcher runs `task` once per distinct key on a fixed pool of worker
//! threads and gathers every outcome into a map keyed by the input. Workers
//! pull keys from a shared `crossbeam_channel` queue and push `(key, outcome)`
//! pairs back over a second channel; the calling thread is the only writer of
//! the result map.
//!
//! Guarantees:
//! - one entry per distinct input key, whatever the individual tasks do;
//! - at most `concurrency_limit` tasks in flight at any time;
//! - a panicking task is caught and recorded as `V::from(TaskPanic)` without
//!   affecting the other tasks.
//!
//! No ordering is guaranteed on completion.
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::unbounded;
use ctkr_common::{CtkrError, Result, TaskPanic};
use log::{debug, error};

/// Worker pool with a validated concurrency limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    concurrency_limit: usize,
}

impl Dispatcher {
    /// Create a dispatcher running at most `concurrency_limit` tasks at once.
    ///
    /// Fails with `CtkrError::InvalidConcurrency` when the limit is zero.
    pub fn new(concurrency_limit: usize) -> Result<Self> {
        if concurrency_limit == 0 {
            return Err(CtkrError::InvalidConcurrency(concurrency_limit));
        }
        Ok(Self { concurrency_limit })
    }

    /// Upper bound on simultaneously running tasks.
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Run `task` for every item and collect the outcomes by key.
    ///
    /// Duplicate items are processed once. Task failures must be expressed in
    /// `V`; the batch itself only fails on channel errors.
    pub fn run<K, V, F, I>(&self, task: F, items: I) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + Clone + Send + Debug,
        V: From<TaskPanic> + Send,
        F: Fn(&K) -> V + Sync,
        I: IntoIterator<Item = K>,
    {
        let (work_tx, work_rx) = unbounded::<K>();
        let mut seen = HashSet::new();
        for key in items {
            if seen.insert(key.clone()) {
                work_tx
                    .send(key)
                    .map_err(|e| CtkrError::ChannelSend(format!("work queue: {}", e)))?;
            } else {
                debug!("Skipping duplicate work item {:?}", key);
            }
        }
        drop(work_tx);

        let total = seen.len();
        if total == 0 {
            return Ok(HashMap::new());
        }
        let workers = self.concurrency_limit.min(total);
        debug!("Dispatching {} items over {} workers", total, workers);

        let (done_tx, done_rx) = unbounded::<(K, V)>();
        let task = &task;
        let outcomes = thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for key in work_rx.iter() {
                        let outcome = run_isolated(task, &key);
                        if done_tx.send((key, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            let mut outcomes = HashMap::with_capacity(total);
            for (key, outcome) in done_rx.iter() {
                outcomes.insert(key, outcome);
            }
            outcomes
        });

        debug!("Collected {} of {} outcomes", outcomes.len(), total);
        Ok(outcomes)
    }
}

/// Validate `concurrency_limit` and run `task` over `items` in one call.
pub fn run<K, V, F, I>(task: F, concurrency_limit: usize, items: I) -> Result<HashMap<K, V>>
where
    K: Eq + Hash + Clone + Send + Debug,
    V: From<TaskPanic> + Send,
    F: Fn(&K) -> V + Sync,
    I: IntoIterator<Item = K>,
{
    Dispatcher::new(concurrency_limit)?.run(task, items)
}

fn run_isolated<K, V, F>(task: &F, key: &K) -> V
where
    K: Debug,
    V: From<TaskPanic>,
    F: Fn(&K) -> V,
{
    match panic::catch_unwind(AssertUnwindSafe(|| task(key))) {
        Ok(outcome) => outcome,
        Err(_) => {
            error!("Task for {:?} panicked", key);
            V::from(TaskPanic)
        }
    }
}
