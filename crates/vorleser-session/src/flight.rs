// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-flight execution — concurrent callers asking for the same key share
// one run of the job.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use vorleser_core::error::Result;

/// Deduplicates concurrent jobs by key.
///
/// The first caller for a key runs the job; callers arriving while it runs
/// wait and receive a clone of its value. Once a key's job has finished the
/// key is forgotten, so a later call runs the job again (results are not
/// memoised here). A failed run is not shared: the next waiter, if any,
/// retries the job itself.
pub struct SingleFlight<K, V> {
    calls: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` for `key`, or join the run already in progress.
    pub async fn run<F, Fut>(&self, key: K, job: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(calls.entry(key.clone()).or_default())
        };

        let outcome = cell.get_or_try_init(job).await.cloned();

        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        let finished = calls.get(&key).is_some_and(|current| {
            // Clones of the cell are only taken under this lock, so a count of
            // two (the map and us) means nobody else is waiting on it.
            Arc::ptr_eq(current, &cell) && (cell.initialized() || Arc::strong_count(&cell) == 2)
        });
        if finished {
            calls.remove(&key);
        }

        outcome
    }

    /// Number of keys with a job in progress.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use vorleser_core::error::VorleserError;

    use super::*;

    #[tokio::test]
    async fn concurrent_callers_share_one_run() {
        let flight = Arc::new(SingleFlight::<&'static str, u32>::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = Arc::clone(&flight);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                flight
                    .run("doc.pdf", || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn different_keys_run_independently() {
        let flight = SingleFlight::<u8, u8>::new();
        let (a, b) = tokio::join!(
            flight.run(1, || async { Ok(10) }),
            flight.run(2, || async { Ok(20) }),
        );
        assert_eq!(a.unwrap(), 10);
        assert_eq!(b.unwrap(), 20);
    }

    #[tokio::test]
    async fn finished_key_runs_again() {
        let flight = SingleFlight::<u8, usize>::new();
        let runs = AtomicUsize::new(0);

        for expected in 1..=2 {
            let value = flight
                .run(7, || async { Ok(runs.fetch_add(1, Ordering::SeqCst) + 1) })
                .await
                .unwrap();
            assert_eq!(value, expected);
        }
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn failure_is_not_cached() {
        let flight = SingleFlight::<u8, u8>::new();

        let failed = flight
            .run(1, || async { Err(VorleserError::Extraction("boom".into())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(flight.in_flight(), 0);

        let retried = flight.run(1, || async { Ok(5) }).await;
        assert_eq!(retried.unwrap(), 5);
    }
}
