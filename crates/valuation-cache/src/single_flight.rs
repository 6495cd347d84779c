//! Per-key single-flight lock, extending the teacher's `JobManager`
//! shared-state idiom (`Arc<RwLock<HashMap<...>>>`) with a lock held for
//! the duration of the upstream call, per key, rather than a job registry
//! keyed by job id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out a per-key `tokio::sync::Mutex` so concurrent callers for the
/// same fingerprint serialize on that key alone; callers for different
/// keys never block each other.
#[derive(Clone, Default)]
pub struct SingleFlight {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, key: &str) -> OwnedMutexGuard<()> {
        let mut locks = self.locks.lock().await;
        let entry = locks.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(())));
        let per_key = entry.clone();
        drop(locks);
        per_key.lock_owned().await
    }

    /// Runs `producer` under the key's lock. The caller is expected to
    /// re-check the cache immediately after acquiring the guard (a losing
    /// waiter sees the winner's write and skips the call); this function
    /// only provides the mutual exclusion, not the re-check.
    pub async fn run<F, Fut, T>(&self, key: &str, producer: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _guard = self.lock_for(key).await;
        producer().await
    }
}
