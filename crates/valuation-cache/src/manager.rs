//! `CacheManager`: the fingerprinted, TTL'd, single-flight facade the
//! orchestrator talks to (spec §4.8, §4.9, §9). Combines `SqliteStore` for
//! persistence with `SingleFlight` for in-flight de-duplication.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use valuation_types::{CacheEntry, CacheStage};

use crate::error::CacheError;
use crate::single_flight::SingleFlight;
use crate::store::SqliteStore;

/// Per-stage TTLs, seconds (spec §6).
pub struct CacheTtls {
    pub extraction_secs: i64,
    pub valuation_secs: i64,
    pub analysis_secs: i64,
    pub price_secs: i64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            extraction_secs: 604_800,
            valuation_secs: 86_400,
            analysis_secs: 604_800,
            price_secs: 30,
        }
    }
}

impl CacheTtls {
    fn for_stage(&self, stage: CacheStage) -> i64 {
        match stage {
            CacheStage::Extraction => self.extraction_secs,
            CacheStage::Valuation => self.valuation_secs,
            CacheStage::Analysis => self.analysis_secs,
            CacheStage::Price => self.price_secs,
        }
    }
}

#[derive(Clone)]
pub struct CacheManager {
    store: SqliteStore,
    single_flight: SingleFlight,
    ttls: std::sync::Arc<CacheTtls>,
}

impl CacheManager {
    pub fn new(store: SqliteStore, ttls: CacheTtls) -> Self {
        Self {
            store,
            single_flight: SingleFlight::new(),
            ttls: std::sync::Arc::new(ttls),
        }
    }

    /// Looks up `key`, returning `None` if absent or expired. An expired
    /// row is left in place; `get_or_compute` overwrites it on refresh.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(entry) = self.store.get(key).await? else {
            return Ok(None);
        };
        if entry.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(entry.payload)?))
    }

    pub async fn set<T: Serialize>(&self, key: &str, stage: CacheStage, value: &T) -> Result<(), CacheError> {
        let payload = serde_json::to_value(value)?;
        let entry = CacheEntry {
            fingerprint: key.to_string(),
            stage,
            payload,
            created_at: Utc::now(),
            ttl_secs: self.ttls.for_stage(stage),
        };
        self.store.set(&entry).await
    }

    /// Single-flight: a cache hit skips the producer entirely. On a miss,
    /// callers serialize on `key` so only one of them runs `producer`; the
    /// losers re-check the cache after acquiring the lock and observe the
    /// winner's write instead of recomputing.
    pub async fn get_or_compute<T, F, Fut, E>(
        &self,
        key: &str,
        stage: CacheStage,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: From<CacheError>,
    {
        if let Some(hit) = self.get::<T>(key).await? {
            return Ok(hit);
        }

        let store = self.store.clone();
        let ttls = self.ttls.clone();
        let key_owned = key.to_string();

        self.single_flight
            .run(key, move || async move {
                if let Some(row) = store.get(&key_owned).await? {
                    if !row.is_expired(Utc::now()) {
                        return Ok(serde_json::from_value(row.payload)?);
                    }
                }

                let value = producer().await?;
                let entry = CacheEntry {
                    fingerprint: key_owned.clone(),
                    stage,
                    payload: serde_json::to_value(&value)?,
                    created_at: Utc::now(),
                    ttl_secs: ttls.for_stage(stage),
                };
                store.set(&entry).await?;
                Ok(value)
            })
            .await
    }

    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await?;
        Ok(())
    }

    /// Invalidates `keys` in the order given. Callers invalidate downstream
    /// stages first when refreshing upstream (spec §4.9): a fresh
    /// extraction invalidates valuation and analysis, a fresh valuation
    /// invalidates analysis.
    pub async fn invalidate_many(&self, keys: &[&str]) -> Result<(), CacheError> {
        for key in keys {
            self.invalidate(key).await?;
        }
        Ok(())
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.ttls
    }

    /// Raw canonical-JSON passthrough, for callers building fingerprints
    /// from values that aren't themselves the cached payload (e.g. hashing
    /// a `StandardizedValuationInput` to derive a valuation key before the
    /// `ValuationResult` it will key exists).
    pub fn canonical_json(value: &Value) -> String {
        crate::fingerprint::canonical_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A pooled `sqlite::memory:` database hands each connection its own
    /// isolated DB, so tests use a tempfile-backed database instead -
    /// kept alive for the duration of the test via the returned guard.
    async fn manager() -> (CacheManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite3");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let store = SqliteStore::connect(&url).await.unwrap();
        (CacheManager::new(store, CacheTtls::default()), dir)
    }

    #[tokio::test]
    async fn miss_then_hit_round_trips_through_sqlite() {
        let (mgr, _dir) = manager().await;
        assert_eq!(mgr.get::<String>("k1").await.unwrap(), None);
        mgr.set("k1", CacheStage::Valuation, &"payload".to_string()).await.unwrap();
        assert_eq!(mgr.get::<String>("k1").await.unwrap(), Some("payload".to_string()));
    }

    #[tokio::test]
    async fn get_or_compute_only_calls_producer_once_per_key() {
        let (mgr, _dir) = manager().await;
        let mgr = Arc::new(mgr);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let mgr = mgr.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                mgr.get_or_compute::<String, _, _, CacheError>("k2", CacheStage::Extraction, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    Ok("computed".to_string())
                })
                .await
                .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_removes_the_entry() {
        let (mgr, _dir) = manager().await;
        mgr.set("k3", CacheStage::Analysis, &"x".to_string()).await.unwrap();
        mgr.invalidate("k3").await.unwrap();
        assert_eq!(mgr.get::<String>("k3").await.unwrap(), None);
    }
}
