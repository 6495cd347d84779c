//! `CacheEntry` and cache stage identifiers (spec §3.1, §4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CacheStage {
    Extraction,
    Valuation,
    Analysis,
    /// Not produced by the core; listed for completeness (spec §4.8).
    Price,
}

impl CacheStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStage::Extraction => "extraction",
            CacheStage::Valuation => "valuation",
            CacheStage::Analysis => "analysis",
            CacheStage::Price => "price",
        }
    }
}

/// A persisted cache record. `payload` is the JSON-serialized SVI,
/// ValuationResult, or InvestmentMemo for its stage. Created by writers,
/// invalidated by TTL expiry or explicit refresh, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub stage: CacheStage,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: i64,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age.num_seconds() >= self.ttl_secs
    }
}
