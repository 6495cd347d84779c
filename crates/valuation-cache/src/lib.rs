//! Fingerprinted, TTL'd, single-flight cache over SQLite (spec §4.8, §9).

mod error;
mod fingerprint;
mod manager;
mod single_flight;
mod store;

pub use error::CacheError;
pub use fingerprint::{analysis_key, canonical_json, extraction_key, price_key, sha256_hex, valuation_key};
pub use manager::{CacheManager, CacheTtls};
pub use single_flight::SingleFlight;
pub use store::SqliteStore;
