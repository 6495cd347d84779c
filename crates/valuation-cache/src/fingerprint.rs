//! Canonical JSON and the per-stage fingerprint formulas (spec §4.8).

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of a string; used both as the `h(...)` wrapper around whole
/// key strings and as the `sha256(...)` applied to canonical JSON bodies.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex(&hasher.finalize())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Canonical JSON: object keys sorted lexicographically, numbers emitted
/// without trailing zeros, no insignificant whitespace. `serde_json::Value`
/// already normalizes number formatting on round-trip through `Decimal`
/// (stored as strings) or plain numerics; this function only needs to
/// canonicalize key order and remove whitespace, since `serde_json` never
/// emits insignificant whitespace in `to_string`.
pub fn canonical_json(value: &Value) -> String {
    serde_json::to_string(&sort_keys(value)).expect("Value serialization cannot fail")
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

pub const SCHEMA_VERSION: &str = "v1";
pub const ENGINE_VERSION: &str = "v1";
pub const MEMO_VERSION: &str = "v1";

pub fn extraction_key(ticker: &str, truncated_source_json: &Value) -> String {
    let body = format!(
        "extract:{}:{}:{}",
        ticker,
        sha256_hex(&canonical_json(truncated_source_json)),
        SCHEMA_VERSION
    );
    sha256_hex(&body)
}

pub fn valuation_key(svi_json: &Value) -> String {
    let body = format!(
        "valuation:{}:{}",
        sha256_hex(&canonical_json(svi_json)),
        ENGINE_VERSION
    );
    sha256_hex(&body)
}

pub fn analysis_key(svi_json: &Value, valuation_fingerprint: &str) -> String {
    let body = format!(
        "analysis:{}:{}:{}",
        sha256_hex(&canonical_json(svi_json)),
        valuation_fingerprint,
        MEMO_VERSION
    );
    sha256_hex(&body)
}

/// Listed for completeness (spec §4.8); price caching is not part of the
/// core's responsibility.
pub fn price_key(ticker: &str) -> String {
    sha256_hex(&format!("price:{ticker}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_keys() {
        let value = json!({"b": 1, "a": 2});
        assert_eq!(canonical_json(&value), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn canonical_json_is_stable_on_round_trip() {
        let value = json!({"z": [1, 2, {"y": 1, "x": 2}], "a": "hello"});
        let once = canonical_json(&value);
        let reparsed: Value = serde_json::from_str(&once).unwrap();
        assert_eq!(once, canonical_json(&reparsed));
    }

    #[test]
    fn extraction_key_changes_when_truncated_source_changes() {
        let a = extraction_key("AAPL", &json!({"price": 100}));
        let b = extraction_key("AAPL", &json!({"price": 101}));
        assert_ne!(a, b);
    }

    #[test]
    fn valuation_key_is_deterministic() {
        let svi = json!({"ticker": "AAPL", "current_price": "100"});
        assert_eq!(valuation_key(&svi), valuation_key(&svi));
    }
}
