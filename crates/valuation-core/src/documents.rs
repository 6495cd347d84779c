//! Loads a `SourceDocument` from `DATA_DIR` (spec §6). Storage layout is
//! implementation-defined: one JSON file per ticker, named after the
//! ticker itself.

use std::path::Path;

use valuation_types::SourceDocument;

pub async fn load(data_dir: &str, ticker: &str) -> Option<SourceDocument> {
    let path = Path::new(data_dir).join(format!("{ticker}.json"));
    let raw = tokio::fs::read_to_string(&path).await.ok()?;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    Some(SourceDocument {
        ticker: ticker.to_string(),
        raw: value,
    })
}
