//! Normalization pipeline (C1 Truncator + C2 Extractor, spec §4.1-§4.2):
//! reduces a raw `SourceDocument` to a bounded whitelist, then drives a
//! constrained LLM to emit a validated `StandardizedValuationInput`.

mod error;
mod extract;
mod fixup;
mod schema;
mod truncate;

pub use error::ExtractionError;
pub use extract::extract;
pub use truncate::truncate;
