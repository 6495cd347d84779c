//! Error taxonomy surfaced across the crate boundary (spec §7).
//!
//! This is the single place raw upstream errors get folded into the
//! sanitized categories a caller is allowed to see. Everything with more
//! detail (parser errors, HTTP status codes, SQL errors) stays internal to
//! the crate that produced it and is attached here only as a short message.

use thiserror::Error;

/// The caller-visible error taxonomy. Variant names follow spec §7; they are
/// categories, not wrappers around implementation types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("insufficient source data: {0}")]
    InsufficientSourceData(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Promoted from a per-scenario `NumericOverflow` when all three DCF
    /// scenarios fail (spec §7: "If all three fail, promote to terminal
    /// `ValuationFailed`").
    #[error("valuation failed: all scenarios produced a non-finite result")]
    ValuationFailed,

    #[error("invalid inputs: {0}")]
    InvalidInputs(String),

    #[error("analysis failed: {0}")]
    AnalysisFailed(String),
}

impl CoreError {
    /// Category name, used for structured logging and metrics-free
    /// classification without leaking the message body.
    pub fn category(&self) -> &'static str {
        match self {
            CoreError::UnknownTicker(_) => "UnknownTicker",
            CoreError::InsufficientSourceData(_) => "InsufficientSourceData",
            CoreError::ExtractionFailed(_) => "ExtractionFailed",
            CoreError::ValuationFailed => "ValuationFailed",
            CoreError::InvalidInputs(_) => "InvalidInputs",
            CoreError::AnalysisFailed(_) => "AnalysisFailed",
        }
    }
}
