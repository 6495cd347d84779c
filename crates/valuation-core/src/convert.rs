//! Folds each component's internal error enum into the caller-visible
//! `CoreError` taxonomy (spec §7, §9's "Replacing dynamic-typing
//! shortcuts" note). This is the single place that happens.

use valuation_cache::CacheError;
use valuation_extraction::ExtractionError;
use valuation_numeric::NumericError;
use valuation_types::CoreError;

pub fn from_extraction(err: ExtractionError) -> CoreError {
    match err {
        ExtractionError::InsufficientSourceData(msg) => CoreError::InsufficientSourceData(msg),
        ExtractionError::ExtractionFailed(msg) => CoreError::ExtractionFailed(msg),
    }
}

pub fn from_numeric(err: NumericError) -> CoreError {
    match err {
        NumericError::NumericOverflow(_) => CoreError::ValuationFailed,
        NumericError::InvalidInputs(msg) => CoreError::InvalidInputs(msg),
    }
}

pub fn from_analyst(err: valuation_analyst::AnalystError) -> CoreError {
    match err {
        valuation_analyst::AnalystError::AnalysisFailed(msg) => CoreError::AnalysisFailed(msg),
    }
}

/// Cache store failures have no dedicated §7 category; they surface as
/// `ExtractionFailed`/`AnalysisFailed` depending on which stage was being
/// served, since a cache outage during that stage is indistinguishable to
/// the caller from the stage itself failing.
pub fn from_cache_during_extraction(err: CacheError) -> CoreError {
    CoreError::ExtractionFailed(format!("cache error: {err}"))
}

pub fn from_cache_during_valuation(err: CacheError) -> CoreError {
    CoreError::InvalidInputs(format!("cache error: {err}"))
}

pub fn from_cache_during_analysis(err: CacheError) -> CoreError {
    CoreError::AnalysisFailed(format!("cache error: {err}"))
}

/// A timed-out extraction/analysis is `TransientUpstream` exhausted (spec
/// §5, §7): by the time the wall clock trips, retries are already spent.
pub fn extraction_timeout() -> CoreError {
    CoreError::ExtractionFailed("extraction timed out after 60s wall clock".to_string())
}

pub fn analysis_timeout() -> CoreError {
    CoreError::AnalysisFailed("analysis timed out after 120s wall clock".to_string())
}
