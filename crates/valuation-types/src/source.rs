//! `SourceDocument` and the Truncator's output.
//!
//! The source document is read-only, heterogeneous, and partially
//! unreliable (§3.1): field names vary across providers and sections can
//! disagree. Rather than modeling every provider's shape, the core treats
//! each whitelisted sub-record as an opaque JSON value and leaves
//! normalization to the Extractor (C2).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque nested record for one ticker (spec §3.1). Read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub ticker: String,
    /// Full nested document as retrieved from the data layer.
    pub raw: Value,
}

/// The bounded, whitelisted subset produced by the Truncator (C1).
///
/// Every field here is copied verbatim from `SourceDocument`; nothing is
/// renamed or reshaped. Field names outside this whitelist are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruncatedSource {
    pub ticker: String,
    pub company_metadata: Value,
    pub current_market_data: Value,
    pub valuation_ratios: Value,
    pub calculated_metrics: Value,
    /// All available years, capped at the 10 most recent.
    pub annual_financials: Value,
    /// The 4 most recent quarterly income statements.
    pub quarterly_income_statements: Value,
    /// Latest quarterly balance sheet snapshot only (not summed).
    pub quarterly_balance_sheet: Value,
    /// The 4 most recent quarterly cash-flow statements.
    pub quarterly_cash_flow_statements: Value,
}
