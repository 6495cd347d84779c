//! `StandardizedValuationInput` (SVI) — the authoritative, validated numeric
//! record the Extractor produces and every downstream component consumes
//! (spec §3.1, §4.2).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One year of historical financials, most-recent-first in
/// `SVI::historical_financials`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalFinancialYear {
    pub fiscal_year: i32,
    pub revenue: Decimal,
    pub net_income: Decimal,
    pub eps: Decimal,
    pub fcf: Decimal,
    /// Whether a dividend was paid in this fiscal year, when known. Used by
    /// Graham criterion #4 (dividend record); left `None` when the source
    /// does not carry per-year dividend history.
    pub dividend_paid: Option<bool>,
}

/// Standardized, fully-validated numeric record for one ticker (spec §3.1).
/// All monetary values are USD; all ratios are decimal (15% == 0.15); all
/// growth rates are annualized. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizedValuationInput {
    pub ticker: String,

    // Required scalars.
    pub current_price: Decimal,
    pub shares_outstanding: Decimal,
    pub market_cap: Decimal,
    pub ttm_revenue: Decimal,
    pub ttm_operating_income: Decimal,
    pub ttm_net_income: Decimal,
    pub ttm_eps: Decimal,
    pub ttm_ebitda: Decimal,
    pub ttm_free_cash_flow: Decimal,
    pub cash_and_equivalents: Decimal,
    pub total_debt: Decimal,
    /// `total_debt - cash_and_equivalents`, recomputed by the core (§3.2).
    pub net_debt: Decimal,
    pub shareholders_equity: Decimal,
    pub current_ratio: Decimal,
    pub gross_margin: Decimal,
    pub operating_margin: Decimal,
    pub net_margin: Decimal,
    pub roe: Decimal,
    pub roic: Decimal,
    pub risk_free_rate: Decimal,
    /// Defaults to 0.05 when absent from the model's output (§4.2).
    pub equity_risk_premium: Decimal,
    /// Defaults to 1.0 when absent, and clamped into `[0.1, 3.0]` by the
    /// post-validation fixup in §4.2; always present and in-range here.
    pub beta: Decimal,

    // Optional fields: absence is meaningful to downstream components.
    pub interest_coverage: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub price_to_book: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
    pub revenue_growth_1y_cagr: Option<Decimal>,
    pub revenue_growth_3y_cagr: Option<Decimal>,
    pub revenue_growth_5y_cagr: Option<Decimal>,
    pub revenue_growth_10y_cagr: Option<Decimal>,
    pub earnings_growth_1y_cagr: Option<Decimal>,
    pub earnings_growth_3y_cagr: Option<Decimal>,
    pub earnings_growth_5y_cagr: Option<Decimal>,
    pub earnings_growth_10y_cagr: Option<Decimal>,

    /// Most-recent-first, capped at 10 entries.
    pub historical_financials: Vec<HistoricalFinancialYear>,

    // Quality fields (§3.1).
    pub data_confidence_score: Decimal,
    pub missing_fields: Vec<String>,
    pub estimated_fields: Vec<String>,
    pub data_anomalies: Vec<String>,

    pub extracted_at: DateTime<Utc>,
}

impl StandardizedValuationInput {
    /// `revenue_growth_5y_cagr` if present, else the 5% fallback the DCF
    /// Engine uses for `g_hist` (spec §4.4).
    pub fn g_hist(&self) -> Decimal {
        self.revenue_growth_5y_cagr
            .unwrap_or(rust_decimal_macros::dec!(0.05))
    }

    /// Count of historical years with positive net income, used by Graham
    /// criterion #3 (earnings stability).
    pub fn years_positive_earnings(&self) -> usize {
        self.historical_financials
            .iter()
            .filter(|y| y.net_income > Decimal::ZERO)
            .count()
    }
}
