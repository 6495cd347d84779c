//! The extractor's raw output schema, ahead of the post-validation fixups
//! in `fixup.rs`. This is the single boundary where the model's JSON is
//! parsed into a typed value (spec §9, "Replacing dynamic-typing
//! shortcuts") — nothing past `parse_model_output` touches raw maps.

use rust_decimal::Decimal;
use serde::Deserialize;
use valuation_types::HistoricalFinancialYear;

/// Mirrors `StandardizedValuationInput`, except the fields the core's
/// fixups recompute or default are `Option` here: the model may omit or
/// misstate them, and `fixup::apply` resolves the authoritative value.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedSvi {
    pub current_price: Decimal,
    pub shares_outstanding: Decimal,
    pub market_cap: Option<Decimal>,
    pub ttm_revenue: Decimal,
    pub ttm_operating_income: Decimal,
    pub ttm_net_income: Decimal,
    pub ttm_eps: Decimal,
    pub ttm_ebitda: Decimal,
    pub ttm_free_cash_flow: Decimal,
    pub cash_and_equivalents: Decimal,
    pub total_debt: Decimal,
    pub net_debt: Option<Decimal>,
    pub enterprise_value: Option<Decimal>,
    pub shareholders_equity: Decimal,
    pub current_ratio: Decimal,
    pub gross_margin: Decimal,
    pub operating_margin: Decimal,
    pub net_margin: Decimal,
    pub roe: Decimal,
    pub roic: Decimal,
    pub risk_free_rate: Decimal,
    pub equity_risk_premium: Option<Decimal>,
    pub beta: Option<Decimal>,

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

    #[serde(default)]
    pub historical_financials: Vec<HistoricalFinancialYear>,

    pub data_confidence_score: Decimal,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub estimated_fields: Vec<String>,
    #[serde(default)]
    pub data_anomalies: Vec<String>,
}

/// Parses one model completion as JSON, tolerating a fenced code block
/// around the object (models routinely wrap JSON in ` ```json ` even when
/// told not to).
pub fn parse_model_output(raw: &str) -> Result<ExtractedSvi, String> {
    let trimmed = extract_json_object(raw);
    serde_json::from_str(trimmed).map_err(|e| e.to_string())
}

fn extract_json_object(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if end >= start {
                return &trimmed[start..=end];
            }
        }
    }
    trimmed
}
