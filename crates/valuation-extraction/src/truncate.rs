//! Truncator (C1, spec §4.1): whitelist-copy a SourceDocument down to the
//! sub-records the Extractor needs, dropping everything else.

use serde_json::Value;
use valuation_types::{SourceDocument, TruncatedSource};

use crate::error::ExtractionError;

const MAX_ANNUAL_YEARS: usize = 10;
const MAX_QUARTERS: usize = 4;

fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !v.is_null())
}

fn cap_array(value: &Value, n: usize) -> Value {
    match value.as_array() {
        Some(arr) => Value::Array(arr.iter().take(n).cloned().collect()),
        None => value.clone(),
    }
}

/// Whitelist-copies the sub-records the Extractor is allowed to see. Fails
/// with `InsufficientSourceData` if company metadata, current market data,
/// or annual financials is entirely absent; missing quarterlies are
/// recorded as degradation notes but are not fatal.
pub fn truncate(doc: &SourceDocument) -> Result<(TruncatedSource, Vec<String>), ExtractionError> {
    let company_metadata = field(&doc.raw, "company_metadata")
        .ok_or_else(|| ExtractionError::InsufficientSourceData("company_metadata".into()))?
        .clone();
    let current_market_data = field(&doc.raw, "current_market_data")
        .ok_or_else(|| ExtractionError::InsufficientSourceData("current_market_data".into()))?
        .clone();
    let annual_financials_raw = field(&doc.raw, "annual_financials")
        .ok_or_else(|| ExtractionError::InsufficientSourceData("annual_financials".into()))?;
    let annual_financials = cap_array(annual_financials_raw, MAX_ANNUAL_YEARS);

    let valuation_ratios = field(&doc.raw, "valuation_ratios").cloned().unwrap_or(Value::Null);
    let calculated_metrics = field(&doc.raw, "calculated_metrics").cloned().unwrap_or(Value::Null);

    let mut degraded = Vec::new();

    let quarterly_income_statements = match field(&doc.raw, "quarterly_income_statements") {
        Some(v) => cap_array(v, MAX_QUARTERS),
        None => {
            degraded.push("quarterly_income_statements missing".to_string());
            Value::Null
        }
    };
    let quarterly_balance_sheet = match field(&doc.raw, "quarterly_balance_sheet") {
        Some(v) => cap_array(v, 1),
        None => {
            degraded.push("quarterly_balance_sheet missing".to_string());
            Value::Null
        }
    };
    let quarterly_cash_flow_statements = match field(&doc.raw, "quarterly_cash_flow_statements") {
        Some(v) => cap_array(v, MAX_QUARTERS),
        None => {
            degraded.push("quarterly_cash_flow_statements missing".to_string());
            Value::Null
        }
    };

    Ok((
        TruncatedSource {
            ticker: doc.ticker.clone(),
            company_metadata,
            current_market_data,
            valuation_ratios,
            calculated_metrics,
            annual_financials,
            quarterly_income_statements,
            quarterly_balance_sheet,
            quarterly_cash_flow_statements,
        },
        degraded,
    ))
}
