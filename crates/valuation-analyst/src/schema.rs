//! The Analyst's raw output schema. Identical to `InvestmentMemo` except
//! `ticker` and `generated_at` are supplied by the core, not the model.

use rust_decimal::Decimal;
use serde::Deserialize;
use valuation_types::{ManagementAssessment, Moat, Rating, RiskFactor, RiskLevel};

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedMemo {
    pub thesis_sentence: String,
    pub thesis_prose: String,
    #[serde(default)]
    pub moats: Vec<Moat>,
    pub management_assessment: ManagementAssessment,
    #[serde(default)]
    pub risk_factors: Vec<RiskFactor>,
    #[serde(default)]
    pub positives: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub catalysts: Vec<String>,
    pub rating: Rating,
    pub conviction: Decimal,
    pub risk_level: RiskLevel,
    pub holding_period: String,
    pub closing_quote: String,
    #[serde(default)]
    pub remarks: String,
}

pub fn parse_model_output(raw: &str) -> Result<ExtractedMemo, String> {
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
