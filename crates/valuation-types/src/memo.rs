//! `InvestmentMemo` — the qualitative record produced by the Analyst (C7).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MoatType {
    Brand,
    NetworkEffect,
    CostAdvantage,
    SwitchingCosts,
    IntangibleAssets,
    EfficientScale,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moat {
    pub moat_type: MoatType,
    pub evidence: String,
    /// Confidence in [0, 1] that this moat is real and durable.
    pub confidence: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementAssessment {
    /// 1-10.
    pub integrity_score: u8,
    pub owner_oriented: bool,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: String,
    pub severity: RiskSeverity,
    /// Probability in [0, 1].
    pub probability: Decimal,
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rating {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentMemo {
    pub ticker: String,
    pub thesis_sentence: String,
    pub thesis_prose: String,
    pub moats: Vec<Moat>,
    pub management_assessment: ManagementAssessment,
    pub risk_factors: Vec<RiskFactor>,
    pub positives: Vec<String>,
    pub concerns: Vec<String>,
    pub catalysts: Vec<String>,
    pub rating: Rating,
    /// Conviction in [0, 1].
    pub conviction: Decimal,
    pub risk_level: RiskLevel,
    pub holding_period: String,
    pub closing_quote: String,
    pub remarks: String,
    pub generated_at: DateTime<Utc>,
}
