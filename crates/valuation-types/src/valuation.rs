//! `ValuationResult` — the quantitative output of C3-C6 (spec §3.1, §4.3-§4.6).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScenarioName {
    Conservative,
    Base,
    Optimistic,
}

/// Cost-of-capital components produced by the WACC Calculator (C3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccComponents {
    pub cost_of_equity: Decimal,
    pub cost_of_debt_pretax: Decimal,
    pub cost_of_debt_aftertax: Decimal,
    pub equity_weight: Decimal,
    pub debt_weight: Decimal,
    /// `w_E * cost_of_equity + w_D * cost_of_debt_aftertax`.
    pub value: Decimal,
}

/// A single scenario's full projection, when it computed successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: ScenarioName,
    pub growth_0: Decimal,
    /// Terminal growth rate actually used, after the §4.4 safety clamp.
    pub terminal_growth_rate: Decimal,
    pub margin: Decimal,
    /// Years 1..5, most-recent-last.
    pub projected_revenue: Vec<Decimal>,
    pub projected_fcf: Vec<Decimal>,
    pub wacc: Decimal,
    pub terminal_value: Decimal,
    pub pv_explicit: Decimal,
    pub pv_terminal: Decimal,
    pub enterprise_value: Decimal,
    pub equity_value: Decimal,
    pub intrinsic_value_per_share: Decimal,
    pub upside_pct: Decimal,
}

/// A scenario slot that may be absent because its computation hit a
/// `NumericOverflow` (spec §7, §9 "Partial-failure surfacing").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSlot {
    pub result: Option<ScenarioResult>,
    pub failure: Option<String>,
}

impl ScenarioSlot {
    pub fn ok(result: ScenarioResult) -> Self {
        Self {
            result: Some(result),
            failure: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            result: None,
            failure: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

/// WACC +/- 1% sensitivity on the base scenario (spec §4.4). Growth
/// sensitivity is reserved and always empty, per §9's open-question note.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DcfSensitivity {
    pub wacc_minus_1pct_iv: Option<Decimal>,
    pub wacc_plus_1pct_iv: Option<Decimal>,
    pub growth_sensitivity: std::collections::BTreeMap<String, Decimal>,
}

/// Fixed scenario probability weights, renormalized over surviving
/// scenarios when one or more fail (spec §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioWeights {
    pub conservative: Decimal,
    pub base: Decimal,
    pub optimistic: Decimal,
}

impl Default for ScenarioWeights {
    fn default() -> Self {
        Self {
            conservative: dec!(0.25),
            base: dec!(0.50),
            optimistic: dec!(0.25),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfResult {
    pub wacc: WaccComponents,
    pub conservative: ScenarioSlot,
    pub base: ScenarioSlot,
    pub optimistic: ScenarioSlot,
    /// Weights actually applied (after renormalization over the surviving
    /// scenarios, if any failed).
    pub applied_weights: ScenarioWeights,
    pub weighted_intrinsic_value: Decimal,
    pub sensitivity: DcfSensitivity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrahamNumberResult {
    pub book_value_per_share: Decimal,
    pub graham_number: Decimal,
    pub upside_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrahamCriterion {
    pub number: u8,
    pub name: &'static str,
    pub actual: Option<Decimal>,
    pub passed: bool,
    /// Set when the pass/fail call relied on a fallback heuristic rather
    /// than full historical data (e.g. criterion #4's dividend-yield proxy).
    pub estimated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrahamDefensiveScreen {
    /// Always 7 entries, ordered #1..#7.
    pub criteria: Vec<GrahamCriterion>,
    pub criteria_passed: u8,
    pub passes_screen: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    SignificantlyUndervalued,
    Undervalued,
    FairlyValued,
    Overvalued,
    SignificantlyOvervalued,
}

impl Verdict {
    /// Pure function of `upside_downside_pct` (spec §4.6, §8).
    pub fn from_upside(upside: Decimal) -> Self {
        if upside > dec!(0.40) {
            Verdict::SignificantlyUndervalued
        } else if upside > dec!(0.15) {
            Verdict::Undervalued
        } else if upside > dec!(-0.15) {
            Verdict::FairlyValued
        } else if upside > dec!(-0.40) {
            Verdict::Overvalued
        } else {
            Verdict::SignificantlyOvervalued
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub ticker: String,
    pub dcf: DcfResult,
    pub graham_number: GrahamNumberResult,
    pub graham_defensive_screen: GrahamDefensiveScreen,
    pub composite_intrinsic_value: Decimal,
    pub upside_downside_pct: Decimal,
    pub margin_of_safety: Decimal,
    pub verdict: Verdict,
    pub confidence_score: Decimal,
    pub data_quality_score: Decimal,
    /// Result-level anomalies, e.g. `"roic<=0, used 10% floor"`.
    pub data_anomalies: Vec<String>,
    pub calculation_timestamp: DateTime<Utc>,
}

/// Margin of safety, `upside / (1 + upside)` for `upside > -1`, else `-1`
/// (spec §4.6, GLOSSARY).
pub fn margin_of_safety(upside: Decimal) -> Decimal {
    if upside > dec!(-1) {
        upside / (Decimal::ONE + upside)
    } else {
        dec!(-1)
    }
}
