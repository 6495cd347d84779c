//! Analyst (C7, spec §4.7): a single "value-investor analyst" persona that
//! reads SVI + ValuationResult and emits a structured memo. It never
//! recomputes numbers — every figure it cites must already exist on the
//! ValuationResult.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use valuation_llm::{ChatMessage, LlmClient, LlmError};
use valuation_types::{InvestmentMemo, StandardizedValuationInput, ValuationResult};

use crate::error::AnalystError;
use crate::schema::parse_model_output;

const MAX_RETRIES: u32 = 2;

const SYSTEM_PROMPT: &str = r#"You are a value-investor analyst. You are given a company's
standardized financials and a completed quantitative valuation. Write a
structured investment memo as a single JSON object. Rules:
- You do not recompute any number. Every figure you cite (upside, margin
  of safety, Graham Number, WACC, etc.) must be copied from the supplied
  valuation result, not derived independently.
- moats[].moat_type is one of: brand, network_effect, cost_advantage,
  switching_costs, intangible_assets, efficient_scale, other.
- rating is one of: strong_buy, buy, hold, sell, strong_sell.
- risk_level is one of: low, medium, high.
- conviction is a decimal in [0, 1].
- Respond with exactly one JSON object and nothing else."#;

fn build_prompt(
    svi: &StandardizedValuationInput,
    valuation: &ValuationResult,
    narrative: Option<&str>,
    previous_error: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Standardized financials:\n{}\n\nValuation result:\n{}\n",
        serde_json::to_string(svi).unwrap_or_default(),
        serde_json::to_string(valuation).unwrap_or_default(),
    );
    if let Some(n) = narrative {
        prompt.push_str(&format!("\nBusiness narrative:\n{n}\n"));
    }
    if let Some(err) = previous_error {
        prompt.push_str(&format!(
            "\nYour previous response failed schema validation with this error:\n{err}\n\
             Return a corrected JSON object only.\n"
        ));
    }
    prompt
}

/// Runs the Analyst: up to `MAX_RETRIES` re-prompts with the parser's
/// complaint fed back to the model, then `AnalysisFailed`.
pub async fn analyze(
    llm: &dyn LlmClient,
    svi: &StandardizedValuationInput,
    valuation: &ValuationResult,
    narrative: Option<&str>,
) -> Result<InvestmentMemo, AnalystError> {
    let mut last_error: Option<String> = None;

    for attempt in 0..=MAX_RETRIES {
        let prompt = build_prompt(svi, valuation, narrative, last_error.as_deref());
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        let completion = match llm.complete(&messages).await {
            Ok(text) => text,
            Err(LlmError::TransientError(e)) => {
                warn!(ticker = %svi.ticker, attempt, "transient upstream failure during analysis: {e}");
                last_error = Some(e);
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                }
                continue;
            }
            Err(e) => return Err(AnalystError::AnalysisFailed(e.to_string())),
        };

        match parse_model_output(&completion) {
            Ok(memo) => {
                debug!(ticker = %svi.ticker, attempt, "analysis succeeded");
                return Ok(InvestmentMemo {
                    ticker: svi.ticker.clone(),
                    thesis_sentence: memo.thesis_sentence,
                    thesis_prose: memo.thesis_prose,
                    moats: memo.moats,
                    management_assessment: memo.management_assessment,
                    risk_factors: memo.risk_factors,
                    positives: memo.positives,
                    concerns: memo.concerns,
                    catalysts: memo.catalysts,
                    rating: memo.rating,
                    conviction: memo.conviction,
                    risk_level: memo.risk_level,
                    holding_period: memo.holding_period,
                    closing_quote: memo.closing_quote,
                    remarks: memo.remarks,
                    generated_at: Utc::now(),
                });
            }
            Err(parse_err) => {
                warn!(ticker = %svi.ticker, attempt, "analyst output failed validation: {parse_err}");
                last_error = Some(parse_err);
            }
        }
    }

    Err(AnalystError::AnalysisFailed(
        last_error.unwrap_or_else(|| "no valid response from analyst".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use valuation_numeric::run_valuation;

    struct ScriptedClient {
        responses: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses[i.min(self.responses.len() - 1)].to_string())
        }
    }

    const VALID: &str = r#"{
        "thesis_sentence": "Durable moat at a fair price.",
        "thesis_prose": "The firm compounds capital efficiently.",
        "moats": [],
        "management_assessment": {"integrity_score": 8, "owner_oriented": true, "notes": "Aligned."},
        "risk_factors": [],
        "positives": ["Strong FCF"],
        "concerns": [],
        "catalysts": [],
        "rating": "buy",
        "conviction": "0.7",
        "risk_level": "low",
        "holding_period": "3-5 years",
        "closing_quote": "Price is what you pay, value is what you get.",
        "remarks": ""
    }"#;

    #[tokio::test]
    async fn succeeds_on_first_valid_response() {
        let svi = sample_svi();
        let valuation = run_valuation(&svi, rust_decimal_macros::dec!(0.21)).unwrap();
        let client = ScriptedClient {
            responses: vec![VALID],
            calls: AtomicUsize::new(0),
        };
        let memo = analyze(&client, &svi, &valuation, None).await.unwrap();
        assert_eq!(memo.ticker, svi.ticker);
    }

    fn sample_svi() -> StandardizedValuationInput {
        StandardizedValuationInput {
            ticker: "TEST".to_string(),
            current_price: rust_decimal_macros::dec!(100),
            shares_outstanding: rust_decimal_macros::dec!(10),
            market_cap: rust_decimal_macros::dec!(1000),
            ttm_revenue: rust_decimal_macros::dec!(500),
            ttm_operating_income: rust_decimal_macros::dec!(150),
            ttm_net_income: rust_decimal_macros::dec!(100),
            ttm_eps: rust_decimal_macros::dec!(10),
            ttm_ebitda: rust_decimal_macros::dec!(180),
            ttm_free_cash_flow: rust_decimal_macros::dec!(90),
            cash_and_equivalents: rust_decimal_macros::dec!(100),
            total_debt: rust_decimal_macros::dec!(0),
            net_debt: rust_decimal_macros::dec!(-100),
            shareholders_equity: rust_decimal_macros::dec!(400),
            current_ratio: rust_decimal_macros::dec!(3.0),
            gross_margin: rust_decimal_macros::dec!(0.5),
            operating_margin: rust_decimal_macros::dec!(0.3),
            net_margin: rust_decimal_macros::dec!(0.2),
            roe: rust_decimal_macros::dec!(0.25),
            roic: rust_decimal_macros::dec!(0.2),
            risk_free_rate: rust_decimal_macros::dec!(0.04),
            equity_risk_premium: rust_decimal_macros::dec!(0.05),
            beta: rust_decimal_macros::dec!(1.0),
            interest_coverage: None,
            pe_ratio: Some(rust_decimal_macros::dec!(10)),
            price_to_book: Some(rust_decimal_macros::dec!(2.5)),
            dividend_yield: Some(rust_decimal_macros::dec!(0.02)),
            revenue_growth_1y_cagr: None,
            revenue_growth_3y_cagr: None,
            revenue_growth_5y_cagr: Some(rust_decimal_macros::dec!(0.08)),
            revenue_growth_10y_cagr: None,
            earnings_growth_1y_cagr: None,
            earnings_growth_3y_cagr: None,
            earnings_growth_5y_cagr: None,
            earnings_growth_10y_cagr: None,
            historical_financials: vec![],
            data_confidence_score: rust_decimal_macros::dec!(0.9),
            missing_fields: vec![],
            estimated_fields: vec![],
            data_anomalies: vec![],
            extracted_at: Utc::now(),
        }
    }
}
