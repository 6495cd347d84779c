//! Extractor (C2, spec §4.2): prompts a constrained LLM to emit SVI JSON,
//! retrying with parser feedback on schema mismatch.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use valuation_llm::{ChatMessage, LlmClient, LlmError};
use valuation_types::{StandardizedValuationInput, TruncatedSource};

use crate::error::ExtractionError;
use crate::fixup;
use crate::schema::{parse_model_output, ExtractedSvi};

const MAX_RETRIES: u32 = 2;

const SYSTEM_PROMPT: &str = r#"You are a financial data extraction engine. You convert a messy,
inconsistently-named financial document into a single JSON object matching
a fixed schema. Rules:
- All monetary values are USD; all ratios are decimal (15% is 0.15); all
  growth rates are annualized CAGR.
- Treat these names as equivalent: Revenue / Net Sales / Total Revenue / Sales;
  Net Income / Net Earnings / Profit; Operating Income / EBIT / Operating Profit;
  Free Cash Flow / FCF / Levered Free Cash Flow; Shareholders Equity /
  Stockholders Equity / Total Equity.
- TTM figures are the sum of the last 4 quarterly income/cash-flow items;
  balance-sheet figures use the latest quarterly snapshot, never summed.
- CAGR over N years is (end/start)^(1/N) - 1; if start <= 0, emit null and
  record the field in missing_fields (or estimated_fields only if a
  fallback value was used instead).
- On conflicting values, prefer annual financials, then the quarterly
  block, then pre-calculated metrics, then aggregated ratios, then the
  real-time market snapshot.
- Never fabricate a number. If a field cannot be derived, emit null and
  list it in missing_fields.
- Respond with exactly one JSON object and nothing else: no prose, no
  markdown fence."#;

fn build_prompt(ticker: &str, truncated: &TruncatedSource, previous_error: Option<&str>) -> String {
    let mut prompt = format!(
        "Ticker: {ticker}\n\nSource data:\n{}\n",
        serde_json::to_string(truncated).unwrap_or_default()
    );
    if let Some(err) = previous_error {
        prompt.push_str(&format!(
            "\nYour previous response failed schema validation with this error:\n{err}\n\
             Return a corrected JSON object only.\n"
        ));
    }
    prompt
}

/// Runs the Extractor: up to `MAX_RETRIES` re-prompts with the parser's
/// complaint fed back to the model, then `ExtractionFailed`.
pub async fn extract(
    llm: &dyn LlmClient,
    ticker: &str,
    truncated: &TruncatedSource,
    default_equity_risk_premium: Decimal,
) -> Result<StandardizedValuationInput, ExtractionError> {
    let mut last_error: Option<String> = None;

    for attempt in 0..=MAX_RETRIES {
        let prompt = build_prompt(ticker, truncated, last_error.as_deref());
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        let completion = match llm.complete(&messages).await {
            Ok(text) => text,
            Err(LlmError::TransientError(e)) => {
                warn!(ticker, attempt, "transient upstream failure during extraction: {e}");
                last_error = Some(e);
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                }
                continue;
            }
            Err(e) => return Err(ExtractionError::ExtractionFailed(e.to_string())),
        };

        match parse_model_output(&completion).and_then(validate) {
            Ok(raw) => {
                debug!(ticker, attempt, "extraction succeeded");
                return Ok(fixup::apply(raw, ticker, Utc::now(), default_equity_risk_premium));
            }
            Err(parse_err) => {
                warn!(ticker, attempt, "extractor output failed validation: {parse_err}");
                last_error = Some(parse_err);
            }
        }
    }

    Err(ExtractionError::ExtractionFailed(
        last_error.unwrap_or_else(|| "no valid response from extractor".to_string()),
    ))
}

/// Cross-field sanity checks beyond what serde's shape-matching catches.
fn validate(raw: ExtractedSvi) -> Result<ExtractedSvi, String> {
    if raw.shares_outstanding <= rust_decimal::Decimal::ZERO {
        return Err("shares_outstanding must be positive".to_string());
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use valuation_types::TruncatedSource;

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

    fn sample_truncated() -> TruncatedSource {
        TruncatedSource {
            ticker: "TEST".to_string(),
            company_metadata: json!({"name": "Test Co"}),
            current_market_data: json!({"price": 100}),
            valuation_ratios: json!({}),
            calculated_metrics: json!({}),
            annual_financials: json!([]),
            quarterly_income_statements: json!([]),
            quarterly_balance_sheet: json!([]),
            quarterly_cash_flow_statements: json!([]),
        }
    }

    const VALID: &str = r#"{
        "current_price": "100", "shares_outstanding": "10", "market_cap": "1000",
        "ttm_revenue": "500", "ttm_operating_income": "150", "ttm_net_income": "100",
        "ttm_eps": "10", "ttm_ebitda": "180", "ttm_free_cash_flow": "90",
        "cash_and_equivalents": "100", "total_debt": "0", "net_debt": "-100",
        "shareholders_equity": "400", "current_ratio": "3.0", "gross_margin": "0.5",
        "operating_margin": "0.3", "net_margin": "0.2", "roe": "0.25", "roic": "0.2",
        "risk_free_rate": "0.04", "beta": "1.0", "data_confidence_score": "0.9"
    }"#;

    #[tokio::test]
    async fn succeeds_on_first_valid_response() {
        let client = ScriptedClient {
            responses: vec![VALID],
            calls: AtomicUsize::new(0),
        };
        let svi = extract(&client, "TEST", &sample_truncated(), rust_decimal_macros::dec!(0.05))
            .await
            .unwrap();
        assert_eq!(svi.ticker, "TEST");
        assert_eq!(svi.current_price, rust_decimal_macros::dec!(100));
    }

    #[tokio::test]
    async fn retries_once_then_succeeds() {
        let client = ScriptedClient {
            responses: vec!["not json", VALID],
            calls: AtomicUsize::new(0),
        };
        let svi = extract(&client, "TEST", &sample_truncated(), rust_decimal_macros::dec!(0.05))
            .await
            .unwrap();
        assert_eq!(svi.ticker, "TEST");
    }

    #[tokio::test]
    async fn exhausts_retries_and_fails() {
        let client = ScriptedClient {
            responses: vec!["not json"],
            calls: AtomicUsize::new(0),
        };
        let err = extract(&client, "TEST", &sample_truncated(), rust_decimal_macros::dec!(0.05))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
    }
}
