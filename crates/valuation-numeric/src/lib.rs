//! Pure, synchronous numeric valuation engine (C3-C6, spec §4.3-§4.6).
//!
//! Nothing here suspends: every function is a pure computation over its
//! inputs, so a scenario evaluation can run on a plain thread pool without
//! touching the async runtime (spec §5).

mod composite;
mod dcf;
mod error;
mod graham;
mod wacc;

pub use composite::run_valuation;
pub use dcf::run_dcf;
pub use error::NumericError;
pub use graham::{calculate_defensive_screen, calculate_graham_number};
pub use valuation_types::StandardizedValuationInput;
pub use wacc::calculate_wacc;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use valuation_types::{HistoricalFinancialYear, StandardizedValuationInput};

    /// Spec §8 scenario 1: all-equity, high-quality firm.
    pub fn sample_svi() -> StandardizedValuationInput {
        let historical_financials = (0..10)
            .map(|i| HistoricalFinancialYear {
                fiscal_year: 2024 - i,
                revenue: dec!(500) - dec!(10) * rust_decimal::Decimal::from(i),
                net_income: dec!(80) - rust_decimal::Decimal::from(i),
                eps: dec!(10) - rust_decimal::Decimal::from(i) / dec!(5),
                fcf: dec!(60),
                dividend_paid: Some(true),
            })
            .collect();

        StandardizedValuationInput {
            ticker: "TEST".to_string(),
            current_price: dec!(100),
            shares_outstanding: dec!(10),
            market_cap: dec!(1000),
            ttm_revenue: dec!(500),
            ttm_operating_income: dec!(150),
            ttm_net_income: dec!(100),
            ttm_eps: dec!(10),
            ttm_ebitda: dec!(180),
            ttm_free_cash_flow: dec!(90),
            cash_and_equivalents: dec!(100),
            total_debt: dec!(0),
            net_debt: dec!(-100),
            shareholders_equity: dec!(400),
            current_ratio: dec!(3.0),
            gross_margin: dec!(0.50),
            operating_margin: dec!(0.30),
            net_margin: dec!(0.20),
            roe: dec!(0.25),
            roic: dec!(0.20),
            risk_free_rate: dec!(0.04),
            equity_risk_premium: dec!(0.05),
            beta: dec!(1.0),
            interest_coverage: None,
            pe_ratio: Some(dec!(10)),
            price_to_book: Some(dec!(2.5)),
            dividend_yield: Some(dec!(0.02)),
            revenue_growth_1y_cagr: Some(dec!(0.08)),
            revenue_growth_3y_cagr: Some(dec!(0.08)),
            revenue_growth_5y_cagr: Some(dec!(0.08)),
            revenue_growth_10y_cagr: Some(dec!(0.08)),
            earnings_growth_1y_cagr: Some(dec!(0.08)),
            earnings_growth_3y_cagr: Some(dec!(0.08)),
            earnings_growth_5y_cagr: Some(dec!(0.08)),
            earnings_growth_10y_cagr: Some(dec!(0.40)),
            historical_financials,
            data_confidence_score: dec!(0.95),
            missing_fields: vec![],
            estimated_fields: vec![],
            data_anomalies: vec![],
            extracted_at: Utc::now(),
        }
    }
}
