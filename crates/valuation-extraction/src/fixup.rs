//! Post-validation fixups the core applies after the model's output has
//! parsed cleanly (spec §4.2): these are never delegated back to the
//! model, since they are exact arithmetic, not extraction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuation_types::StandardizedValuationInput;

use crate::schema::ExtractedSvi;

const TOLERANCE: Decimal = dec!(0.01);

fn diverges(recomputed: Decimal, reported: Decimal) -> bool {
    if recomputed == Decimal::ZERO {
        reported != Decimal::ZERO
    } else {
        ((reported - recomputed) / recomputed).abs() > TOLERANCE
    }
}

/// Recomputes `net_debt`, `market_cap`, and `enterprise_value`; clamps
/// `beta`; defaults `equity_risk_premium`. Returns the finished SVI plus
/// any anomalies raised along the way, folded into `data_anomalies`.
pub fn apply(
    raw: ExtractedSvi,
    ticker: &str,
    extracted_at: DateTime<Utc>,
    default_equity_risk_premium: Decimal,
) -> StandardizedValuationInput {
    let mut anomalies = raw.data_anomalies;
    let mut estimated_fields = raw.estimated_fields;

    let net_debt = raw.total_debt - raw.cash_and_equivalents;
    if let Some(reported) = raw.net_debt {
        if diverges(net_debt, reported) {
            anomalies.push(format!(
                "net_debt reported {reported} diverges from recomputed {net_debt} by more than 1%"
            ));
        }
    }

    let market_cap = raw.current_price * raw.shares_outstanding;
    if let Some(reported) = raw.market_cap {
        if diverges(market_cap, reported) {
            anomalies.push(format!(
                "market_cap reported {reported} diverges from recomputed {market_cap} by more than 1%"
            ));
        }
    }

    let enterprise_value = market_cap + raw.total_debt - raw.cash_and_equivalents;
    if let Some(reported) = raw.enterprise_value {
        if diverges(enterprise_value, reported) {
            anomalies.push(format!(
                "enterprise_value reported {reported} diverges from recomputed {enterprise_value} by more than 1%"
            ));
        }
    }

    let beta = match raw.beta {
        Some(b) if b >= dec!(0.1) && b <= dec!(3.0) => b,
        _ => {
            estimated_fields.push("beta".to_string());
            dec!(1.0)
        }
    };

    let equity_risk_premium = raw.equity_risk_premium.unwrap_or(default_equity_risk_premium);

    StandardizedValuationInput {
        ticker: ticker.to_string(),
        current_price: raw.current_price,
        shares_outstanding: raw.shares_outstanding,
        market_cap,
        ttm_revenue: raw.ttm_revenue,
        ttm_operating_income: raw.ttm_operating_income,
        ttm_net_income: raw.ttm_net_income,
        ttm_eps: raw.ttm_eps,
        ttm_ebitda: raw.ttm_ebitda,
        ttm_free_cash_flow: raw.ttm_free_cash_flow,
        cash_and_equivalents: raw.cash_and_equivalents,
        total_debt: raw.total_debt,
        net_debt,
        shareholders_equity: raw.shareholders_equity,
        current_ratio: raw.current_ratio,
        gross_margin: raw.gross_margin,
        operating_margin: raw.operating_margin,
        net_margin: raw.net_margin,
        roe: raw.roe,
        roic: raw.roic,
        risk_free_rate: raw.risk_free_rate,
        equity_risk_premium,
        beta,
        interest_coverage: raw.interest_coverage,
        pe_ratio: raw.pe_ratio,
        price_to_book: raw.price_to_book,
        dividend_yield: raw.dividend_yield,
        revenue_growth_1y_cagr: raw.revenue_growth_1y_cagr,
        revenue_growth_3y_cagr: raw.revenue_growth_3y_cagr,
        revenue_growth_5y_cagr: raw.revenue_growth_5y_cagr,
        revenue_growth_10y_cagr: raw.revenue_growth_10y_cagr,
        earnings_growth_1y_cagr: raw.earnings_growth_1y_cagr,
        earnings_growth_3y_cagr: raw.earnings_growth_3y_cagr,
        earnings_growth_5y_cagr: raw.earnings_growth_5y_cagr,
        earnings_growth_10y_cagr: raw.earnings_growth_10y_cagr,
        historical_financials: raw.historical_financials,
        data_confidence_score: raw.data_confidence_score,
        missing_fields: raw.missing_fields,
        estimated_fields,
        data_anomalies: anomalies,
        extracted_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_raw() -> ExtractedSvi {
        ExtractedSvi {
            current_price: dec!(100),
            shares_outstanding: dec!(10),
            market_cap: Some(dec!(1000)),
            ttm_revenue: dec!(500),
            ttm_operating_income: dec!(150),
            ttm_net_income: dec!(100),
            ttm_eps: dec!(10),
            ttm_ebitda: dec!(180),
            ttm_free_cash_flow: dec!(90),
            cash_and_equivalents: dec!(100),
            total_debt: dec!(0),
            net_debt: Some(dec!(-100)),
            enterprise_value: Some(dec!(900)),
            shareholders_equity: dec!(400),
            current_ratio: dec!(3.0),
            gross_margin: dec!(0.5),
            operating_margin: dec!(0.3),
            net_margin: dec!(0.2),
            roe: dec!(0.25),
            roic: dec!(0.2),
            risk_free_rate: dec!(0.04),
            equity_risk_premium: None,
            beta: Some(dec!(5.0)),
            interest_coverage: None,
            pe_ratio: Some(dec!(10)),
            price_to_book: Some(dec!(2.5)),
            dividend_yield: Some(dec!(0.02)),
            revenue_growth_1y_cagr: None,
            revenue_growth_3y_cagr: None,
            revenue_growth_5y_cagr: Some(dec!(0.08)),
            revenue_growth_10y_cagr: None,
            earnings_growth_1y_cagr: None,
            earnings_growth_3y_cagr: None,
            earnings_growth_5y_cagr: None,
            earnings_growth_10y_cagr: None,
            historical_financials: vec![],
            data_confidence_score: dec!(0.9),
            missing_fields: vec![],
            estimated_fields: vec![],
            data_anomalies: vec![],
        }
    }

    #[test]
    fn beta_out_of_range_is_clamped_and_flagged_estimated() {
        let svi = apply(minimal_raw(), "TEST", Utc::now(), dec!(0.05));
        assert_eq!(svi.beta, dec!(1.0));
        assert!(svi.estimated_fields.contains(&"beta".to_string()));
    }

    #[test]
    fn missing_equity_risk_premium_defaults_to_the_configured_value() {
        let svi = apply(minimal_raw(), "TEST", Utc::now(), dec!(0.055));
        assert_eq!(svi.equity_risk_premium, dec!(0.055));
    }

    #[test]
    fn consistent_net_debt_raises_no_anomaly() {
        let svi = apply(minimal_raw(), "TEST", Utc::now(), dec!(0.05));
        assert!(svi.data_anomalies.is_empty());
    }

    #[test]
    fn divergent_market_cap_is_flagged() {
        let mut raw = minimal_raw();
        raw.market_cap = Some(dec!(2000));
        let svi = apply(raw, "TEST", Utc::now(), dec!(0.05));
        assert!(svi.data_anomalies.iter().any(|a| a.contains("market_cap")));
        assert_eq!(svi.market_cap, dec!(1000));
    }
}
