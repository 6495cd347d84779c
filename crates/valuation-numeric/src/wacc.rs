//! WACC Calculator (C3, spec §4.3).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuation_types::{StandardizedValuationInput, WaccComponents};

/// Pre-tax spread over the risk-free rate by interest-coverage band
/// (spec §4.3).
fn cost_of_debt_spread(interest_coverage: Option<Decimal>) -> Decimal {
    match interest_coverage {
        None => dec!(0.050),
        Some(ic) if ic <= Decimal::ZERO => dec!(0.050),
        Some(ic) if ic < dec!(1.5) => dec!(0.040),
        Some(ic) if ic < dec!(3) => dec!(0.030),
        Some(ic) if ic < dec!(5) => dec!(0.020),
        Some(ic) if ic < dec!(8) => dec!(0.015),
        Some(ic) if ic < dec!(12) => dec!(0.010),
        Some(_) => dec!(0.007),
    }
}

/// Computes cost of equity (CAPM), cost of debt (interest-coverage banded
/// spread), capital weights, and WACC.
pub fn calculate_wacc(svi: &StandardizedValuationInput, tax_rate: Decimal) -> WaccComponents {
    let cost_of_equity = svi.risk_free_rate + svi.beta * svi.equity_risk_premium;

    let spread = cost_of_debt_spread(svi.interest_coverage);
    let cost_of_debt_pretax = svi.risk_free_rate + spread;
    let cost_of_debt_aftertax = cost_of_debt_pretax * (Decimal::ONE - tax_rate);

    let equity = svi.market_cap;
    let debt = svi.total_debt;
    let total_capital = equity + debt;

    let (equity_weight, debt_weight) = if total_capital == Decimal::ZERO {
        (Decimal::ONE, Decimal::ZERO)
    } else {
        (equity / total_capital, debt / total_capital)
    };

    let value = equity_weight * cost_of_equity + debt_weight * cost_of_debt_aftertax;

    WaccComponents {
        cost_of_equity,
        cost_of_debt_pretax,
        cost_of_debt_aftertax,
        equity_weight,
        debt_weight,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_svi;

    #[test]
    fn all_equity_wacc_equals_cost_of_equity() {
        let mut svi = sample_svi();
        svi.total_debt = Decimal::ZERO;
        svi.risk_free_rate = dec!(0.04);
        svi.beta = dec!(1.0);
        svi.equity_risk_premium = dec!(0.05);

        let wacc = calculate_wacc(&svi, dec!(0.21));
        assert_eq!(wacc.cost_of_equity, dec!(0.09));
        assert_eq!(wacc.equity_weight, Decimal::ONE);
        assert_eq!(wacc.debt_weight, Decimal::ZERO);
        assert_eq!(wacc.value, wacc.cost_of_equity);
    }

    #[test]
    fn interest_coverage_bands_select_correct_spread() {
        assert_eq!(cost_of_debt_spread(None), dec!(0.050));
        assert_eq!(cost_of_debt_spread(Some(dec!(0))), dec!(0.050));
        assert_eq!(cost_of_debt_spread(Some(dec!(1.0))), dec!(0.040));
        assert_eq!(cost_of_debt_spread(Some(dec!(2.0))), dec!(0.030));
        assert_eq!(cost_of_debt_spread(Some(dec!(4.0))), dec!(0.020));
        assert_eq!(cost_of_debt_spread(Some(dec!(7.0))), dec!(0.015));
        assert_eq!(cost_of_debt_spread(Some(dec!(10.0))), dec!(0.010));
        assert_eq!(cost_of_debt_spread(Some(dec!(20.0))), dec!(0.007));
    }

    #[test]
    fn leveraged_firm_blends_equity_and_debt_cost() {
        let mut svi = sample_svi();
        svi.market_cap = dec!(600);
        svi.total_debt = dec!(400);
        svi.interest_coverage = Some(dec!(6.0));

        let wacc = calculate_wacc(&svi, dec!(0.21));
        assert_eq!(wacc.equity_weight, dec!(0.6));
        assert_eq!(wacc.debt_weight, dec!(0.4));
        assert!(wacc.value < wacc.cost_of_equity);
    }
}
