//! Composite & Verdict (C6, spec §4.6) and the C3-C6 entry point the
//! Orchestrator calls for the valuation path.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuation_types::{margin_of_safety, StandardizedValuationInput, ValuationResult, Verdict};

use crate::dcf::run_dcf;
use crate::error::NumericError;
use crate::graham::{calculate_defensive_screen, calculate_graham_number};
use crate::wacc::calculate_wacc;

/// Runs the full C3-C6 chain: WACC -> DCF -> Graham -> Composite & Verdict.
/// `InvalidInputs` fails the call immediately at the DCF engine boundary;
/// `NumericOverflow` is normally absorbed per-scenario, but re-emerges here
/// (and only here) if all three scenarios overflowed, so the Orchestrator
/// can promote it to the terminal `CoreError::ValuationFailed`.
pub fn run_valuation(
    svi: &StandardizedValuationInput,
    tax_rate: Decimal,
) -> Result<ValuationResult, NumericError> {
    let wacc = calculate_wacc(svi, tax_rate);
    let (dcf, mut anomalies) = run_dcf(svi, wacc, tax_rate)?;
    let graham_number = calculate_graham_number(svi);
    let graham_defensive_screen = calculate_defensive_screen(svi);

    let composite_intrinsic_value =
        dec!(0.60) * dcf.weighted_intrinsic_value + dec!(0.40) * graham_number.graham_number;

    let upside_downside_pct = if svi.current_price > Decimal::ZERO {
        (composite_intrinsic_value - svi.current_price) / svi.current_price
    } else {
        dec!(-1)
    };

    if dcf.base.result.is_none() && dcf.conservative.result.is_none() && dcf.optimistic.result.is_none()
    {
        return Err(NumericError::NumericOverflow(
            "all DCF scenarios failed; cannot produce a composite valuation".into(),
        ));
    }

    anomalies.extend(svi.data_anomalies.iter().cloned());

    Ok(ValuationResult {
        ticker: svi.ticker.clone(),
        dcf,
        graham_number,
        graham_defensive_screen,
        composite_intrinsic_value,
        upside_downside_pct,
        margin_of_safety: margin_of_safety(upside_downside_pct),
        verdict: Verdict::from_upside(upside_downside_pct),
        confidence_score: svi.data_confidence_score,
        data_quality_score: svi.data_confidence_score,
        data_anomalies: anomalies,
        calculation_timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_svi;

    #[test]
    fn composite_is_exact_blend_of_dcf_and_graham() {
        let svi = sample_svi();
        let result = run_valuation(&svi, dec!(0.21)).unwrap();
        let expected = dec!(0.60) * result.dcf.weighted_intrinsic_value
            + dec!(0.40) * result.graham_number.graham_number;
        assert_eq!(result.composite_intrinsic_value, expected);
    }

    #[test]
    fn verdict_is_pure_function_of_upside() {
        assert_eq!(Verdict::from_upside(dec!(0.41)), Verdict::SignificantlyUndervalued);
        assert_eq!(Verdict::from_upside(dec!(0.40)), Verdict::Undervalued);
        assert_eq!(Verdict::from_upside(dec!(0.16)), Verdict::Undervalued);
        assert_eq!(Verdict::from_upside(dec!(0.15)), Verdict::FairlyValued);
        assert_eq!(Verdict::from_upside(dec!(0.0)), Verdict::FairlyValued);
        assert_eq!(Verdict::from_upside(dec!(-0.14)), Verdict::FairlyValued);
        assert_eq!(Verdict::from_upside(dec!(-0.15)), Verdict::Overvalued);
        assert_eq!(Verdict::from_upside(dec!(-0.39)), Verdict::Overvalued);
        assert_eq!(Verdict::from_upside(dec!(-0.40)), Verdict::SignificantlyOvervalued);
    }

    #[test]
    fn negative_eps_still_produces_finite_composite() {
        let mut svi = sample_svi();
        svi.ttm_eps = dec!(-2);
        let result = run_valuation(&svi, dec!(0.21)).unwrap();
        assert_eq!(result.graham_number.graham_number, Decimal::ZERO);
        assert_eq!(
            result.composite_intrinsic_value,
            dec!(0.60) * result.dcf.weighted_intrinsic_value
        );
    }

    #[test]
    fn criteria_passed_within_bounds() {
        let svi = sample_svi();
        let result = run_valuation(&svi, dec!(0.21)).unwrap();
        assert!(result.graham_defensive_screen.criteria_passed <= 7);
    }
}
