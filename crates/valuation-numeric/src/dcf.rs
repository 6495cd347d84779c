//! DCF Engine (C4, spec §4.4). Three scenarios, Gordon terminal value with a
//! WACC-vs-terminal-growth safety clamp, probability-weighted composite, and
//! a WACC +/- 1% sensitivity on the base case.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use valuation_types::{
    DcfResult, DcfSensitivity, ScenarioName, ScenarioResult, ScenarioSlot, ScenarioWeights,
    StandardizedValuationInput, WaccComponents,
};

use crate::error::NumericError;

const N_YEARS: i64 = 5;
const ROIC_FLOOR: Decimal = dec!(0.10);

#[derive(Debug, Clone, Copy)]
struct ScenarioParams {
    growth_0: Decimal,
    terminal_g: Decimal,
    margin: Decimal,
}

fn scenario_params(name: ScenarioName, g_hist: Decimal, m: Decimal) -> ScenarioParams {
    match name {
        ScenarioName::Conservative => ScenarioParams {
            growth_0: (dec!(0.5) * g_hist).max(dec!(0.02)),
            terminal_g: dec!(0.020),
            margin: dec!(0.85) * m,
        },
        ScenarioName::Base => ScenarioParams {
            growth_0: g_hist,
            terminal_g: dec!(0.025),
            margin: m,
        },
        ScenarioName::Optimistic => ScenarioParams {
            growth_0: (dec!(1.5) * g_hist).min(dec!(0.25)),
            terminal_g: dec!(0.030),
            margin: (dec!(1.15) * m).min(dec!(0.35)),
        },
    }
}

fn overflow() -> NumericError {
    NumericError::NumericOverflow("non-finite or overflow in scenario computation".into())
}

fn co(opt: Option<Decimal>) -> Result<Decimal, NumericError> {
    opt.ok_or_else(overflow)
}

/// `base^exp` via repeated checked multiplication (no native `powi` on
/// `Decimal` without the `maths` feature; mirrors the teacher's manual
/// power-by-multiplication loop in `dcf.rs`).
fn pow_checked(base: Decimal, exp: u32) -> Option<Decimal> {
    let mut acc = Decimal::ONE;
    for _ in 0..exp {
        acc = acc.checked_mul(base)?;
    }
    Some(acc)
}

/// Projects one scenario and discounts it to an intrinsic value per share.
fn project_scenario(
    svi: &StandardizedValuationInput,
    wacc: Decimal,
    params: ScenarioParams,
    tax_rate: Decimal,
    roic_for_reinvestment: Decimal,
) -> Result<ScenarioResult, NumericError> {
    let mut revenue = svi.ttm_revenue;
    let mut projected_revenue = Vec::with_capacity(5);
    let mut projected_fcf = Vec::with_capacity(5);
    let mut pv_explicit = Decimal::ZERO;
    let two_n = Decimal::from(2 * N_YEARS);

    for t in 1..=N_YEARS {
        let diff = co(params.growth_0.checked_sub(params.terminal_g))?;
        let decay = co(diff.checked_mul(Decimal::from(t)))?;
        let decay = co(decay.checked_div(two_n))?;
        let g_t = co(params.growth_0.checked_sub(decay))?;

        revenue = co(revenue.checked_mul(co(Decimal::ONE.checked_add(g_t))?))?;
        if revenue <= Decimal::ZERO || !revenue.is_sign_positive() {
            return Err(overflow());
        }

        let ebit = co(revenue.checked_mul(params.margin))?;
        let nopat = co(ebit.checked_mul(co(Decimal::ONE.checked_sub(tax_rate))?))?;

        let reinvest_raw = co(g_t.checked_div(roic_for_reinvestment))?;
        let reinvest = reinvest_raw.min(dec!(0.8));
        let retained = co(Decimal::ONE.checked_sub(reinvest))?;
        let fcf = co(nopat.checked_mul(retained))?;

        let discount = co(pow_checked(co(Decimal::ONE.checked_add(wacc))?, t as u32))?;
        let pv = co(fcf.checked_div(discount))?;
        pv_explicit = co(pv_explicit.checked_add(pv))?;

        projected_revenue.push(revenue);
        projected_fcf.push(fcf);
    }

    let fcf_5 = *projected_fcf.last().ok_or_else(overflow)?;

    // Safety clamp: terminal growth must stay strictly below WACC (§4.4).
    let terminal_g = if wacc <= params.terminal_g {
        co(wacc.checked_sub(dec!(0.01)))?
    } else {
        params.terminal_g
    };

    let terminal_fcf = co(fcf_5.checked_mul(co(Decimal::ONE.checked_add(terminal_g))?))?;
    let spread = co(wacc.checked_sub(terminal_g))?;
    if spread <= Decimal::ZERO {
        return Err(overflow());
    }
    let terminal_value = co(terminal_fcf.checked_div(spread))?;

    let discount_5 = co(pow_checked(co(Decimal::ONE.checked_add(wacc))?, N_YEARS as u32))?;
    let pv_terminal = co(terminal_value.checked_div(discount_5))?;

    let enterprise_value = co(pv_explicit.checked_add(pv_terminal))?;
    let equity_value = co(enterprise_value.checked_sub(svi.net_debt))?;
    let intrinsic_value_per_share = co(equity_value.checked_div(svi.shares_outstanding))?;

    if svi.current_price == Decimal::ZERO {
        return Err(overflow());
    }
    let upside_pct = co(co(intrinsic_value_per_share.checked_sub(svi.current_price))?
        .checked_div(svi.current_price))?;

    Ok(ScenarioResult {
        // Overwritten by the caller, which knows which preset this is;
        // `project_scenario` only knows the resolved numeric parameters.
        name: ScenarioName::Base,
        growth_0: params.growth_0,
        terminal_growth_rate: terminal_g,
        margin: params.margin,
        projected_revenue,
        projected_fcf,
        wacc,
        terminal_value,
        pv_explicit,
        pv_terminal,
        enterprise_value,
        equity_value,
        intrinsic_value_per_share,
        upside_pct,
    })
}

struct DcfOutput {
    pub result: DcfResult,
    pub anomalies: Vec<String>,
}

fn run_scenario_slot(
    name: ScenarioName,
    svi: &StandardizedValuationInput,
    wacc: Decimal,
    g_hist: Decimal,
    margin: Decimal,
    tax_rate: Decimal,
    roic_for_reinvestment: Decimal,
) -> (ScenarioSlot, Option<ScenarioResult>) {
    let params = scenario_params(name, g_hist, margin);
    match project_scenario(svi, wacc, params, tax_rate, roic_for_reinvestment) {
        Ok(mut r) => {
            r.name = name;
            (ScenarioSlot::ok(r.clone()), Some(r))
        }
        Err(e) => (ScenarioSlot::failed(e.to_string()), None),
    }
}

/// Runs all three scenarios, blends them, and computes the WACC +/- 1%
/// sensitivity on the base case. Returns `InvalidInputs` at the engine
/// boundary when `shares_outstanding <= 0`; individual scenario failures are
/// carried in the returned `DcfResult` rather than aborting the call.
fn run_dcf_inner(
    svi: &StandardizedValuationInput,
    wacc_components: WaccComponents,
    tax_rate: Decimal,
) -> Result<DcfOutput, NumericError> {
    if svi.shares_outstanding <= Decimal::ZERO {
        return Err(NumericError::InvalidInputs(
            "shares_outstanding must be positive".into(),
        ));
    }

    let mut anomalies = Vec::new();
    let roic_for_reinvestment = if svi.roic <= Decimal::ZERO {
        anomalies.push("roic<=0, used 10% floor".to_string());
        ROIC_FLOOR
    } else {
        svi.roic.max(ROIC_FLOOR)
    };

    let g_hist = svi.g_hist();
    let m = svi.operating_margin;
    let wacc = wacc_components.value;

    let (conservative_slot, conservative) = run_scenario_slot(
        ScenarioName::Conservative,
        svi,
        wacc,
        g_hist,
        m,
        tax_rate,
        roic_for_reinvestment,
    );
    let (base_slot, base) = run_scenario_slot(
        ScenarioName::Base,
        svi,
        wacc,
        g_hist,
        m,
        tax_rate,
        roic_for_reinvestment,
    );
    let (optimistic_slot, optimistic) = run_scenario_slot(
        ScenarioName::Optimistic,
        svi,
        wacc,
        g_hist,
        m,
        tax_rate,
        roic_for_reinvestment,
    );

    let default_weights = ScenarioWeights::default();
    let surviving: Vec<(Decimal, &Option<ScenarioResult>)> = vec![
        (default_weights.conservative, &conservative),
        (default_weights.base, &base),
        (default_weights.optimistic, &optimistic),
    ];
    let surviving_weight_sum: Decimal = surviving
        .iter()
        .filter(|(_, r)| r.is_some())
        .map(|(w, _)| *w)
        .sum();

    if surviving_weight_sum == Decimal::ZERO {
        anomalies.push("all DCF scenarios failed".to_string());
    }

    let applied_weights = if surviving_weight_sum == Decimal::ZERO {
        default_weights
    } else {
        ScenarioWeights {
            conservative: if conservative.is_some() {
                default_weights.conservative / surviving_weight_sum
            } else {
                Decimal::ZERO
            },
            base: if base.is_some() {
                default_weights.base / surviving_weight_sum
            } else {
                Decimal::ZERO
            },
            optimistic: if optimistic.is_some() {
                default_weights.optimistic / surviving_weight_sum
            } else {
                Decimal::ZERO
            },
        }
    };

    let weighted_intrinsic_value = applied_weights.conservative
        * conservative
            .as_ref()
            .map(|r| r.intrinsic_value_per_share)
            .unwrap_or(Decimal::ZERO)
        + applied_weights.base
            * base
                .as_ref()
                .map(|r| r.intrinsic_value_per_share)
                .unwrap_or(Decimal::ZERO)
        + applied_weights.optimistic
            * optimistic
                .as_ref()
                .map(|r| r.intrinsic_value_per_share)
                .unwrap_or(Decimal::ZERO);

    let sensitivity = compute_sensitivity(svi, wacc, g_hist, m, tax_rate, roic_for_reinvestment);

    Ok(DcfOutput {
        result: DcfResult {
            wacc: wacc_components,
            conservative: conservative_slot,
            base: base_slot,
            optimistic: optimistic_slot,
            applied_weights,
            weighted_intrinsic_value,
            sensitivity,
        },
        anomalies,
    })
}

fn compute_sensitivity(
    svi: &StandardizedValuationInput,
    wacc: Decimal,
    g_hist: Decimal,
    m: Decimal,
    tax_rate: Decimal,
    roic_for_reinvestment: Decimal,
) -> DcfSensitivity {
    let params = scenario_params(ScenarioName::Base, g_hist, m);
    let wacc_minus = wacc - dec!(0.01);
    let wacc_plus = wacc + dec!(0.01);

    let wacc_minus_1pct_iv = if wacc_minus > Decimal::ZERO {
        project_scenario(svi, wacc_minus, params, tax_rate, roic_for_reinvestment)
            .ok()
            .map(|r| r.intrinsic_value_per_share)
    } else {
        None
    };
    let wacc_plus_1pct_iv =
        project_scenario(svi, wacc_plus, params, tax_rate, roic_for_reinvestment)
            .ok()
            .map(|r| r.intrinsic_value_per_share);

    DcfSensitivity {
        wacc_minus_1pct_iv,
        wacc_plus_1pct_iv,
        growth_sensitivity: Default::default(),
    }
}

/// Public entry point: runs the DCF Engine (C4) given SVI and the WACC
/// components already computed by C3.
pub fn run_dcf(
    svi: &StandardizedValuationInput,
    wacc: WaccComponents,
    tax_rate: Decimal,
) -> Result<(DcfResult, Vec<String>), NumericError> {
    run_dcf_inner(svi, wacc, tax_rate).map(|o| (o.result, o.anomalies))
}
