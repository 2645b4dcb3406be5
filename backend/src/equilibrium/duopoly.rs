//! Two-firm closed forms: Nash, cooperative monopoly, limit pricing
//!
//! These are the legacy duopoly benchmarks. They assume a single linear
//! demand curve `P = a − b·Q` over total quantity and per-firm costs
//! `C_i(q) = c_i·q + d_i·q²`.

use crate::demand;
use crate::models::equilibrium::{
    CooperativeEquilibrium, LimitPricingAnalysis, MarketRegion, NashEquilibrium,
};
use crate::models::config::GameConfiguration;
use crate::models::parameters::RealizedParameters;
use thiserror::Error;

/// Determinants and pivots below this are treated as degenerate.
const DEGENERACY_EPSILON: f64 = 1e-10;

/// Hard failures of the closed-form solvers
#[derive(Debug, Error, PartialEq)]
pub enum EquilibriumError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

fn linear_coefficients(params: &RealizedParameters) -> Result<(f64, f64), EquilibriumError> {
    match params.demand {
        crate::models::config::DemandSpec::Linear { intercept, slope } => Ok((intercept, slope)),
        _ => Err(EquilibriumError::InvalidParameters(
            "two-firm closed forms require linear demand".to_string(),
        )),
    }
}

fn two_firm_costs(params: &RealizedParameters) -> Result<[(f64, f64); 2], EquilibriumError> {
    if params.costs.len() < 2 {
        return Err(EquilibriumError::InvalidParameters(format!(
            "two-firm closed forms need two cost entries, got {}",
            params.costs.len()
        )));
    }
    Ok([
        (params.costs[0].linear, params.costs[0].quadratic),
        (params.costs[1].linear, params.costs[1].quadratic),
    ])
}

/// Two-firm Cournot Nash equilibrium, closed form.
///
/// With `α_i = a − c_i` and `β_i = 2(b + d_i)`, quantities solve
///
/// ```text
/// β₁·q₁ + b·q₂ = α₁
/// b·q₁ + β₂·q₂ = α₂
/// ```
///
/// A determinant `β₁β₂ − b² ≤ 0` means no interior equilibrium exists and
/// the operation fails with `InvalidParameters`. Quantities are clamped to
/// zero after solving.
pub fn nash_two_firm(params: &RealizedParameters) -> Result<NashEquilibrium, EquilibriumError> {
    let (a, b) = linear_coefficients(params)?;
    let [(c1, d1), (c2, d2)] = two_firm_costs(params)?;

    let alpha1 = a - c1;
    let alpha2 = a - c2;
    let beta1 = 2.0 * (b + d1);
    let beta2 = 2.0 * (b + d2);

    let det = beta1 * beta2 - b * b;
    if det <= DEGENERACY_EPSILON {
        return Err(EquilibriumError::InvalidParameters(format!(
            "no interior equilibrium: determinant {det} is not positive"
        )));
    }

    let q1 = ((alpha1 * beta2 - b * alpha2) / det).max(0.0);
    let q2 = ((alpha2 * beta1 - b * alpha1) / det).max(0.0);

    let price = demand::price(&params.demand, q1 + q2);
    let profit1 = price * q1 - c1 * q1 - d1 * q1 * q1;
    let profit2 = price * q2 - c2 * q2 - d2 * q2 * q2;

    Ok(NashEquilibrium {
        quantity1: q1,
        quantity2: q2,
        price,
        profit1,
        profit2,
    })
}

/// Cooperative (multiplant monopoly) equilibrium: both firms act as one
/// entity maximizing joint profit against the single demand curve.
///
/// The unconstrained first-order system is undefined when a plant's marginal
/// cost does not increase in quantity, so production splits by policy:
///
/// - both plants quadratic: marginal-cost equalization with weights
///   `w_i = 1/(2·d_i)`
/// - one plant quadratic: the quadratic plant produces up to the point its
///   marginal cost reaches the linear plant's, provided it is cheaper to
///   start up
/// - both plants linear: the strictly cheaper plant produces everything;
///   ties split evenly
pub fn cooperative(
    params: &RealizedParameters,
) -> Result<CooperativeEquilibrium, EquilibriumError> {
    let (a, b) = linear_coefficients(params)?;
    let [(c1, d1), (c2, d2)] = two_firm_costs(params)?;

    let (q1, q2) = if d1 > 0.0 && d2 > 0.0 {
        split_both_quadratic(a, b, (c1, d1), (c2, d2))
    } else if d1 > 0.0 || d2 > 0.0 {
        // Exactly one plant has increasing marginal cost
        let (qq, ql) = if d1 > 0.0 {
            split_one_quadratic(a, b, (c1, d1), c2)
        } else {
            split_one_quadratic(a, b, (c2, d2), c1)
        };
        if d1 > 0.0 {
            (qq, ql)
        } else {
            (ql, qq)
        }
    } else {
        split_both_linear(a, b, c1, c2)
    };

    let q1 = q1.max(0.0);
    let q2 = q2.max(0.0);
    let total_quantity = q1 + q2;
    let price = demand::price(&params.demand, total_quantity);
    let profit1 = price * q1 - c1 * q1 - d1 * q1 * q1;
    let profit2 = price * q2 - c2 * q2 - d2 * q2 * q2;

    Ok(CooperativeEquilibrium {
        quantity1: q1,
        quantity2: q2,
        total_quantity,
        price,
        profit1,
        profit2,
        total_profit: profit1 + profit2,
    })
}

/// Both plants quadratic: equalize marginal costs using `w_i = 1/(2·d_i)`.
fn split_both_quadratic(a: f64, b: f64, plant1: (f64, f64), plant2: (f64, f64)) -> (f64, f64) {
    let (c1, d1) = plant1;
    let (c2, d2) = plant2;
    let w1 = 1.0 / (2.0 * d1);
    let w2 = 1.0 / (2.0 * d2);

    let total = (w1 * (a - c1) + w2 * (a - c2)) / (1.0 + 2.0 * b * (w1 + w2));
    let total = total.max(0.0);
    let marginal_revenue = a - 2.0 * b * total;
    let q1 = (w1 * (marginal_revenue - c1)).max(0.0);
    let q2 = (w2 * (marginal_revenue - c2)).max(0.0);
    (q1, q2)
}

/// One quadratic plant `(c_q, d_q)` against a linear plant with marginal
/// cost `c_l`. Returns `(q_quadratic, q_linear)`.
///
/// Marginal revenue at the linear plant's standalone optimum equals `c_l`,
/// so the quadratic plant joins production only if its startup marginal cost
/// is below that.
fn split_one_quadratic(a: f64, b: f64, quad: (f64, f64), c_l: f64) -> (f64, f64) {
    let (c_q, d_q) = quad;

    if c_q < c_l {
        // Quadratic plant produces until its marginal cost reaches c_l
        let total = ((a - c_l) / (2.0 * b)).max(0.0);
        let q_quad = ((c_l - c_q) / (2.0 * d_q)).min(total);
        if q_quad >= total {
            // The quadratic plant covers all demand on its own terms
            let q = ((a - c_q) / (2.0 * (b + d_q))).max(0.0);
            (q, 0.0)
        } else {
            (q_quad, total - q_quad)
        }
    } else {
        // Linear plant is marginally cheaper near the optimum
        (0.0, ((a - c_l) / (2.0 * b)).max(0.0))
    }
}

/// Both plants linear: lower marginal cost takes the market; ties split.
fn split_both_linear(a: f64, b: f64, c1: f64, c2: f64) -> (f64, f64) {
    if (c1 - c2).abs() < DEGENERACY_EPSILON {
        let total = ((a - c1) / (2.0 * b)).max(0.0);
        (total / 2.0, total / 2.0)
    } else if c1 < c2 {
        (((a - c1) / (2.0 * b)).max(0.0), 0.0)
    } else {
        (0.0, ((a - c2) / (2.0 * b)).max(0.0))
    }
}

/// Duopoly limit-pricing classification.
///
/// The asymmetry index `(α₁ − α₂)/α₂` (effective intercepts `α_i = a − c_i`)
/// falls into one of three regions separated by the gamma-dependent
/// thresholds `1 − γ/(2 − γ²)` and `1 − γ/2`. For firm counts other than
/// two the analysis is inapplicable rather than a failure.
pub fn limit_pricing(
    config: &GameConfiguration,
    params: &RealizedParameters,
) -> LimitPricingAnalysis {
    if config.num_firms() != 2 || params.costs.len() < 2 {
        return LimitPricingAnalysis::inapplicable(format!(
            "limit-pricing analysis applies to duopolies only; game has {} firms",
            config.num_firms()
        ));
    }
    let (a, _b) = match params.demand {
        crate::models::config::DemandSpec::Linear { intercept, slope } => (intercept, slope),
        _ => {
            return LimitPricingAnalysis::inapplicable(
                "limit-pricing analysis requires linear demand",
            )
        }
    };
    let c1 = params.costs[0].linear;
    let c2 = params.costs[1].linear;

    let alpha1 = a - c1;
    let alpha2 = a - c2;
    if alpha2.abs() < DEGENERACY_EPSILON {
        return LimitPricingAnalysis::inapplicable(
            "weak firm's effective demand intercept is zero; asymmetry index undefined",
        );
    }

    let gamma = params.gamma;
    let asymmetry_index = (alpha1 - alpha2) / alpha2;
    let threshold_low = 1.0 - gamma / (2.0 - gamma * gamma);
    let threshold_high = 1.0 - gamma / 2.0;

    let region = if asymmetry_index < threshold_low {
        MarketRegion::InteriorDuopoly
    } else if asymmetry_index < threshold_high {
        MarketRegion::LimitPricing
    } else {
        MarketRegion::Monopoly
    };

    LimitPricingAnalysis {
        applicable: true,
        message: None,
        asymmetry_index,
        threshold_low,
        threshold_high,
        region: Some(region),
    }
}
