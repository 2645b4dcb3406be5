//! Round result accounting
//!
//! Given one round's decisions and the parameters the round was played
//! under, computes every firm's realized quantity, price, cost, and profit.
//!
//! Under price-setting the computation is two-pass by necessity: every
//! firm's realized quantity depends on every other firm's price, so all
//! prices are collected first and the quantities are resolved jointly in a
//! second pass (closed form for a shared demand curve, one dense solve for
//! per-firm demand coefficients).

use crate::demand;
use crate::equilibrium::npoly::symmetric_sensitivities;
use crate::math::{self, LinearSolveError};
use crate::models::config::{CompetitionMode, DemandSpec, GameConfiguration};
use crate::models::decision::FirmDecision;
use crate::models::parameters::RealizedParameters;
use crate::models::round::{FirmRoundResult, RoundResult};
use thiserror::Error;

/// Gamma within this distance of 1 counts as homogeneous goods for
/// price-setting quantity recovery.
const HOMOGENEOUS_GAMMA_TOLERANCE: f64 = 1e-6;

/// Prices within this distance of the minimum share homogeneous demand.
const PRICE_TIE_TOLERANCE: f64 = 1e-6;

/// Accounting failures (fatal to the round)
#[derive(Debug, Error, PartialEq)]
pub enum AccountingError {
    #[error("expected {expected} decisions, got {got}")]
    DecisionCount { expected: usize, got: usize },

    #[error("realized parameters cover {got} firms, configuration has {expected}")]
    ParameterCount { expected: usize, got: usize },

    #[error("quantity recovery from prices failed: {0}")]
    QuantityRecovery(#[from] LinearSolveError),
}

/// Compute one round's complete result.
///
/// Decisions are clamped to the configured bounds (and to zero) before any
/// economics runs. The returned result carries no realized-parameter
/// snapshot or transcript; the orchestrator attaches those.
pub fn compute_round(
    config: &GameConfiguration,
    params: &RealizedParameters,
    decisions: &[FirmDecision],
    round: usize,
) -> Result<RoundResult, AccountingError> {
    let n = config.num_firms();
    if decisions.len() != n {
        return Err(AccountingError::DecisionCount {
            expected: n,
            got: decisions.len(),
        });
    }
    if params.costs.len() != n {
        return Err(AccountingError::ParameterCount {
            expected: n,
            got: params.costs.len(),
        });
    }

    let values: Vec<f64> = decisions
        .iter()
        .map(|d| clamp_decision(config, d.value))
        .collect();

    let (quantities, prices) = match config.mode {
        CompetitionMode::QuantitySetting => quantities_to_prices(params, &values),
        CompetitionMode::PriceSetting => (prices_to_quantities(params, &values)?, values),
    };

    let firms: Vec<FirmRoundResult> = (0..n)
        .map(|i| {
            let q = quantities[i];
            let p = prices[i];
            let cost_params = params.costs[i];
            let cost = cost_params.linear * q + cost_params.quadratic * q * q;
            FirmRoundResult {
                firm: i,
                quantity: q,
                price: p,
                cost,
                profit: p * q - cost,
                rationale: decisions[i].rationale.clone(),
                prompt_audit: decisions[i].prompt_audit.clone(),
            }
        })
        .collect();

    Ok(RoundResult {
        round,
        total_quantity: quantities.iter().sum(),
        market_prices: prices,
        firms,
        realized_parameters: None,
        transcript: None,
        timestamp_ms: crate::core::time::unix_millis(),
    })
}

fn clamp_decision(config: &GameConfiguration, value: f64) -> f64 {
    let mut v = value.max(0.0);
    if let Some(bounds) = &config.bounds {
        let (min, max) = match config.mode {
            CompetitionMode::QuantitySetting => (bounds.min_quantity, bounds.max_quantity),
            CompetitionMode::PriceSetting => (bounds.min_price, bounds.max_price),
        };
        if let Some(min) = min {
            v = v.max(min);
        }
        if let Some(max) = max {
            v = v.min(max);
        }
    }
    v
}

/// Quantity-setting: each firm's price is the differentiated demand price at
/// the submitted quantities.
fn quantities_to_prices(params: &RealizedParameters, quantities: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let prices = (0..quantities.len())
        .map(|i| {
            let firm_demand = firm_demand_spec(params, i);
            demand::differentiated_price(&firm_demand, params.gamma, quantities, i)
        })
        .collect();
    (quantities.to_vec(), prices)
}

/// The demand form firm `i` faces: its own linear coefficients when
/// configured, the shared curve otherwise.
fn firm_demand_spec(params: &RealizedParameters, firm: usize) -> DemandSpec {
    if params.firm_demand.is_some() && params.demand.is_linear() {
        let (intercept, slope) = params.linear_coefficients_for(firm);
        DemandSpec::Linear { intercept, slope }
    } else {
        params.demand.clone()
    }
}

/// Price-setting: recover every firm's quantity from the full price vector.
fn prices_to_quantities(
    params: &RealizedParameters,
    prices: &[f64],
) -> Result<Vec<f64>, AccountingError> {
    let n = prices.len();

    if (params.gamma - 1.0).abs() < HOMOGENEOUS_GAMMA_TOLERANCE {
        return Ok(homogeneous_split(params, prices));
    }

    // Differentiated goods: linear demand guaranteed by config validation
    if params.has_shared_demand() {
        let (a, b) = params.demand.coefficients();
        let (g, h) = symmetric_sensitivities(n, b, params.gamma);
        Ok((0..n)
            .map(|i| {
                let others: f64 = (0..n).filter(|&j| j != i).map(|j| a - prices[j]).sum();
                (g * (a - prices[i]) + h * others).max(0.0)
            })
            .collect())
    } else {
        // Per-firm demand slopes couple every firm's quantity to every
        // other firm's price: solve M·q = α − p once for all firms
        let mut m = vec![vec![0.0; n]; n];
        let mut rhs = vec![0.0; n];
        for i in 0..n {
            let (a_i, b_i) = params.linear_coefficients_for(i);
            for j in 0..n {
                m[i][j] = if i == j { b_i } else { params.gamma * b_i };
            }
            rhs[i] = a_i - prices[i];
        }
        let solution = math::solve(&m, &rhs)?;
        Ok(solution.into_iter().map(|q| q.max(0.0)).collect())
    }
}

/// Homogeneous goods: the lowest submitted price takes the whole market,
/// split evenly among firms within tolerance of it.
fn homogeneous_split(params: &RealizedParameters, prices: &[f64]) -> Vec<f64> {
    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let winners: Vec<usize> = (0..prices.len())
        .filter(|&i| prices[i] - min_price <= PRICE_TIE_TOLERANCE)
        .collect();

    let market_quantity = demand::quantity_at_price(&params.demand, min_price);
    let share = market_quantity / winners.len() as f64;

    let mut quantities = vec![0.0; prices.len()];
    for &i in &winners {
        quantities[i] = share;
    }
    quantities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{DecisionBounds, FirmConfig};

    fn quantity_config() -> (GameConfiguration, RealizedParameters) {
        let config = GameConfiguration::duopoly_quantity_default();
        let params = RealizedParameters::from_config(&config);
        (config, params)
    }

    fn decisions(values: &[f64]) -> Vec<FirmDecision> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| FirmDecision::new(i, v))
            .collect()
    }

    #[test]
    fn test_quantity_round_reference_values() {
        let (config, params) = quantity_config();
        let result = compute_round(&config, &params, &decisions(&[30.0, 30.0]), 0).unwrap();

        assert_eq!(result.total_quantity, 60.0);
        for firm in &result.firms {
            assert!((firm.price - 40.0).abs() < 1e-9);
            assert!((firm.profit - 900.0).abs() < 1e-9);
            assert!((firm.cost - 300.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_negative_submission_clamped_to_zero() {
        let (config, params) = quantity_config();
        let result = compute_round(&config, &params, &decisions(&[-5.0, 30.0]), 0).unwrap();
        assert_eq!(result.firms[0].quantity, 0.0);
        assert!(result.firms[0].profit == 0.0);
    }

    #[test]
    fn test_bounds_clamp_quantities() {
        let (mut config, params) = quantity_config();
        config.bounds = Some(DecisionBounds {
            min_quantity: Some(5.0),
            max_quantity: Some(25.0),
            ..Default::default()
        });
        let result = compute_round(&config, &params, &decisions(&[0.0, 50.0]), 0).unwrap();
        assert_eq!(result.firms[0].quantity, 5.0);
        assert_eq!(result.firms[1].quantity, 25.0);
    }

    #[test]
    fn test_homogeneous_price_round_lowest_wins() {
        let (mut config, params) = quantity_config();
        config.mode = CompetitionMode::PriceSetting;
        let result = compute_round(&config, &params, &decisions(&[20.0, 30.0]), 0).unwrap();

        // Firm 0 undercuts: takes all demand at p = 20
        assert!((result.firms[0].quantity - 80.0).abs() < 1e-9);
        assert_eq!(result.firms[1].quantity, 0.0);
        assert!((result.firms[0].profit - (20.0 - 10.0) * 80.0).abs() < 1e-9);
        assert_eq!(result.firms[1].profit, 0.0);
    }

    #[test]
    fn test_homogeneous_price_tie_splits() {
        let (mut config, params) = quantity_config();
        config.mode = CompetitionMode::PriceSetting;
        let result = compute_round(&config, &params, &decisions(&[25.0, 25.0]), 0).unwrap();
        assert!((result.firms[0].quantity - 37.5).abs() < 1e-9);
        assert!((result.firms[1].quantity - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_differentiated_price_round_shared_slope() {
        let (mut config, mut params) = quantity_config();
        config.mode = CompetitionMode::PriceSetting;
        config.gamma = 0.5;
        params.gamma = 0.5;

        let result = compute_round(&config, &params, &decisions(&[40.0, 50.0]), 0).unwrap();

        // Singh-Vives direct demand with a=100, b=1, gamma=0.5, n=2:
        // g = 1/(1−0.25) = 4/3, h = −0.5/0.75 = −2/3
        let g: f64 = 4.0 / 3.0;
        let h: f64 = -2.0 / 3.0;
        let q0 = g * 60.0 + h * 50.0;
        let q1 = g * 50.0 + h * 60.0;
        assert!((result.firms[0].quantity - q0).abs() < 1e-9);
        assert!((result.firms[1].quantity - q1).abs() < 1e-9);
        // The cheaper firm sells more
        assert!(result.firms[0].quantity > result.firms[1].quantity);
    }

    #[test]
    fn test_differentiated_price_round_per_firm_slopes_joint_solve() {
        let (mut config, mut params) = quantity_config();
        config.mode = CompetitionMode::PriceSetting;
        config.gamma = 0.4;
        params.gamma = 0.4;
        params.firm_demand = Some(vec![
            crate::models::config::FirmDemand {
                intercept: 100.0,
                slope: 1.0,
            },
            crate::models::config::FirmDemand {
                intercept: 120.0,
                slope: 2.0,
            },
        ]);

        let prices = [40.0, 50.0];
        let result = compute_round(&config, &params, &decisions(&prices), 0).unwrap();

        // The joint solve must satisfy each inverse demand exactly:
        // p_i = a_i − b_i(q_i + γ q_j)
        let q0 = result.firms[0].quantity;
        let q1 = result.firms[1].quantity;
        assert!((100.0 - 1.0 * (q0 + 0.4 * q1) - 40.0).abs() < 1e-9);
        assert!((120.0 - 2.0 * (q1 + 0.4 * q0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_decision_count_mismatch_rejected() {
        let (config, params) = quantity_config();
        assert!(matches!(
            compute_round(&config, &params, &decisions(&[30.0]), 0),
            Err(AccountingError::DecisionCount {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_rationale_carried_into_result() {
        let (config, params) = quantity_config();
        let mut ds = decisions(&[30.0, 30.0]);
        ds[0] = ds[0].clone().with_rationale("match expected Nash output");
        let result = compute_round(&config, &params, &ds, 0).unwrap();
        assert_eq!(
            result.firms[0].rationale.as_deref(),
            Some("match expected Nash output")
        );
        assert_eq!(result.firms[1].rationale, None);
    }

    #[test]
    fn test_triopoly_quantity_round() {
        let (mut config, _) = quantity_config();
        config.firms.push(FirmConfig::new("FIRM_C", 20.0, 0.1));
        let params = RealizedParameters::from_config(&config);
        let result = compute_round(&config, &params, &decisions(&[20.0, 20.0, 10.0]), 2).unwrap();

        assert_eq!(result.round, 2);
        assert_eq!(result.firms.len(), 3);
        // Homogeneous: all firms share the market price 100 − 50 = 50
        for firm in &result.firms {
            assert!((firm.price - 50.0).abs() < 1e-9);
        }
        // Firm C: cost = 20·10 + 0.1·100 = 210, profit = 500 − 210
        assert!((result.firms[2].cost - 210.0).abs() < 1e-9);
        assert!((result.firms[2].profit - 290.0).abs() < 1e-9);
    }
}
