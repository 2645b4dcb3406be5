//! N-firm Nash equilibria via the dense solver
//!
//! Cournot builds the quantity-space first-order-condition system directly;
//! Bertrand works in price space and needs the inverse of the
//! demand-coefficient matrix to know each firm's own-price demand
//! sensitivity. Both return flagged-not-calculable results instead of
//! erroring when the demand/cost combination has no closed form.

use crate::demand;
use crate::math;
use crate::models::config::{CompetitionMode, DemandSpec, GameConfiguration};
use crate::models::equilibrium::NPolyEquilibrium;
use crate::models::parameters::RealizedParameters;

/// Gamma within this distance of 1 counts as homogeneous goods.
const HOMOGENEOUS_GAMMA_TOLERANCE: f64 = 1e-4;

/// Marginal costs within this distance of the minimum share homogeneous
/// Bertrand demand.
const COST_TIE_TOLERANCE: f64 = 1e-9;

/// N-firm Cournot Nash equilibrium.
///
/// First-order conditions form the linear system with diagonal
/// `2(b_i + d_i)`, off-diagonal `γ·b_i`, and right-hand side `a_i − c_i`,
/// using per-firm demand coefficients when configured and the shared curve
/// otherwise. Only linear demand has this closed form; other demand
/// specifications come back flagged not-calculable.
pub fn cournot(config: &GameConfiguration, params: &RealizedParameters) -> NPolyEquilibrium {
    let mode = CompetitionMode::QuantitySetting;
    if !params.demand.is_linear() {
        return NPolyEquilibrium::not_calculable(
            mode,
            "N-firm Cournot equilibrium is only solvable for linear demand; \
             non-linear forms have no closed-form first-order conditions",
        );
    }

    let n = config.num_firms();
    let gamma = params.gamma;

    let mut matrix = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];
    for i in 0..n {
        let (a_i, b_i) = params.linear_coefficients_for(i);
        let cost = params.costs[i];
        for j in 0..n {
            matrix[i][j] = if i == j {
                2.0 * (b_i + cost.quadratic)
            } else {
                gamma * b_i
            };
        }
        rhs[i] = a_i - cost.linear;
    }

    let quantities = match math::solve(&matrix, &rhs) {
        Ok(solution) => solution.into_iter().map(|q| q.max(0.0)).collect::<Vec<_>>(),
        Err(err) => {
            return NPolyEquilibrium::not_calculable(
                mode,
                format!("Cournot first-order conditions could not be solved: {err}"),
            )
        }
    };

    let mut prices = Vec::with_capacity(n);
    let mut profits = Vec::with_capacity(n);
    for i in 0..n {
        let (a_i, b_i) = params.linear_coefficients_for(i);
        let firm_demand = DemandSpec::Linear {
            intercept: a_i,
            slope: b_i,
        };
        let price = demand::differentiated_price(&firm_demand, gamma, &quantities, i);
        let q = quantities[i];
        let cost = params.costs[i];
        prices.push(price);
        profits.push(price * q - cost.linear * q - cost.quadratic * q * q);
    }

    NPolyEquilibrium {
        mode,
        calculable: true,
        message: None,
        total_quantity: quantities.iter().sum(),
        quantities,
        prices,
        profits,
    }
}

/// N-firm Bertrand Nash equilibrium, three regimes:
///
/// 1. any quadratic cost → not analytically tractable (the first-order
///    system is non-linear in price and quantity jointly)
/// 2. homogeneous goods → price competition collapses to the minimum
///    marginal cost; demand splits evenly among the firms tied there
/// 3. differentiated goods, linear costs → price-space FOC system from the
///    inverted demand-coefficient matrix (closed-form symmetric solution
///    when every firm shares one demand curve)
pub fn bertrand(config: &GameConfiguration, params: &RealizedParameters) -> NPolyEquilibrium {
    let mode = CompetitionMode::PriceSetting;
    let n = config.num_firms();

    if params.costs.iter().any(|c| c.quadratic > 0.0) {
        return NPolyEquilibrium::not_calculable(
            mode,
            "N-firm Bertrand equilibrium is not analytically tractable with quadratic \
             costs; the first-order conditions are non-linear in price and quantity",
        );
    }

    let gamma = params.gamma;
    if (gamma - 1.0).abs() < HOMOGENEOUS_GAMMA_TOLERANCE {
        return homogeneous_bertrand(params, n);
    }

    if !params.demand.is_linear() {
        return NPolyEquilibrium::not_calculable(
            mode,
            "differentiated Bertrand equilibrium requires linear demand",
        );
    }

    if params.has_shared_demand() {
        symmetric_bertrand(params, n)
    } else {
        matrix_bertrand(params, n)
    }
}

/// Homogeneous goods: the lowest marginal cost wins the whole market at a
/// price equal to that cost; ties split demand evenly.
fn homogeneous_bertrand(params: &RealizedParameters, n: usize) -> NPolyEquilibrium {
    let mode = CompetitionMode::PriceSetting;
    let min_cost = params
        .costs
        .iter()
        .map(|c| c.linear)
        .fold(f64::INFINITY, f64::min);

    let winners: Vec<usize> = (0..n)
        .filter(|&i| params.costs[i].linear - min_cost <= COST_TIE_TOLERANCE)
        .collect();

    let price = min_cost.max(0.0);
    let market_quantity = demand::quantity_at_price(&params.demand, price);
    let share = market_quantity / winners.len() as f64;

    let mut quantities = vec![0.0; n];
    for &i in &winners {
        quantities[i] = share;
    }
    let prices = vec![price; n];
    let profits = (0..n)
        .map(|i| (price - params.costs[i].linear) * quantities[i])
        .collect();

    NPolyEquilibrium {
        mode,
        calculable: true,
        message: None,
        total_quantity: quantities.iter().sum(),
        quantities,
        prices,
        profits,
    }
}

/// Own- and cross-price direct-demand sensitivities for the symmetric
/// differentiated system (shared intercept `a`, shared slope `b`).
///
/// Inverting `P = a − b[(1−γ)I + γJ]·q` gives direct demand
/// `q_i = g(a − p_i) + h·Σ_{j≠i}(a − p_j)` with the coefficients below.
pub(crate) fn symmetric_sensitivities(n: usize, b: f64, gamma: f64) -> (f64, f64) {
    let denominator = b * (1.0 - gamma) * (1.0 + (n as f64 - 1.0) * gamma);
    let g = (1.0 + (n as f64 - 2.0) * gamma) / denominator;
    let h = -gamma / denominator;
    (g, h)
}

/// Shared demand curve: closed-form solution of the price-space FOC system.
fn symmetric_bertrand(params: &RealizedParameters, n: usize) -> NPolyEquilibrium {
    let mode = CompetitionMode::PriceSetting;
    let (a, b) = params.demand.coefficients();
    let gamma = params.gamma;
    let (g, h) = symmetric_sensitivities(n, b, gamma);

    // FOC: 2g·p_i + h·Σ_{j≠i} p_j = K + g·c_i, with K = a(g + (n−1)h).
    // Summing over firms isolates ΣP, then each price follows directly.
    let nf = n as f64;
    let k = a * (g + (nf - 1.0) * h);
    let cost_sum: f64 = params.costs.iter().map(|c| c.linear).sum();
    let price_sum = (nf * k + g * cost_sum) / (2.0 * g - h + h * nf);

    let prices: Vec<f64> = (0..n)
        .map(|i| ((k + g * params.costs[i].linear - h * price_sum) / (2.0 * g - h)).max(0.0))
        .collect();

    let quantities: Vec<f64> = (0..n)
        .map(|i| {
            let others: f64 = (0..n).filter(|&j| j != i).map(|j| a - prices[j]).sum();
            (g * (a - prices[i]) + h * others).max(0.0)
        })
        .collect();

    finish_bertrand(params, mode, prices, quantities)
}

/// Per-firm demand coefficients: invert the demand-coefficient matrix and
/// solve the resulting price system numerically.
fn matrix_bertrand(params: &RealizedParameters, n: usize) -> NPolyEquilibrium {
    let mode = CompetitionMode::PriceSetting;
    let gamma = params.gamma;

    let mut m = vec![vec![0.0; n]; n];
    let mut alpha = vec![0.0; n];
    for i in 0..n {
        let (a_i, b_i) = params.linear_coefficients_for(i);
        alpha[i] = a_i;
        for j in 0..n {
            m[i][j] = if i == j { b_i } else { gamma * b_i };
        }
    }

    let sensitivity = match math::invert(&m) {
        Ok(inverse) => inverse,
        Err(err) => {
            return NPolyEquilibrium::not_calculable(
                mode,
                format!("demand-coefficient matrix could not be inverted: {err}"),
            )
        }
    };

    // FOC: Σ_j G_ij(α_j − p_j) = G_ii(p_i − c_i)
    // Rearranged: (G + diag(G_ii))·p = G·α + diag(G_ii)·c
    let mut system = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];
    for i in 0..n {
        for j in 0..n {
            system[i][j] = sensitivity[i][j] + if i == j { sensitivity[i][i] } else { 0.0 };
        }
        rhs[i] = (0..n).map(|j| sensitivity[i][j] * alpha[j]).sum::<f64>()
            + sensitivity[i][i] * params.costs[i].linear;
    }

    let prices = match math::solve(&system, &rhs) {
        Ok(solution) => solution
            .into_iter()
            .map(|p| p.max(0.0))
            .collect::<Vec<_>>(),
        Err(err) => {
            return NPolyEquilibrium::not_calculable(
                mode,
                format!("Bertrand first-order conditions could not be solved: {err}"),
            )
        }
    };

    let quantities: Vec<f64> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| sensitivity[i][j] * (alpha[j] - prices[j]))
                .sum::<f64>()
                .max(0.0)
        })
        .collect();

    finish_bertrand(params, mode, prices, quantities)
}

fn finish_bertrand(
    params: &RealizedParameters,
    mode: CompetitionMode,
    prices: Vec<f64>,
    quantities: Vec<f64>,
) -> NPolyEquilibrium {
    let profits = quantities
        .iter()
        .zip(&prices)
        .zip(&params.costs)
        .map(|((&q, &p), cost)| (p - cost.linear) * q)
        .collect();

    NPolyEquilibrium {
        mode,
        calculable: true,
        message: None,
        total_quantity: quantities.iter().sum(),
        quantities,
        prices,
        profits,
    }
}
