//! Parameter realization
//!
//! Turns declared probability specifications into the concrete structural
//! parameters a round is played under. All draws go through the engine's
//! seeded [`RngManager`] (same seed + same config → same parameter paths).
//!
//! `draw_all` is atomic by construction: it returns a complete
//! [`RealizedParameters`] for every configured firm in one call, because a
//! partially-realized parameter set would make a round internally
//! inconsistent.

use crate::models::config::GameConfiguration;
use crate::models::parameters::{ParameterSpec, RealizedCost, RealizedParameters};
use crate::rng::RngManager;

/// Draw one scalar from a specification.
///
/// - `Fixed` returns its literal value
/// - `Uniform` draws via the inverse CDF on [min, max]
/// - `Normal` draws via the Box-Muller transform
/// - `LogNormal` moment-matches the requested mean/std-dev to the
///   underlying normal's (μ, σ) and exponentiates a normal draw
pub fn draw(spec: &ParameterSpec, rng: &mut RngManager) -> f64 {
    match *spec {
        ParameterSpec::Fixed(value) => value,
        ParameterSpec::Uniform { min, max } => min + rng.next_f64() * (max - min),
        ParameterSpec::Normal { mean, std_dev } => mean + std_dev * standard_normal(rng),
        ParameterSpec::LogNormal { mean, std_dev } => {
            // σ² = ln(1 + var/mean²), μ = ln(mean) − σ²/2
            let variance = std_dev * std_dev;
            let sigma_sq = (1.0 + variance / (mean * mean)).ln();
            let mu = mean.ln() - sigma_sq / 2.0;
            (mu + sigma_sq.sqrt() * standard_normal(rng)).exp()
        }
    }
}

/// Standard normal draw via Box-Muller.
fn standard_normal(rng: &mut RngManager) -> f64 {
    // Clamp the first uniform away from 0 so ln() stays finite
    let u1 = rng.next_f64().max(f64::MIN_POSITIVE);
    let u2 = rng.next_f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Cheap predicate: does this configuration need draws at all?
///
/// Used to skip realization entirely for deterministic configurations.
pub fn has_random_parameters(config: &GameConfiguration) -> bool {
    config
        .parameter_specs
        .as_ref()
        .map_or(false, |specs| specs.any_random())
}

/// Realize the full parameter set in one atomic call.
///
/// Demand coefficients follow the configured functional form (the
/// first/second coefficient specs override positionally); gamma is clamped
/// to [0, 1]; each firm's costs are drawn from its spec or default to the
/// configuration's literal value, clamped non-negative so realized cost
/// curves stay well-formed.
pub fn draw_all(config: &GameConfiguration, rng: &mut RngManager) -> RealizedParameters {
    let specs = config.parameter_specs.as_ref();

    let (first_literal, second_literal) = config.demand.coefficients();
    let first = specs
        .and_then(|s| s.demand_intercept.as_ref())
        .map_or(first_literal, |spec| draw(spec, rng));
    let second = specs
        .and_then(|s| s.demand_slope.as_ref())
        .map_or(second_literal, |spec| draw(spec, rng));
    let demand = config.demand.with_coefficients(first, second);

    let gamma = specs
        .and_then(|s| s.gamma.as_ref())
        .map_or(config.gamma, |spec| draw(spec, rng))
        .clamp(0.0, 1.0);

    let costs = config
        .firms
        .iter()
        .enumerate()
        .map(|(i, firm)| {
            let linear = specs
                .and_then(|s| s.linear_costs.as_ref())
                .and_then(|v| v.get(i))
                .map_or(firm.linear_cost, |spec| draw(spec, rng))
                .max(0.0);
            let quadratic = specs
                .and_then(|s| s.quadratic_costs.as_ref())
                .and_then(|v| v.get(i))
                .map_or(firm.quadratic_cost, |spec| draw(spec, rng))
                .max(0.0);
            RealizedCost { linear, quadratic }
        })
        .collect();

    RealizedParameters {
        demand,
        gamma,
        costs,
        firm_demand: config.firm_demand.clone(),
    }
}
