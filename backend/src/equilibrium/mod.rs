//! Equilibrium solver
//!
//! Computes the analytical benchmarks firms are compared against:
//!
//! - two-firm closed-form Nash (linear demand)
//! - cooperative multiplant-monopoly equilibrium
//! - N-firm Cournot Nash (linear demand, via the dense solver)
//! - N-firm Bertrand Nash (three regimes)
//! - duopoly limit-pricing classification
//!
//! All operations are pure functions of (configuration, realized
//! parameters). Non-calculability — no closed form for the given
//! demand/cost combination — is returned as flagged data, never raised;
//! only the legacy two-firm closed form propagates a hard error, because it
//! has no sensible degraded answer.

pub mod duopoly;
pub mod npoly;

pub use duopoly::{cooperative, limit_pricing, nash_two_firm, EquilibriumError};
pub use npoly::{bertrand, cournot};

use crate::models::config::GameConfiguration;
use crate::models::equilibrium::EquilibriumBenchmarks;
use crate::models::parameters::RealizedParameters;

/// Compute every benchmark once, for configuration time.
///
/// The two-firm closed forms apply only to linear-demand duopolies and are
/// `None` otherwise; the N-firm results and the limit-pricing analysis carry
/// their own applicability flags.
pub fn compute_benchmarks(
    config: &GameConfiguration,
    overrides: Option<&RealizedParameters>,
) -> Result<EquilibriumBenchmarks, EquilibriumError> {
    let params = overrides
        .cloned()
        .unwrap_or_else(|| RealizedParameters::from_config(config));

    let duopoly_closed_form = config.num_firms() == 2 && params.demand.is_linear();
    let nash = if duopoly_closed_form {
        Some(nash_two_firm(&params)?)
    } else {
        None
    };
    let cooperative = if duopoly_closed_form {
        Some(cooperative(&params)?)
    } else {
        None
    };

    Ok(EquilibriumBenchmarks {
        nash,
        cooperative,
        cournot: cournot(config, &params),
        bertrand: bertrand(config, &params),
        limit_pricing: limit_pricing(config, &params),
    })
}
