//! Parameter specifications and their realized values
//!
//! A [`ParameterSpec`] declares how one scalar is drawn; a
//! [`RealizedParameters`] snapshot holds the concrete values actually used
//! for a round or replication. Realized snapshots are immutable once drawn —
//! a round never sees a half-updated parameter set.

use crate::models::config::{DemandSpec, FirmDemand};
use serde::{Deserialize, Serialize};

/// How to draw one scalar parameter (closed sum type)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterSpec {
    /// Always the literal value
    Fixed(f64),
    /// Uniform on [min, max]
    Uniform { min: f64, max: f64 },
    /// Normal with the given mean and standard deviation
    Normal { mean: f64, std_dev: f64 },
    /// Log-normal, parameterized by the DESIRED mean and standard deviation
    /// of the draws (moment-matched to the underlying normal)
    LogNormal { mean: f64, std_dev: f64 },
}

impl ParameterSpec {
    /// True when the spec always returns the configured literal.
    pub fn is_fixed(&self) -> bool {
        matches!(self, ParameterSpec::Fixed(_))
    }
}

/// Optional probability specifications for the structural parameters.
///
/// Any field left `None` keeps the configuration's literal value. The demand
/// fields override the first/second coefficient of whichever demand form is
/// configured (intercept/slope for linear, scale/elasticity for constant
/// elasticity, and so on).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSpecs {
    pub demand_intercept: Option<ParameterSpec>,
    pub demand_slope: Option<ParameterSpec>,
    pub gamma: Option<ParameterSpec>,
    /// Per-firm linear cost specs; length must equal the firm count
    pub linear_costs: Option<Vec<ParameterSpec>>,
    /// Per-firm quadratic cost specs; length must equal the firm count
    pub quadratic_costs: Option<Vec<ParameterSpec>>,
}

impl ParameterSpecs {
    /// True if any contained spec is non-fixed.
    pub fn any_random(&self) -> bool {
        let scalar_random = |spec: &Option<ParameterSpec>| {
            spec.as_ref().map_or(false, |s| !s.is_fixed())
        };
        let vec_random = |specs: &Option<Vec<ParameterSpec>>| {
            specs
                .as_ref()
                .map_or(false, |v| v.iter().any(|s| !s.is_fixed()))
        };
        scalar_random(&self.demand_intercept)
            || scalar_random(&self.demand_slope)
            || scalar_random(&self.gamma)
            || vec_random(&self.linear_costs)
            || vec_random(&self.quadratic_costs)
    }
}

/// One firm's realized cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealizedCost {
    pub linear: f64,
    pub quadratic: f64,
}

/// The concrete structural parameters used for a round or replication
///
/// Produced by the parameter realizer in one atomic call; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedParameters {
    /// Demand form with concrete coefficients
    pub demand: DemandSpec,

    /// Differentiation coefficient, clamped to [0, 1]
    pub gamma: f64,

    /// Per-firm realized costs, one entry per configured firm
    pub costs: Vec<RealizedCost>,

    /// Per-firm linear demand coefficients when the configuration carries them
    pub firm_demand: Option<Vec<FirmDemand>>,
}

impl RealizedParameters {
    /// Parameters taken verbatim from a configuration's literals — the
    /// effective parameter set when nothing is randomized.
    pub fn from_config(config: &crate::models::config::GameConfiguration) -> Self {
        Self {
            demand: config.demand.clone(),
            gamma: config.gamma,
            costs: config
                .firms
                .iter()
                .map(|f| RealizedCost {
                    linear: f.linear_cost,
                    quadratic: f.quadratic_cost,
                })
                .collect(),
            firm_demand: config.firm_demand.clone(),
        }
    }

    /// The linear demand coefficients (intercept, slope) for firm `i`,
    /// falling back to the shared curve.
    ///
    /// Only meaningful for linear demand; callers gate on
    /// `demand.is_linear()`.
    pub fn linear_coefficients_for(&self, firm: usize) -> (f64, f64) {
        if let Some(per_firm) = &self.firm_demand {
            if let Some(fd) = per_firm.get(firm) {
                return (fd.intercept, fd.slope);
            }
        }
        self.demand.coefficients()
    }

    /// True when every firm shares one demand curve.
    pub fn has_shared_demand(&self) -> bool {
        self.firm_demand.is_none()
    }
}
