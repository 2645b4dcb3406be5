//! Game configuration
//!
//! The configuration is the sole external mutation surface into the engine.
//! It is validated once, before any state transition, and is immutable for
//! the lifetime of a game.
//!
//! # Critical Invariants
//!
//! 1. Demand coefficients are strictly positive
//! 2. Firm count is between 2 and 10
//! 3. Round and replication counts are at least 1
//! 4. The differentiation coefficient gamma lies in [0, 1]

use crate::models::parameters::{ParameterSpec, ParameterSpecs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance under which goods count as homogeneous (gamma ≈ 1) for
/// configuration checks.
const HOMOGENEITY_TOLERANCE: f64 = 1e-6;

/// Errors produced by configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("firm count must be between 2 and 10, got {0}")]
    FirmCount(usize),

    #[error("duplicate firm id: {0}")]
    DuplicateFirmId(String),

    #[error("demand parameter {name} must be strictly positive, got {value}")]
    NonPositiveDemandParameter { name: &'static str, value: f64 },

    #[error("gamma must lie in [0, 1], got {0}")]
    GammaOutOfRange(f64),

    #[error("firm {firm}: cost parameter {name} must be non-negative, got {value}")]
    NegativeCost {
        firm: usize,
        name: &'static str,
        value: f64,
    },

    #[error("round count must be at least 1")]
    NoRounds,

    #[error("replication count must be at least 1")]
    NoReplications,

    #[error("communication is enabled but messages_per_round is 0")]
    NoCommunicationMessages,

    #[error("bounds are inverted: {name} min {min} exceeds max {max}")]
    InvertedBounds {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("per-firm demand requires linear demand")]
    FirmDemandRequiresLinear,

    #[error("per-firm demand has {given} entries for {firms} firms")]
    FirmDemandLength { given: usize, firms: usize },

    #[error("price-setting with differentiated goods requires linear demand")]
    DifferentiatedPriceRequiresLinear,

    #[error("parameter spec for {name} is malformed: {reason}")]
    MalformedSpec { name: String, reason: String },

    #[error("per-firm cost specs for {name} have {given} entries for {firms} firms")]
    CostSpecLength {
        name: &'static str,
        given: usize,
        firms: usize,
    },
}

/// Which control variable firms choose each round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionMode {
    /// Cournot: firms choose quantities; prices follow from demand
    QuantitySetting,
    /// Bertrand: firms choose prices; quantities follow from demand
    PriceSetting,
}

/// Demand function specification (closed sum type)
///
/// Only the linear form yields closed-form Nash equilibria; the other forms
/// are supported for realized-round accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DemandSpec {
    /// P = max(0, intercept − slope·Q)
    Linear { intercept: f64, slope: f64 },
    /// P = scale·Q^(−1/elasticity)
    ConstantElasticity { scale: f64, elasticity: f64 },
    /// P = max(0, intercept − price_coefficient·ln Q)
    Logit {
        intercept: f64,
        price_coefficient: f64,
    },
    /// P = scale·e^(−decay_rate·Q)
    Exponential { scale: f64, decay_rate: f64 },
}

impl DemandSpec {
    /// The two scalar coefficients of the form, in declaration order.
    ///
    /// Used by parameter realization, which overrides them positionally.
    pub fn coefficients(&self) -> (f64, f64) {
        match *self {
            DemandSpec::Linear { intercept, slope } => (intercept, slope),
            DemandSpec::ConstantElasticity { scale, elasticity } => (scale, elasticity),
            DemandSpec::Logit {
                intercept,
                price_coefficient,
            } => (intercept, price_coefficient),
            DemandSpec::Exponential { scale, decay_rate } => (scale, decay_rate),
        }
    }

    /// Rebuild the same form with replaced coefficients.
    pub fn with_coefficients(&self, first: f64, second: f64) -> DemandSpec {
        match self {
            DemandSpec::Linear { .. } => DemandSpec::Linear {
                intercept: first,
                slope: second,
            },
            DemandSpec::ConstantElasticity { .. } => DemandSpec::ConstantElasticity {
                scale: first,
                elasticity: second,
            },
            DemandSpec::Logit { .. } => DemandSpec::Logit {
                intercept: first,
                price_coefficient: second,
            },
            DemandSpec::Exponential { .. } => DemandSpec::Exponential {
                scale: first,
                decay_rate: second,
            },
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, DemandSpec::Linear { .. })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let check = |name: &'static str, value: f64| {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositiveDemandParameter { name, value })
            }
        };
        match *self {
            DemandSpec::Linear { intercept, slope } => {
                check("intercept", intercept)?;
                check("slope", slope)
            }
            DemandSpec::ConstantElasticity { scale, elasticity } => {
                check("scale", scale)?;
                check("elasticity", elasticity)
            }
            DemandSpec::Logit {
                intercept,
                price_coefficient,
            } => {
                check("intercept", intercept)?;
                check("price_coefficient", price_coefficient)
            }
            DemandSpec::Exponential { scale, decay_rate } => {
                check("scale", scale)?;
                check("decay_rate", decay_rate)
            }
        }
    }
}

/// Per-firm cost structure and disclosure flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    /// Display identifier (e.g., "FIRM_A"); must be unique
    pub id: String,

    /// Linear (constant marginal) cost component c_i
    pub linear_cost: f64,

    /// Quadratic cost component d_i; total cost is c_i·q + d_i·q²
    pub quadratic_cost: f64,

    /// Whether this firm's results are disclosed to competitors between
    /// rounds. Opaque to the engine; forwarded to decision providers.
    pub disclose_information: bool,
}

impl FirmConfig {
    pub fn new(id: impl Into<String>, linear_cost: f64, quadratic_cost: f64) -> Self {
        Self {
            id: id.into(),
            linear_cost,
            quadratic_cost,
            disclose_information: true,
        }
    }
}

/// Per-firm linear demand coefficients (optional override of the shared curve)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirmDemand {
    pub intercept: f64,
    pub slope: f64,
}

/// Pre-decision communication settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommunicationConfig {
    pub enabled: bool,
    /// Full round-robin passes across all firms per round
    pub messages_per_round: usize,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            messages_per_round: 1,
        }
    }
}

/// Optional clamps applied to submitted decisions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionBounds {
    pub min_quantity: Option<f64>,
    pub max_quantity: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// How often randomized parameters are re-drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationScope {
    /// Drawn once at configuration, shared by the whole game
    Game,
    /// Re-drawn at the start of each replication
    Replication,
    /// Re-drawn fresh for every round
    Round,
}

/// Complete game configuration
///
/// # Example
/// ```
/// use oligopoly_core_rs::models::config::*;
///
/// let config = GameConfiguration::duopoly_quantity_default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfiguration {
    /// Quantity-setting (Cournot) or price-setting (Bertrand)
    pub mode: CompetitionMode,

    /// Participating firms (2–10)
    pub firms: Vec<FirmConfig>,

    /// Differentiation coefficient: 1 = homogeneous goods, 0 = independent
    /// demands
    pub gamma: f64,

    /// Shared demand function
    pub demand: DemandSpec,

    /// Optional per-firm linear demand coefficients (linear demand only)
    pub firm_demand: Option<Vec<FirmDemand>>,

    /// Rounds per replication
    pub rounds: usize,

    /// Number of replications
    pub replications: usize,

    /// Pre-decision communication phase settings
    pub communication: CommunicationConfig,

    /// Optional decision clamps
    pub bounds: Option<DecisionBounds>,

    /// Optional probability specifications for randomized parameters
    pub parameter_specs: Option<ParameterSpecs>,

    /// How often randomized parameters are re-drawn
    pub variation: VariationScope,

    /// Seed for the engine's deterministic RNG
    pub rng_seed: u64,
}

impl GameConfiguration {
    /// A symmetric linear duopoly used throughout tests and the demo CLI:
    /// a = 100, b = 1, both firms c = 10, d = 0.
    pub fn duopoly_quantity_default() -> Self {
        Self {
            mode: CompetitionMode::QuantitySetting,
            firms: vec![
                FirmConfig::new("FIRM_A", 10.0, 0.0),
                FirmConfig::new("FIRM_B", 10.0, 0.0),
            ],
            gamma: 1.0,
            demand: DemandSpec::Linear {
                intercept: 100.0,
                slope: 1.0,
            },
            firm_demand: None,
            rounds: 1,
            replications: 1,
            communication: CommunicationConfig::default(),
            bounds: None,
            parameter_specs: None,
            variation: VariationScope::Game,
            rng_seed: 12345,
        }
    }

    pub fn num_firms(&self) -> usize {
        self.firms.len()
    }

    /// Validate every invariant. Called by the orchestrator before any state
    /// transition; no partial mutation happens on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.firms.len();
        if !(2..=10).contains(&n) {
            return Err(ConfigError::FirmCount(n));
        }

        let mut seen = std::collections::HashSet::new();
        for firm in &self.firms {
            if !seen.insert(firm.id.as_str()) {
                return Err(ConfigError::DuplicateFirmId(firm.id.clone()));
            }
        }

        self.demand.validate()?;

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::GammaOutOfRange(self.gamma));
        }

        for (i, firm) in self.firms.iter().enumerate() {
            if firm.linear_cost < 0.0 {
                return Err(ConfigError::NegativeCost {
                    firm: i,
                    name: "linear_cost",
                    value: firm.linear_cost,
                });
            }
            if firm.quadratic_cost < 0.0 {
                return Err(ConfigError::NegativeCost {
                    firm: i,
                    name: "quadratic_cost",
                    value: firm.quadratic_cost,
                });
            }
        }

        if self.rounds < 1 {
            return Err(ConfigError::NoRounds);
        }
        if self.replications < 1 {
            return Err(ConfigError::NoReplications);
        }
        if self.communication.enabled && self.communication.messages_per_round == 0 {
            return Err(ConfigError::NoCommunicationMessages);
        }

        if let Some(bounds) = &self.bounds {
            if let (Some(min), Some(max)) = (bounds.min_quantity, bounds.max_quantity) {
                if min > max {
                    return Err(ConfigError::InvertedBounds {
                        name: "quantity",
                        min,
                        max,
                    });
                }
            }
            if let (Some(min), Some(max)) = (bounds.min_price, bounds.max_price) {
                if min > max {
                    return Err(ConfigError::InvertedBounds {
                        name: "price",
                        min,
                        max,
                    });
                }
            }
        }

        if let Some(firm_demand) = &self.firm_demand {
            if !self.demand.is_linear() {
                return Err(ConfigError::FirmDemandRequiresLinear);
            }
            if firm_demand.len() != n {
                return Err(ConfigError::FirmDemandLength {
                    given: firm_demand.len(),
                    firms: n,
                });
            }
            for fd in firm_demand {
                if fd.intercept <= 0.0 {
                    return Err(ConfigError::NonPositiveDemandParameter {
                        name: "firm intercept",
                        value: fd.intercept,
                    });
                }
                if fd.slope <= 0.0 {
                    return Err(ConfigError::NonPositiveDemandParameter {
                        name: "firm slope",
                        value: fd.slope,
                    });
                }
            }
        }

        // Differentiated quantity recovery from prices is linear-only, so a
        // price-setting game must either be homogeneous or use linear demand.
        if self.mode == CompetitionMode::PriceSetting && !self.demand.is_linear() {
            let gamma_is_fixed_homogeneous = (self.gamma - 1.0).abs() < HOMOGENEITY_TOLERANCE
                && self
                    .parameter_specs
                    .as_ref()
                    .map_or(true, |specs| specs.gamma.is_none());
            if !gamma_is_fixed_homogeneous {
                return Err(ConfigError::DifferentiatedPriceRequiresLinear);
            }
        }

        if let Some(specs) = &self.parameter_specs {
            specs.validate(n)?;
        }

        Ok(())
    }
}

impl ParameterSpecs {
    fn validate(&self, num_firms: usize) -> Result<(), ConfigError> {
        let check = |name: String, spec: &ParameterSpec| match *spec {
            ParameterSpec::Fixed(_) => Ok(()),
            ParameterSpec::Uniform { min, max } => {
                if min > max {
                    Err(ConfigError::MalformedSpec {
                        name,
                        reason: format!("uniform min {min} exceeds max {max}"),
                    })
                } else {
                    Ok(())
                }
            }
            ParameterSpec::Normal { std_dev, .. } => {
                if std_dev < 0.0 {
                    Err(ConfigError::MalformedSpec {
                        name,
                        reason: format!("negative std_dev {std_dev}"),
                    })
                } else {
                    Ok(())
                }
            }
            ParameterSpec::LogNormal { mean, std_dev } => {
                if mean <= 0.0 {
                    Err(ConfigError::MalformedSpec {
                        name,
                        reason: format!("lognormal mean must be positive, got {mean}"),
                    })
                } else if std_dev < 0.0 {
                    Err(ConfigError::MalformedSpec {
                        name,
                        reason: format!("negative std_dev {std_dev}"),
                    })
                } else {
                    Ok(())
                }
            }
        };

        if let Some(spec) = &self.demand_intercept {
            check("demand_intercept".to_string(), spec)?;
        }
        if let Some(spec) = &self.demand_slope {
            check("demand_slope".to_string(), spec)?;
        }
        if let Some(spec) = &self.gamma {
            check("gamma".to_string(), spec)?;
        }
        if let Some(specs) = &self.linear_costs {
            if specs.len() != num_firms {
                return Err(ConfigError::CostSpecLength {
                    name: "linear_costs",
                    given: specs.len(),
                    firms: num_firms,
                });
            }
            for (i, spec) in specs.iter().enumerate() {
                check(format!("linear_costs[{i}]"), spec)?;
            }
        }
        if let Some(specs) = &self.quadratic_costs {
            if specs.len() != num_firms {
                return Err(ConfigError::CostSpecLength {
                    name: "quadratic_costs",
                    given: specs.len(),
                    firms: num_firms,
                });
            }
            for (i, spec) in specs.iter().enumerate() {
                check(format!("quadratic_costs[{i}]"), spec)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfiguration::duopoly_quantity_default()
            .validate()
            .is_ok());
    }

    #[test]
    fn test_firm_count_bounds() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.firms = vec![FirmConfig::new("ONLY", 10.0, 0.0)];
        assert_eq!(config.validate(), Err(ConfigError::FirmCount(1)));

        config.firms = (0..11)
            .map(|i| FirmConfig::new(format!("F{i}"), 10.0, 0.0))
            .collect();
        assert_eq!(config.validate(), Err(ConfigError::FirmCount(11)));
    }

    #[test]
    fn test_duplicate_firm_ids_rejected() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.firms[1].id = config.firms[0].id.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateFirmId(_))
        ));
    }

    #[test]
    fn test_non_positive_demand_rejected() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.demand = DemandSpec::Linear {
            intercept: 100.0,
            slope: 0.0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveDemandParameter { .. })
        ));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.rounds = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoRounds));
    }

    #[test]
    fn test_gamma_out_of_range_rejected() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.gamma = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::GammaOutOfRange(1.5)));
    }

    #[test]
    fn test_differentiated_price_requires_linear() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.mode = CompetitionMode::PriceSetting;
        config.gamma = 0.5;
        config.demand = DemandSpec::Exponential {
            scale: 100.0,
            decay_rate: 0.05,
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::DifferentiatedPriceRequiresLinear)
        );

        // Homogeneous price-setting may use any demand form
        config.gamma = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_firm_demand_length_checked() {
        let mut config = GameConfiguration::duopoly_quantity_default();
        config.firm_demand = Some(vec![FirmDemand {
            intercept: 100.0,
            slope: 1.0,
        }]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FirmDemandLength { given: 1, firms: 2 })
        ));
    }
}
