//! Equilibrium value objects
//!
//! Pure computed snapshots produced by the equilibrium solver; never mutated.
//! Non-calculability is data, not an error: callers request benchmarks
//! speculatively, so an equilibrium that has no closed form for the given
//! demand/cost combination comes back flagged with a human-readable reason.

use crate::models::config::CompetitionMode;
use serde::{Deserialize, Serialize};

/// Two-firm closed-form Nash equilibrium (linear demand, homogeneous goods)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NashEquilibrium {
    pub quantity1: f64,
    pub quantity2: f64,
    pub price: f64,
    pub profit1: f64,
    pub profit2: f64,
}

/// Multiplant-monopoly cooperative equilibrium (two firms colluding)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooperativeEquilibrium {
    pub quantity1: f64,
    pub quantity2: f64,
    pub total_quantity: f64,
    pub price: f64,
    pub profit1: f64,
    pub profit2: f64,
    pub total_profit: f64,
}

/// N-firm Nash equilibrium for either competition mode
///
/// `calculable` is false — with `message` explaining why — when the
/// demand/cost combination has no closed form (non-linear demand for
/// Cournot, quadratic costs for Bertrand) or the FOC system is singular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NPolyEquilibrium {
    pub mode: CompetitionMode,
    pub calculable: bool,
    pub message: Option<String>,
    pub quantities: Vec<f64>,
    pub prices: Vec<f64>,
    pub profits: Vec<f64>,
    pub total_quantity: f64,
}

impl NPolyEquilibrium {
    /// A not-calculable result carrying only the reason.
    pub fn not_calculable(mode: CompetitionMode, message: impl Into<String>) -> Self {
        Self {
            mode,
            calculable: false,
            message: Some(message.into()),
            quantities: Vec::new(),
            prices: Vec::new(),
            profits: Vec::new(),
            total_quantity: 0.0,
        }
    }
}

/// Market structure region from the limit-pricing classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRegion {
    /// Both firms produce at an interior equilibrium
    InteriorDuopoly,
    /// The strong firm prices to constrain the weak rival
    LimitPricing,
    /// Asymmetry is large enough that the weak firm is excluded
    Monopoly,
}

/// Duopoly limit-pricing classification
///
/// `applicable` is false for firm counts other than two — the analysis is
/// inapplicable there, which is not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitPricingAnalysis {
    pub applicable: bool,
    pub message: Option<String>,
    pub asymmetry_index: f64,
    pub threshold_low: f64,
    pub threshold_high: f64,
    pub region: Option<MarketRegion>,
}

impl LimitPricingAnalysis {
    pub fn inapplicable(message: impl Into<String>) -> Self {
        Self {
            applicable: false,
            message: Some(message.into()),
            asymmetry_index: 0.0,
            threshold_low: 0.0,
            threshold_high: 0.0,
            region: None,
        }
    }
}

/// All benchmarks computed once at configuration time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumBenchmarks {
    /// Two-firm closed form; present only for linear-demand duopolies
    pub nash: Option<NashEquilibrium>,

    /// Cooperative multiplant monopoly; present only for linear-demand
    /// duopolies
    pub cooperative: Option<CooperativeEquilibrium>,

    /// N-firm Cournot (flagged not-calculable for non-linear demand)
    pub cournot: NPolyEquilibrium,

    /// N-firm Bertrand (flagged not-calculable with quadratic costs)
    pub bertrand: NPolyEquilibrium,

    /// Duopoly limit-pricing classification (inapplicable for n ≠ 2)
    pub limit_pricing: LimitPricingAnalysis,
}
