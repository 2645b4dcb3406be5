//! Decision provider boundary
//!
//! Firms are external, opaque decision makers (automated strategies, or a
//! language model behind an adapter). The engine consumes them through
//! [`DecisionProvider`]: one call per firm per round for decisions, one call
//! per speaking turn during communication phases.
//!
//! Timeouts and retries toward a provider are the adapter's concern, not the
//! engine's: the engine assumes a call eventually resolves or rejects. A
//! failed decision call degrades to a deterministic default; a failed
//! communication call is fatal to the round because later turns depend on
//! the transcript.

use crate::models::config::{CompetitionMode, GameConfiguration};
use crate::models::decision::{CommunicationMessage, FirmDecision};
use crate::models::parameters::RealizedParameters;
use crate::models::round::{ReplicationResult, RoundResult};
use thiserror::Error;

/// Provider call failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("provider failure for firm {firm}: {reason}")]
    Failure { firm: usize, reason: String },
}

/// Everything a firm may see when asked for a decision
#[derive(Debug)]
pub struct DecisionContext<'a> {
    pub config: &'a GameConfiguration,
    pub firm: usize,
    pub replication: usize,
    pub round: usize,
    /// Completed rounds of the current replication
    pub history: &'a [RoundResult],
    /// Finished replications
    pub replications: &'a [ReplicationResult],
    /// Parameters this round is played under
    pub realized: &'a RealizedParameters,
    /// Communication transcript of this round, when the phase ran
    pub transcript: Option<&'a [CommunicationMessage]>,
}

/// Everything a firm may see when asked to speak
#[derive(Debug)]
pub struct CommunicationContext<'a> {
    pub config: &'a GameConfiguration,
    pub firm: usize,
    pub replication: usize,
    pub round: usize,
    pub history: &'a [RoundResult],
    /// Messages already spoken this round, in order
    pub transcript: &'a [CommunicationMessage],
}

/// External decision maker for every firm in the game.
///
/// Implementations must be `Sync`: decision calls for one round are issued
/// concurrently across firms.
pub trait DecisionProvider: Send + Sync {
    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<FirmDecision, ProviderError>;

    fn communicate(&self, ctx: &CommunicationContext<'_>) -> Result<String, ProviderError>;
}

/// Plays a fixed per-firm sequence of values, cycling when the game runs
/// longer than the script.
///
/// Stateless by design: the value for a round is a pure function of the
/// round/replication indices, so pause/resume and replay stay deterministic.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    /// One value sequence per firm
    scripts: Vec<Vec<f64>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Vec<f64>>) -> Self {
        assert!(
            scripts.iter().all(|s| !s.is_empty()),
            "every firm needs at least one scripted value"
        );
        Self { scripts }
    }
}

impl DecisionProvider for ScriptedProvider {
    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<FirmDecision, ProviderError> {
        let script = self
            .scripts
            .get(ctx.firm)
            .ok_or_else(|| ProviderError::Failure {
                firm: ctx.firm,
                reason: format!("no script for firm {}", ctx.firm),
            })?;
        let step = ctx.replication * ctx.config.rounds + ctx.round;
        Ok(FirmDecision::new(ctx.firm, script[step % script.len()]))
    }

    fn communicate(&self, ctx: &CommunicationContext<'_>) -> Result<String, ProviderError> {
        Ok(format!(
            "firm {} holding course in round {}",
            ctx.firm, ctx.round
        ))
    }
}

/// Submits one constant value per firm every round.
#[derive(Debug, Clone)]
pub struct ConstantProvider {
    values: Vec<f64>,
}

impl ConstantProvider {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl DecisionProvider for ConstantProvider {
    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<FirmDecision, ProviderError> {
        let value = self
            .values
            .get(ctx.firm)
            .copied()
            .ok_or_else(|| ProviderError::Failure {
                firm: ctx.firm,
                reason: format!("no value for firm {}", ctx.firm),
            })?;
        Ok(FirmDecision::new(ctx.firm, value))
    }

    fn communicate(&self, ctx: &CommunicationContext<'_>) -> Result<String, ProviderError> {
        Ok(format!("firm {} has nothing to add", ctx.firm))
    }
}

/// The deterministic fallback when a firm's decision call fails: zero
/// quantity under quantity-setting, marginal cost under price-setting.
pub fn default_decision(
    config: &GameConfiguration,
    realized: &RealizedParameters,
    firm: usize,
) -> FirmDecision {
    let value = match config.mode {
        CompetitionMode::QuantitySetting => 0.0,
        CompetitionMode::PriceSetting => realized.costs.get(firm).map_or(0.0, |c| c.linear),
    };
    FirmDecision::new(firm, value)
}
