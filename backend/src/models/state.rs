//! Game state
//!
//! Exactly one live [`GameState`] exists per orchestrator instance. It is
//! superseded wholesale on reset (fresh game identity) and moves through the
//! phase machine `Configuring → Running ⇄ Paused → Completed`.

use crate::models::config::GameConfiguration;
use crate::models::equilibrium::EquilibriumBenchmarks;
use crate::models::parameters::RealizedParameters;
use crate::models::round::{GameSummary, ReplicationResult, RoundResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Configured and benchmarked, not yet started
    Configuring,
    /// The replication loop is executing
    Running,
    /// Suspended at a round or replication boundary
    Paused,
    /// All replications played; summary computed
    Completed,
}

/// The complete state of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Unique game identity; regenerated on reset
    pub id: Uuid,

    pub phase: GamePhase,

    pub config: GameConfiguration,

    /// Replication currently being played (0-based)
    pub current_replication: usize,

    /// Round currently being played within the replication (0-based)
    pub current_round: usize,

    /// Rounds of the in-progress replication
    pub rounds: Vec<RoundResult>,

    /// Finished replications
    pub replications: Vec<ReplicationResult>,

    /// Analytical benchmarks, computed once at configuration
    pub benchmarks: EquilibriumBenchmarks,

    /// Game-scope parameter draw (present when the configuration randomizes
    /// under `VariationScope::Game`)
    pub game_parameters: Option<RealizedParameters>,

    /// Overall summary, present once completed
    pub summary: Option<GameSummary>,

    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

impl GameState {
    /// Total rounds played so far, across finished replications and the
    /// in-progress one.
    pub fn rounds_played(&self) -> usize {
        self.replications.iter().map(|r| r.rounds.len()).sum::<usize>() + self.rounds.len()
    }
}
