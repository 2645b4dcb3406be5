//! Oligopoly Simulator Core - Rust Engine
//!
//! Repeated oligopoly market simulations with autonomous decision-making
//! firms, plus the analytical equilibria their behavior is compared
//! against.
//!
//! # Architecture
//!
//! - **core**: Round/replication progression and wall-clock stamps
//! - **rng**: Deterministic random number generation
//! - **math**: Dense linear solver behind every N-firm equilibrium
//! - **demand**: Price functions and their differentiated variants
//! - **models**: Domain types (configuration, parameters, results, state, events)
//! - **equilibrium**: Nash, cooperative, N-firm, and limit-pricing benchmarks
//! - **realization**: Randomized structural parameter draws
//! - **accounting**: Per-round quantity/price/cost/profit computation
//! - **provider**: Decision-maker boundary (firms are external and opaque)
//! - **orchestrator**: The replication/round game loop
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. Solver components are pure functions of their inputs
//! 3. One orchestrator owns exactly one live game state

// Module declarations
pub mod accounting;
pub mod core;
pub mod demand;
pub mod equilibrium;
pub mod math;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod realization;
pub mod rng;

// Re-exports for convenience
pub use crate::core::time::GameClock;
pub use models::{
    config::{
        CommunicationConfig, CompetitionMode, ConfigError, DecisionBounds, DemandSpec, FirmConfig,
        FirmDemand, GameConfiguration, VariationScope,
    },
    decision::{CommunicationMessage, FirmDecision},
    equilibrium::{
        CooperativeEquilibrium, EquilibriumBenchmarks, LimitPricingAnalysis, MarketRegion,
        NashEquilibrium, NPolyEquilibrium,
    },
    event::{EventLog, EventSink, GameEvent},
    parameters::{ParameterSpec, ParameterSpecs, RealizedCost, RealizedParameters},
    round::{
        FirmRoundResult, FirmSummary, GameSummary, LegacyRoundView, ReplicationResult,
        ReplicationSummary, RoundResult,
    },
    state::{GamePhase, GameState},
};
pub use orchestrator::{
    GameError, GameOrchestrator, GameSnapshot, GameStore, PauseToken, RunOutcome, StoreError,
};
pub use provider::{
    CommunicationContext, ConstantProvider, DecisionContext, DecisionProvider, ProviderError,
    ScriptedProvider,
};
pub use rng::RngManager;
