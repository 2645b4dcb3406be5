//! Game orchestrator
//!
//! The stateful driver of a game: configuration intake, the
//! replication/round loop, communication-phase sequencing, concurrent
//! decision collection, persistence/notification hand-off, and
//! pause/resume/reset.
//!
//! # State machine
//!
//! ```text
//! configure → Configuring ─start→ Running ⇄ Paused
//!                                    │
//!                                    └──(all replications played)→ Completed
//! ```
//!
//! # Round body
//!
//! ```text
//! For each round r:
//! 1. Realize parameters if the variation scope demands it
//! 2. Communication phase (strictly sequential round-robin, if enabled)
//! 3. Request a decision from every firm CONCURRENTLY (fan-out/fan-in)
//! 4. Account the round (quantities, prices, costs, profits)
//! 5. Append the result, emit round-complete
//! ```
//!
//! One orchestrator owns exactly one live [`GameState`]; the loop is a
//! single logical sequence. Within a round, only the decision fan-out runs
//! concurrently — a single firm's failure degrades to a deterministic
//! default and never aborts the round, while a communication failure is
//! fatal because later turns depend on the transcript.

use crate::accounting::{self, AccountingError};
use crate::core::time::{unix_millis, GameClock};
use crate::equilibrium::{self, EquilibriumError};
use crate::models::config::{ConfigError, GameConfiguration, VariationScope};
use crate::models::decision::{CommunicationMessage, FirmDecision};
use crate::models::event::{EventLog, EventSink, GameEvent};
use crate::models::parameters::RealizedParameters;
use crate::models::round::{GameSummary, ReplicationResult, ReplicationSummary};
use crate::models::state::{GamePhase, GameState};
use crate::orchestrator::pause::PauseToken;
use crate::orchestrator::snapshot::{GameSnapshot, GameStore};
use crate::provider::{
    default_decision, CommunicationContext, DecisionContext, DecisionProvider, ProviderError,
};
use crate::realization;
use crate::rng::RngManager;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use uuid::Uuid;

/// Orchestrator failures
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("equilibrium benchmarks failed: {0}")]
    Equilibrium(#[from] EquilibriumError),

    #[error("communication phase failed: {0}")]
    Communication(ProviderError),

    #[error("round accounting failed: {0}")]
    Accounting(#[from] AccountingError),
}

/// How a call to `start`/`resume` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every replication has been played; the game is complete
    Completed,
    /// A pause was observed at a round or replication boundary
    Paused,
}

/// The stateful game driver
pub struct GameOrchestrator {
    state: GameState,
    clock: GameClock,
    provider: Arc<dyn DecisionProvider>,
    store: Option<Box<dyn GameStore>>,
    sinks: Vec<Arc<dyn EventSink>>,
    rng: RngManager,
    pause: PauseToken,
    event_log: EventLog,

    /// Parameters drawn for the current replication (Replication scope)
    replication_params: Option<RealizedParameters>,
    /// True once the current replication has been opened (events emitted,
    /// parameters drawn); guards against re-opening after a pause
    replication_open: bool,
    replication_started_at: u64,
}

impl GameOrchestrator {
    /// Validate the configuration, compute all four equilibrium benchmarks
    /// once, and enter the `Configuring` phase.
    ///
    /// If the configuration randomizes parameters under game-wide scope the
    /// realization happens here and is reused for the whole game.
    pub fn new(
        config: GameConfiguration,
        provider: Arc<dyn DecisionProvider>,
    ) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = RngManager::new(config.rng_seed);

        let game_parameters = if config.variation == VariationScope::Game
            && realization::has_random_parameters(&config)
        {
            Some(realization::draw_all(&config, &mut rng))
        } else {
            None
        };

        let benchmarks = equilibrium::compute_benchmarks(&config, game_parameters.as_ref())?;
        let clock = GameClock::new(config.rounds, config.replications);

        let state = GameState {
            id: Uuid::new_v4(),
            phase: GamePhase::Configuring,
            config,
            current_replication: 0,
            current_round: 0,
            rounds: Vec::new(),
            replications: Vec::new(),
            benchmarks,
            game_parameters,
            summary: None,
            created_at_ms: unix_millis(),
            started_at_ms: None,
            completed_at_ms: None,
        };

        Ok(Self {
            state,
            clock,
            provider,
            store: None,
            sinks: Vec::new(),
            rng,
            pause: PauseToken::new(),
            event_log: EventLog::new(),
            replication_params: None,
            replication_open: false,
            replication_started_at: 0,
        })
    }

    /// Attach the optional persistence collaborator.
    pub fn with_store(mut self, store: Box<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a notification sink. Every non-audit event is delivered to
    /// every sink, fire-and-forget.
    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// A handle observers can use to request a pause while the loop runs.
    pub fn pause_token(&self) -> PauseToken {
        self.pause.clone()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    // ========================================================================
    // State transitions
    // ========================================================================

    /// Begin the replication loop. Only valid from `Configuring`; starting
    /// an already-running (or finished) game is rejected.
    pub fn start(&mut self) -> Result<RunOutcome, GameError> {
        if self.state.phase != GamePhase::Configuring {
            return Err(GameError::InvalidTransition(format!(
                "cannot start from {:?}",
                self.state.phase
            )));
        }
        self.state.phase = GamePhase::Running;
        self.state.started_at_ms = Some(unix_millis());
        self.emit(GameEvent::StateSnapshot {
            state: Box::new(self.state.clone()),
        });
        self.drive()
    }

    /// Request a pause. Only meaningful from `Running`; the loop suspends at
    /// the next round or replication boundary.
    pub fn pause(&mut self) -> Result<(), GameError> {
        if self.state.phase != GamePhase::Running {
            return Err(GameError::InvalidTransition(format!(
                "cannot pause from {:?}",
                self.state.phase
            )));
        }
        self.pause.request_pause();
        Ok(())
    }

    /// Continue a paused game from the next unplayed round/replication.
    pub fn resume(&mut self) -> Result<RunOutcome, GameError> {
        if self.state.phase != GamePhase::Paused {
            return Err(GameError::InvalidTransition(format!(
                "cannot resume from {:?}",
                self.state.phase
            )));
        }
        self.pause.clear();
        self.state.phase = GamePhase::Running;
        self.emit(GameEvent::StateSnapshot {
            state: Box::new(self.state.clone()),
        });
        self.drive()
    }

    /// Discard all state and reconfigure from the same configuration under a
    /// fresh game identity.
    pub fn reset(&mut self) -> Result<(), GameError> {
        let config = self.state.config.clone();
        let provider = Arc::clone(&self.provider);
        let store = self.store.take();
        let sinks = std::mem::take(&mut self.sinks);

        let mut fresh = GameOrchestrator::new(config, provider)?;
        fresh.store = store;
        fresh.sinks = sinks;
        *self = fresh;
        Ok(())
    }

    // ========================================================================
    // Replication loop
    // ========================================================================

    /// Run the loop, surfacing fatal errors through the error event.
    fn drive(&mut self) -> Result<RunOutcome, GameError> {
        match self.run_loop() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.emit(GameEvent::Error {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn run_loop(&mut self) -> Result<RunOutcome, GameError> {
        while !self.clock.game_finished() {
            if !self.replication_open {
                self.open_replication();
            }

            while !self.clock.replication_finished() {
                if self.pause.is_paused() {
                    self.state.phase = GamePhase::Paused;
                    return Ok(RunOutcome::Paused);
                }
                self.play_round()?;
                self.clock.advance_round();
                self.state.current_round = self.clock.current_round();
            }

            self.close_replication();
            self.clock.advance_replication();
            self.state.current_replication = self.clock.current_replication();
            self.state.current_round = 0;

            if !self.clock.game_finished() && self.pause.is_paused() {
                self.state.phase = GamePhase::Paused;
                return Ok(RunOutcome::Paused);
            }
        }

        self.finish_game();
        Ok(RunOutcome::Completed)
    }

    fn open_replication(&mut self) {
        self.replication_started_at = unix_millis();
        self.replication_params = if self.state.config.variation == VariationScope::Replication
            && realization::has_random_parameters(&self.state.config)
        {
            Some(realization::draw_all(&self.state.config, &mut self.rng))
        } else {
            None
        };
        self.replication_open = true;
        self.emit(GameEvent::ReplicationStarted {
            number: self.clock.current_replication(),
            total: self.clock.num_replications(),
        });
    }

    fn close_replication(&mut self) {
        let rounds = std::mem::take(&mut self.state.rounds);
        let summary = ReplicationSummary::from_rounds(&rounds, self.state.config.num_firms());
        let result = ReplicationResult {
            replication: self.clock.current_replication(),
            rounds,
            summary,
            started_at_ms: self.replication_started_at,
            finished_at_ms: unix_millis(),
        };
        self.emit(GameEvent::ReplicationComplete {
            result: Box::new(result.clone()),
        });
        self.state.replications.push(result);
        self.replication_open = false;
        self.replication_params = None;
    }

    /// The effective parameters for the round about to be played.
    fn round_parameters(&mut self) -> RealizedParameters {
        let config = &self.state.config;
        if config.variation == VariationScope::Round && realization::has_random_parameters(config) {
            return realization::draw_all(config, &mut self.rng);
        }
        if let Some(params) = &self.replication_params {
            return params.clone();
        }
        if let Some(params) = &self.state.game_parameters {
            return params.clone();
        }
        RealizedParameters::from_config(config)
    }

    fn play_round(&mut self) -> Result<(), GameError> {
        let round = self.clock.current_round();
        self.emit(GameEvent::RoundStarted { number: round });

        let params = self.round_parameters();

        let transcript = if self.state.config.communication.enabled {
            Some(self.communication_phase(round)?)
        } else {
            None
        };

        let decisions = self.collect_decisions(&params, transcript.as_deref());
        for decision in &decisions {
            self.emit(GameEvent::FirmDecision {
                firm: decision.firm,
                value: decision.value,
                rationale: decision.rationale.clone(),
            });
        }

        let mut result =
            accounting::compute_round(&self.state.config, &params, &decisions, round)?;
        if realization::has_random_parameters(&self.state.config) {
            result.realized_parameters = Some(params);
        }
        result.transcript = transcript;

        self.emit(GameEvent::RoundComplete {
            result: Box::new(result.clone()),
        });
        self.state.rounds.push(result);
        Ok(())
    }

    /// Strictly sequential round-robin: firm 0, 1, …, n−1, repeated for the
    /// configured message count. Each message joins the transcript visible
    /// to subsequent speakers. A provider failure here is fatal to the
    /// round — later turns depend on the transcript.
    fn communication_phase(
        &mut self,
        round: usize,
    ) -> Result<Vec<CommunicationMessage>, GameError> {
        self.emit(GameEvent::CommunicationStarted { round });

        let num_firms = self.state.config.num_firms();
        let passes = self.state.config.communication.messages_per_round;
        let mut transcript: Vec<CommunicationMessage> = Vec::with_capacity(passes * num_firms);

        for _pass in 0..passes {
            for firm in 0..num_firms {
                let outcome = {
                    let ctx = CommunicationContext {
                        config: &self.state.config,
                        firm,
                        replication: self.clock.current_replication(),
                        round,
                        history: &self.state.rounds,
                        transcript: &transcript,
                    };
                    self.provider.communicate(&ctx)
                };
                match outcome {
                    Ok(text) => {
                        self.emit(GameEvent::CommunicationMessage {
                            firm,
                            text: text.clone(),
                        });
                        transcript.push(CommunicationMessage { firm, text });
                    }
                    Err(err) => return Err(GameError::Communication(err)),
                }
            }
        }

        self.emit(GameEvent::CommunicationComplete {
            transcript: transcript.clone(),
        });
        Ok(transcript)
    }

    /// Fan-out/fan-in decision collection: one scoped thread per firm,
    /// joined in firm order. A firm's failure (or panic) is replaced with
    /// the deterministic default decision and recorded in the event log, so
    /// the round always produces a complete result.
    fn collect_decisions(
        &mut self,
        params: &RealizedParameters,
        transcript: Option<&[CommunicationMessage]>,
    ) -> Vec<FirmDecision> {
        let num_firms = self.state.config.num_firms();
        for firm in 0..num_firms {
            self.emit(GameEvent::DecisionPending { firm });
        }

        let outcomes: Vec<Result<FirmDecision, ProviderError>> = {
            let config = &self.state.config;
            let history = self.state.rounds.as_slice();
            let replications = self.state.replications.as_slice();
            let replication = self.clock.current_replication();
            let round = self.clock.current_round();
            let provider = &*self.provider;

            thread::scope(|scope| {
                let handles: Vec<_> = (0..num_firms)
                    .map(|firm| {
                        scope.spawn(move || {
                            let ctx = DecisionContext {
                                config,
                                firm,
                                replication,
                                round,
                                history,
                                replications,
                                realized: params,
                                transcript,
                            };
                            provider.decide(&ctx)
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .enumerate()
                    .map(|(firm, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(ProviderError::Failure {
                                firm,
                                reason: "decision provider panicked".to_string(),
                            })
                        })
                    })
                    .collect()
            })
        };

        outcomes
            .into_iter()
            .enumerate()
            .map(|(firm, outcome)| match outcome {
                Ok(decision) => decision,
                Err(err) => {
                    self.event_log.log(GameEvent::DecisionDefaulted {
                        firm,
                        reason: err.to_string(),
                    });
                    default_decision(&self.state.config, params, firm)
                }
            })
            .collect()
    }

    fn finish_game(&mut self) {
        let summary = GameSummary::from_replications(
            &self.state.replications,
            self.state.config.num_firms(),
            self.state.benchmarks.nash.as_ref(),
        );
        self.state.summary = Some(summary);
        self.state.phase = GamePhase::Completed;
        self.state.completed_at_ms = Some(unix_millis());

        self.persist_final_state();

        self.emit(GameEvent::GameOver {
            state: Box::new(self.state.clone()),
        });
    }

    /// Best-effort persistence hand-off: failures are logged and do not
    /// affect completion.
    fn persist_final_state(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let result = GameSnapshot::capture(&self.state).and_then(|snapshot| store.save(&snapshot));
        if let Err(err) = result {
            self.event_log.log(GameEvent::PersistenceFailed {
                reason: err.to_string(),
            });
        }
    }

    // ========================================================================
    // Event delivery
    // ========================================================================

    fn emit(&mut self, event: GameEvent) {
        if !event.is_audit_only() {
            for sink in &self.sinks {
                sink.emit(&event);
            }
        }
        self.event_log.log(event);
    }
}

impl std::fmt::Debug for GameOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameOrchestrator")
            .field("game_id", &self.state.id)
            .field("phase", &self.state.phase)
            .field("current_replication", &self.state.current_replication)
            .field("current_round", &self.state.current_round)
            .field("event_count", &self.event_log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
