//! Orchestrator integration tests
//!
//! Full-game runs with deterministic stub providers: lifecycle transitions,
//! event vocabulary, degraded decision handling, fatal communication
//! failure, best-effort persistence, and pause/resume equivalence.

use oligopoly_core_rs::orchestrator::{GameError, GameOrchestrator, GameSnapshot, GameStore, RunOutcome, StoreError};
use oligopoly_core_rs::provider::{
    CommunicationContext, ConstantProvider, DecisionContext, DecisionProvider, ProviderError,
};
use oligopoly_core_rs::{
    CommunicationConfig, EventSink, FirmDecision, GameConfiguration, GameEvent, GamePhase,
    ParameterSpec, ParameterSpecs, PauseToken, RoundResult, VariationScope,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test doubles
// ============================================================================

/// Records every delivered event
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &GameEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

impl RecordingSink {
    fn count(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

/// Requests a pause once a target number of rounds has completed
struct PausingSink {
    token: PauseToken,
    rounds_seen: AtomicUsize,
    pause_after: usize,
}

impl EventSink for PausingSink {
    fn emit(&self, event: &GameEvent) {
        if matches!(event, GameEvent::RoundComplete { .. }) {
            let seen = self.rounds_seen.fetch_add(1, Ordering::SeqCst) + 1;
            if seen == self.pause_after {
                self.token.request_pause();
            }
        }
    }
}

/// Decision provider whose designated firm always fails
struct PartiallyFailingProvider {
    inner: ConstantProvider,
    failing_firm: usize,
}

impl DecisionProvider for PartiallyFailingProvider {
    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<FirmDecision, ProviderError> {
        if ctx.firm == self.failing_firm {
            return Err(ProviderError::Failure {
                firm: ctx.firm,
                reason: "adapter timeout".to_string(),
            });
        }
        self.inner.decide(ctx)
    }

    fn communicate(&self, ctx: &CommunicationContext<'_>) -> Result<String, ProviderError> {
        self.inner.communicate(ctx)
    }
}

/// Provider whose communication calls always fail
struct MuteProvider {
    inner: ConstantProvider,
}

impl DecisionProvider for MuteProvider {
    fn decide(&self, ctx: &DecisionContext<'_>) -> Result<FirmDecision, ProviderError> {
        self.inner.decide(ctx)
    }

    fn communicate(&self, ctx: &CommunicationContext<'_>) -> Result<String, ProviderError> {
        Err(ProviderError::Failure {
            firm: ctx.firm,
            reason: "no channel".to_string(),
        })
    }
}

/// Store that always rejects, to prove persistence is best-effort
struct RejectingStore;

impl GameStore for RejectingStore {
    fn save(&self, _snapshot: &GameSnapshot) -> Result<(), StoreError> {
        Err(StoreError::Rejected("disk full".to_string()))
    }
}

/// Store that records accepted snapshots
#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<GameSnapshot>>,
}

impl GameStore for MemoryStore {
    fn save(&self, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        self.saved.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

fn small_config(rounds: usize, replications: usize) -> GameConfiguration {
    let mut config = GameConfiguration::duopoly_quantity_default();
    config.rounds = rounds;
    config.replications = replications;
    config
}

fn nash_provider() -> Arc<dyn DecisionProvider> {
    Arc::new(ConstantProvider::new(vec![30.0, 30.0]))
}

fn round_economics(round: &RoundResult) -> Vec<(f64, f64, f64)> {
    round
        .firms
        .iter()
        .map(|f| (f.quantity, f.price, f.profit))
        .collect()
}

// ============================================================================
// Lifecycle and events
// ============================================================================

#[test]
fn test_full_game_event_vocabulary() {
    let mut orchestrator = GameOrchestrator::new(small_config(2, 2), nash_provider()).unwrap();
    let sink = Arc::new(RecordingSink::default());
    orchestrator.add_sink(sink.clone());

    assert_eq!(orchestrator.start().unwrap(), RunOutcome::Completed);

    assert_eq!(sink.count(|e| matches!(e, GameEvent::ReplicationStarted { .. })), 2);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::ReplicationComplete { .. })), 2);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::RoundStarted { .. })), 4);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::RoundComplete { .. })), 4);
    // Two firms, four rounds
    assert_eq!(sink.count(|e| matches!(e, GameEvent::DecisionPending { .. })), 8);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::FirmDecision { .. })), 8);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::GameOver { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::Error { .. })), 0);
}

#[test]
fn test_communication_phase_round_robin() {
    let mut config = small_config(1, 1);
    config.communication = CommunicationConfig {
        enabled: true,
        messages_per_round: 2,
    };
    let mut orchestrator = GameOrchestrator::new(config, nash_provider()).unwrap();
    let sink = Arc::new(RecordingSink::default());
    orchestrator.add_sink(sink.clone());

    orchestrator.start().unwrap();

    // Two passes over two firms: 0, 1, 0, 1
    let speakers: Vec<usize> = sink
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            GameEvent::CommunicationMessage { firm, .. } => Some(*firm),
            _ => None,
        })
        .collect();
    assert_eq!(speakers, vec![0, 1, 0, 1]);

    assert_eq!(sink.count(|e| matches!(e, GameEvent::CommunicationStarted { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, GameEvent::CommunicationComplete { .. })), 1);

    // The transcript rides on the round result
    let round = &orchestrator.state().replications[0].rounds[0];
    assert_eq!(round.transcript.as_ref().unwrap().len(), 4);
}

#[test]
fn test_decision_failure_defaults_and_round_completes() {
    let provider = Arc::new(PartiallyFailingProvider {
        inner: ConstantProvider::new(vec![30.0, 30.0]),
        failing_firm: 1,
    });
    let mut orchestrator = GameOrchestrator::new(small_config(2, 1), provider).unwrap();

    assert_eq!(orchestrator.start().unwrap(), RunOutcome::Completed);

    let rounds = &orchestrator.state().replications[0].rounds;
    assert_eq!(rounds.len(), 2);
    for round in rounds {
        // Firm 1 degraded to the quantity default of zero
        assert_eq!(round.firms[1].quantity, 0.0);
        assert!(round.firms[0].quantity > 0.0);
    }

    // The degradation is recorded in the audit log
    let defaulted = orchestrator
        .event_log()
        .count_matching(|e| matches!(e, GameEvent::DecisionDefaulted { firm: 1, .. }));
    assert_eq!(defaulted, 2);
}

#[test]
fn test_communication_failure_is_fatal() {
    let mut config = small_config(2, 1);
    config.communication = CommunicationConfig {
        enabled: true,
        messages_per_round: 1,
    };
    let provider = Arc::new(MuteProvider {
        inner: ConstantProvider::new(vec![30.0, 30.0]),
    });
    let mut orchestrator = GameOrchestrator::new(config, provider).unwrap();
    let sink = Arc::new(RecordingSink::default());
    orchestrator.add_sink(sink.clone());

    assert!(matches!(
        orchestrator.start(),
        Err(GameError::Communication(_))
    ));
    assert_eq!(sink.count(|e| matches!(e, GameEvent::Error { .. })), 1);
    // No round ever completed
    assert_eq!(sink.count(|e| matches!(e, GameEvent::RoundComplete { .. })), 0);
}

#[test]
fn test_persistence_failure_does_not_affect_completion() {
    let mut orchestrator = GameOrchestrator::new(small_config(1, 1), nash_provider())
        .unwrap()
        .with_store(Box::new(RejectingStore));

    assert_eq!(orchestrator.start().unwrap(), RunOutcome::Completed);
    assert_eq!(orchestrator.phase(), GamePhase::Completed);

    let logged = orchestrator
        .event_log()
        .count_matching(|e| matches!(e, GameEvent::PersistenceFailed { .. }));
    assert_eq!(logged, 1);
}

#[test]
fn test_successful_persistence_keyed_by_game_id() {
    let store = Arc::new(MemoryStore::default());

    struct SharedStore(Arc<MemoryStore>);
    impl GameStore for SharedStore {
        fn save(&self, snapshot: &GameSnapshot) -> Result<(), StoreError> {
            self.0.save(snapshot)
        }
    }

    let mut orchestrator = GameOrchestrator::new(small_config(1, 1), nash_provider())
        .unwrap()
        .with_store(Box::new(SharedStore(store.clone())));
    orchestrator.start().unwrap();

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].game_id, orchestrator.state().id);
    assert_eq!(saved[0].state.replications.len(), 1);
}

// ============================================================================
// Pause / resume
// ============================================================================

#[test]
fn test_pause_mid_replication_and_resume_matches_uninterrupted_run() {
    let make_config = || {
        let mut config = small_config(3, 2);
        // Replication-scope randomized costs exercise the deterministic
        // parameter path across the pause boundary
        config.variation = VariationScope::Replication;
        config.parameter_specs = Some(ParameterSpecs {
            linear_costs: Some(vec![
                ParameterSpec::Uniform {
                    min: 5.0,
                    max: 15.0,
                },
                ParameterSpec::Uniform {
                    min: 5.0,
                    max: 15.0,
                },
            ]),
            ..Default::default()
        });
        config
    };

    // Uninterrupted run
    let mut baseline = GameOrchestrator::new(make_config(), nash_provider()).unwrap();
    assert_eq!(baseline.start().unwrap(), RunOutcome::Completed);

    // Paused after the second round, then resumed
    let mut interrupted = GameOrchestrator::new(make_config(), nash_provider()).unwrap();
    let pausing_sink = Arc::new(PausingSink {
        token: interrupted.pause_token(),
        rounds_seen: AtomicUsize::new(0),
        pause_after: 2,
    });
    interrupted.add_sink(pausing_sink);

    assert_eq!(interrupted.start().unwrap(), RunOutcome::Paused);
    assert_eq!(interrupted.phase(), GamePhase::Paused);
    // Mid-replication: two of three rounds played
    assert_eq!(interrupted.state().rounds.len(), 2);
    assert_eq!(interrupted.state().replications.len(), 0);

    assert_eq!(interrupted.resume().unwrap(), RunOutcome::Completed);

    // Identical economics in every round of every replication
    let a = &baseline.state().replications;
    let b = &interrupted.state().replications;
    assert_eq!(a.len(), b.len());
    for (rep_a, rep_b) in a.iter().zip(b.iter()) {
        assert_eq!(rep_a.rounds.len(), rep_b.rounds.len());
        for (round_a, round_b) in rep_a.rounds.iter().zip(rep_b.rounds.iter()) {
            assert_eq!(round_economics(round_a), round_economics(round_b));
            assert_eq!(round_a.realized_parameters, round_b.realized_parameters);
        }
    }
}

#[test]
fn test_pause_is_observed_between_rounds_only() {
    let mut orchestrator = GameOrchestrator::new(small_config(4, 1), nash_provider()).unwrap();
    let pausing_sink = Arc::new(PausingSink {
        token: orchestrator.pause_token(),
        rounds_seen: AtomicUsize::new(0),
        pause_after: 1,
    });
    orchestrator.add_sink(pausing_sink);

    assert_eq!(orchestrator.start().unwrap(), RunOutcome::Paused);
    // The in-flight round finished before the pause took effect
    assert_eq!(orchestrator.state().rounds.len(), 1);
    assert_eq!(orchestrator.state().current_round, 1);
}

#[test]
fn test_pause_requires_running() {
    let mut orchestrator = GameOrchestrator::new(small_config(1, 1), nash_provider()).unwrap();
    assert!(matches!(
        orchestrator.pause(),
        Err(GameError::InvalidTransition(_))
    ));
}

#[test]
fn test_game_scope_parameters_shared_across_all_rounds() {
    let mut config = small_config(2, 2);
    config.variation = VariationScope::Game;
    config.parameter_specs = Some(ParameterSpecs {
        demand_intercept: Some(ParameterSpec::Uniform {
            min: 90.0,
            max: 110.0,
        }),
        ..Default::default()
    });

    let mut orchestrator = GameOrchestrator::new(config, nash_provider()).unwrap();
    let game_params = orchestrator.state().game_parameters.clone().unwrap();
    orchestrator.start().unwrap();

    for replication in &orchestrator.state().replications {
        for round in &replication.rounds {
            assert_eq!(round.realized_parameters.as_ref(), Some(&game_params));
        }
    }
}

#[test]
fn test_round_scope_parameters_vary_per_round() {
    let mut config = small_config(4, 1);
    config.variation = VariationScope::Round;
    config.parameter_specs = Some(ParameterSpecs {
        demand_intercept: Some(ParameterSpec::Uniform {
            min: 50.0,
            max: 150.0,
        }),
        ..Default::default()
    });

    let mut orchestrator = GameOrchestrator::new(config, nash_provider()).unwrap();
    orchestrator.start().unwrap();

    let rounds = &orchestrator.state().replications[0].rounds;
    let intercepts: Vec<f64> = rounds
        .iter()
        .map(|r| {
            r.realized_parameters
                .as_ref()
                .unwrap()
                .demand
                .coefficients()
                .0
        })
        .collect();
    // Four independent uniform draws over a wide range: all distinct
    let mut deduped = intercepts.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), intercepts.len());
}
