//! Demo CLI: run one deterministic duopoly game and print its lifecycle.
//!
//! Usage: `oligopoly-cli [rounds] [replications]`

use oligopoly_core_rs::{
    ConstantProvider, EventSink, GameConfiguration, GameEvent, GameOrchestrator,
};
use std::sync::Arc;

/// Prints the high-signal subset of the event stream to stdout.
struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: &GameEvent) {
        match event {
            GameEvent::ReplicationStarted { number, total } => {
                println!("replication {}/{} started", number + 1, total);
            }
            GameEvent::RoundComplete { result } => {
                let quantities: Vec<String> = result
                    .firms
                    .iter()
                    .map(|f| format!("q={:.2} p={:.2} profit={:.2}", f.quantity, f.price, f.profit))
                    .collect();
                println!("  round {}: {}", result.round, quantities.join(" | "));
            }
            GameEvent::Error { message } => eprintln!("error: {message}"),
            _ => {}
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let rounds = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or(5);
    let replications = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);

    let mut config = GameConfiguration::duopoly_quantity_default();
    config.rounds = rounds;
    config.replications = replications;

    // Both firms play the Cournot Nash quantity every round
    let provider = Arc::new(ConstantProvider::new(vec![30.0, 30.0]));

    let mut orchestrator = match GameOrchestrator::new(config, provider) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            eprintln!("configuration rejected: {err}");
            std::process::exit(1);
        }
    };
    orchestrator.add_sink(Arc::new(StdoutSink));

    if let Some(nash) = &orchestrator.state().benchmarks.nash {
        println!(
            "nash benchmark: q=({:.2}, {:.2}) price={:.2}",
            nash.quantity1, nash.quantity2, nash.price
        );
    }

    if let Err(err) = orchestrator.start() {
        eprintln!("game failed: {err}");
        std::process::exit(1);
    }

    if let Some(summary) = &orchestrator.state().summary {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("summary: {json}"),
            Err(err) => eprintln!("summary unavailable: {err}"),
        }
    }
}
