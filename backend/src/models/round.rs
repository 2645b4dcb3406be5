//! Round and replication results
//!
//! A [`RoundResult`] is created once per round and never mutated afterwards.
//! The engine stores one canonical per-firm representation; downstream
//! consumers that expect the flat two-firm shape get it through
//! [`LegacyRoundView`] at the serialization boundary only — the computation
//! is never duplicated.

use crate::models::decision::CommunicationMessage;
use crate::models::parameters::RealizedParameters;
use serde::{Deserialize, Serialize};

/// One firm's realized outcome for a round
///
/// Quantity and price are never negative; profit may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmRoundResult {
    /// Firm index
    pub firm: usize,

    /// Realized quantity sold
    pub quantity: f64,

    /// The firm's market price this round
    pub price: f64,

    /// Total production cost c·q + d·q²
    pub cost: f64,

    /// price·quantity − cost
    pub profit: f64,

    /// Rationale text carried over from the decision, for audit
    pub rationale: Option<String>,

    /// Prompt/input audit text carried over from the decision
    pub prompt_audit: Option<String>,
}

/// Complete outcome of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Round index within the replication (0-based)
    pub round: usize,

    /// Per-firm outcomes, ordered by firm index
    pub firms: Vec<FirmRoundResult>,

    /// Sum of realized quantities
    pub total_quantity: f64,

    /// Per-firm market prices (mirrors `firms[i].price`)
    pub market_prices: Vec<f64>,

    /// The parameters this round was computed under, when randomized
    pub realized_parameters: Option<RealizedParameters>,

    /// Communication transcript, when the phase ran
    pub transcript: Option<Vec<CommunicationMessage>>,

    /// Wall-clock stamp (ms since Unix epoch)
    pub timestamp_ms: u64,
}

impl RoundResult {
    /// Average market price across firms.
    pub fn average_price(&self) -> f64 {
        if self.market_prices.is_empty() {
            return 0.0;
        }
        self.market_prices.iter().sum::<f64>() / self.market_prices.len() as f64
    }
}

/// Flat two-firm projection of a round, produced only at the serialization
/// boundary for consumers that predate the per-firm array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyRoundView {
    pub round: usize,
    pub quantity1: f64,
    pub quantity2: f64,
    pub price1: f64,
    pub price2: f64,
    pub profit1: f64,
    pub profit2: f64,
    pub total_quantity: f64,
}

impl From<&RoundResult> for LegacyRoundView {
    fn from(result: &RoundResult) -> Self {
        let firm = |i: usize| result.firms.get(i);
        Self {
            round: result.round,
            quantity1: firm(0).map_or(0.0, |f| f.quantity),
            quantity2: firm(1).map_or(0.0, |f| f.quantity),
            price1: firm(0).map_or(0.0, |f| f.price),
            price2: firm(1).map_or(0.0, |f| f.price),
            profit1: firm(0).map_or(0.0, |f| f.profit),
            profit2: firm(1).map_or(0.0, |f| f.profit),
            total_quantity: result.total_quantity,
        }
    }
}

/// Per-firm aggregates over one replication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmSummary {
    pub firm: usize,
    pub total_profit: f64,
    pub average_quantity: f64,
    pub average_price: f64,
}

/// Aggregate summary of a replication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSummary {
    pub firms: Vec<FirmSummary>,
    pub average_market_price: f64,
}

impl ReplicationSummary {
    /// Aggregate a finished replication's rounds.
    pub fn from_rounds(rounds: &[RoundResult], num_firms: usize) -> Self {
        let round_count = rounds.len().max(1) as f64;
        let firms = (0..num_firms)
            .map(|i| {
                let mut total_profit = 0.0;
                let mut quantity_sum = 0.0;
                let mut price_sum = 0.0;
                for round in rounds {
                    if let Some(fr) = round.firms.get(i) {
                        total_profit += fr.profit;
                        quantity_sum += fr.quantity;
                        price_sum += fr.price;
                    }
                }
                FirmSummary {
                    firm: i,
                    total_profit,
                    average_quantity: quantity_sum / round_count,
                    average_price: price_sum / round_count,
                }
            })
            .collect();

        let average_market_price =
            rounds.iter().map(|r| r.average_price()).sum::<f64>() / round_count;

        Self {
            firms,
            average_market_price,
        }
    }
}

/// A finished replication: its rounds plus the aggregate summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationResult {
    /// Replication index (0-based)
    pub replication: usize,

    /// Every round of the replication, in order
    pub rounds: Vec<RoundResult>,

    pub summary: ReplicationSummary,

    pub started_at_ms: u64,
    pub finished_at_ms: u64,
}

/// Whole-game aggregates, computed once at completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub firms: Vec<FirmSummary>,
    pub average_market_price: f64,

    /// Per-firm |average quantity − two-firm Nash quantity|, when the Nash
    /// benchmark exists (linear-demand duopoly)
    pub nash_quantity_deviation: Option<Vec<f64>>,
}

impl GameSummary {
    /// Aggregate a finished game's replications, measuring deviation from
    /// the two-firm Nash benchmark when one exists.
    pub fn from_replications(
        replications: &[ReplicationResult],
        num_firms: usize,
        nash: Option<&crate::models::equilibrium::NashEquilibrium>,
    ) -> Self {
        let all_rounds: Vec<RoundResult> = replications
            .iter()
            .flat_map(|r| r.rounds.iter().cloned())
            .collect();
        let totals = ReplicationSummary::from_rounds(&all_rounds, num_firms);

        let nash_quantity_deviation = nash.map(|nash| {
            let benchmark = [nash.quantity1, nash.quantity2];
            totals
                .firms
                .iter()
                .take(2)
                .zip(benchmark)
                .map(|(summary, q)| (summary.average_quantity - q).abs())
                .collect()
        });

        Self {
            firms: totals.firms,
            average_market_price: totals.average_market_price,
            nash_quantity_deviation,
        }
    }
}
