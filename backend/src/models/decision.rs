//! Firm decisions
//!
//! One decision per firm per round: a quantity under quantity-setting, a
//! price under price-setting. The rationale and prompt audit text come from
//! the decision provider and are kept verbatim for audit — the engine never
//! interprets them.

use serde::{Deserialize, Serialize};

/// A firm's chosen control variable for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmDecision {
    /// Firm index (position in the configuration's firm list)
    pub firm: usize,

    /// Chosen quantity or price, depending on the competition mode
    pub value: f64,

    /// Optional free-text reasoning from the provider
    pub rationale: Option<String>,

    /// Optional record of the inputs that produced the decision
    pub prompt_audit: Option<String>,
}

impl FirmDecision {
    pub fn new(firm: usize, value: f64) -> Self {
        Self {
            firm,
            value,
            rationale: None,
            prompt_audit: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// One message of the pre-decision communication phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationMessage {
    pub firm: usize,
    pub text: String,
}
