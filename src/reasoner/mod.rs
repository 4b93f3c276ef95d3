// =============================================================================
// Reasoner Module
// =============================================================================
//
// Declarative reasoning pipeline:
// - Rule data model (versioned rulesets, condition blocks)
// - Condition + rule-engine evaluation
// - Load-time fail-fast validation and the YAML loader
// - The rule-based reasoner (precedence, aggregation, output assembly)

pub mod condition;
pub mod engine;
pub mod loader;
pub mod rule_based;
pub mod rules;
pub mod validation;

pub use loader::load_ruleset;
pub use rule_based::RuleBasedReasoner;
pub use rules::{Condition, ConditionBlock, Rule, RuleAction, Ruleset};
pub use validation::validate_rules;

use serde::{Deserialize, Serialize};

use crate::error::ReasonError;
use crate::intents::IntentOutput;

/// A point-in-time named signal value, normalized to [0, 1].
///
/// Signal ids are expected to be unique within one evaluation call; when a
/// caller duplicates an id the last value wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInput {
    pub signal_id: String,
    pub value: f64,
}

/// The seam between the transport layer and the reasoning core.
pub trait IntentReasoner: Send + Sync {
    fn evaluate(
        &self,
        intent_id: &str,
        params: Option<&serde_json::Value>,
        signals: &[SignalInput],
    ) -> Result<IntentOutput, ReasonError>;
}
