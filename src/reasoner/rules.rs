// =============================================================================
// Declarative rule data model
// =============================================================================
//
// Rules are loaded once (YAML), validated fail-fast, and are read-only for the
// rest of the process lifetime. Hot reload swaps in a whole new validated
// `Ruleset`; nothing here is ever mutated in place.

use serde::{Deserialize, Serialize};

/// A versioned collection of declarative rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A single declarative rule evaluated by the rule engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,

    /// Intent this rule is scoped to. Only rules whose intent equals the
    /// requested intent are candidates for matching.
    pub intent: String,

    /// Precedence among matching rules; higher wins.
    #[serde(default)]
    pub priority: u32,

    pub when: ConditionBlock,
    pub then: RuleAction,

    /// Human-readable text emitted into the reasoning trace on match.
    #[serde(default)]
    pub explanation: String,
}

/// Logical grouping of conditions:
/// every `all` condition must match, and when `any` is non-empty at least one
/// of its conditions must match. Both lists may coexist; both must pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionBlock {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any: Vec<Condition>,
}

/// A single signal comparison.
///
/// `op` is one of `gte`, `gt`, `lte`, `lt`, `eq`; anything else is rejected
/// at ruleset-validation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub signal: String,
    pub op: String,
    pub value: f64,
}

/// The effect of a rule when matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleAction {
    /// Status string; must parse to a recognized `IntentStatus`.
    pub status: String,
    /// Contribution to the aggregate confidence, in [0, 1].
    #[serde(default)]
    pub confidence_boost: f64,
}
