// =============================================================================
// Ruleset validation — load-time, fail-fast
// =============================================================================
//
// Called once when a ruleset is loaded, before it becomes eligible for
// evaluation. A ruleset that fails any check is rejected wholesale; no
// partially-valid set ever reaches the rule engine.

use crate::error::ReasonError;
use crate::intents::IntentStatus;
use crate::reasoner::rules::{Condition, Rule};

/// Recognized comparison operators, matching the condition evaluator.
const OPERATORS: [&str; 5] = ["gte", "gt", "lte", "lt", "eq"];

/// Validate a full ruleset. Returns the first failing rule as an error that
/// names its index and id.
pub fn validate_rules(rules: &[Rule]) -> Result<(), ReasonError> {
    for (i, rule) in rules.iter().enumerate() {
        validate_rule(rule).map_err(|reason| ReasonError::invalid_rule(i, &rule.id, reason))?;
    }
    Ok(())
}

fn validate_rule(rule: &Rule) -> Result<(), String> {
    if rule.id.is_empty() {
        return Err("id must not be empty".to_string());
    }

    if rule.intent.is_empty() {
        return Err("intent must not be empty".to_string());
    }

    // priority is unsigned, so "must be >= 0" holds by construction.

    if !(0.0..=1.0).contains(&rule.then.confidence_boost) {
        return Err("confidence_boost must be between 0 and 1".to_string());
    }

    if IntentStatus::parse(&rule.then.status).is_none() {
        return Err(format!("invalid status '{}'", rule.then.status));
    }

    if rule.when.all.is_empty() && rule.when.any.is_empty() {
        return Err("rule must define at least one condition in 'all' or 'any'".to_string());
    }

    for c in rule.when.all.iter().chain(rule.when.any.iter()) {
        validate_condition(c)?;
    }

    Ok(())
}

fn validate_condition(c: &Condition) -> Result<(), String> {
    if c.signal.is_empty() {
        return Err("condition signal must not be empty".to_string());
    }

    if !OPERATORS.contains(&c.op.as_str()) {
        return Err(format!("invalid operator '{}'", c.op));
    }

    Ok(())
}
