// =============================================================================
// Rule engine — per-intent rule matching
// =============================================================================

use std::collections::HashMap;

use crate::error::ReasonError;
use crate::reasoner::condition::evaluate_condition_block;
use crate::reasoner::rules::Rule;

/// Return every rule that is scoped to `intent_id` and whose condition block
/// is satisfied by the signal snapshot.
///
/// Pure filter: no mutation, matched rules keep ruleset iteration order.
/// Precedence is resolved downstream by the reasoner.
pub fn evaluate_rules(
    intent_id: &str,
    signals: &HashMap<String, f64>,
    rules: &[Rule],
) -> Result<Vec<Rule>, ReasonError> {
    let mut matched = Vec::new();

    for rule in rules {
        if rule.intent != intent_id {
            continue;
        }

        if evaluate_condition_block(&rule.when, signals)? {
            matched.push(rule.clone());
        }
    }

    Ok(matched)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoner::rules::{Condition, ConditionBlock, RuleAction};

    fn rule(id: &str, intent: &str, all: Vec<Condition>) -> Rule {
        Rule {
            id: id.to_string(),
            intent: intent.to_string(),
            priority: 0,
            when: ConditionBlock { all, any: vec![] },
            then: RuleAction {
                status: "strong_signal".to_string(),
                confidence_boost: 0.3,
            },
            explanation: String::new(),
        }
    }

    fn cond(signal: &str, op: &str, value: f64) -> Condition {
        Condition {
            signal: signal.to_string(),
            op: op.to_string(),
            value,
        }
    }

    fn snapshot(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn matches_satisfied_rule() {
        let signals = snapshot(&[("REGIME_SHIFT", 0.8), ("PROBABILITY_ACCELERATION", 0.7)]);
        let rules = vec![rule(
            "regime_strong",
            "interpret.regime_state",
            vec![
                cond("REGIME_SHIFT", "gte", 0.7),
                cond("PROBABILITY_ACCELERATION", "gte", 0.6),
            ],
        )];

        let matched = evaluate_rules("interpret.regime_state", &signals, &rules).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "regime_strong");
    }

    #[test]
    fn skips_other_intents() {
        let signals = snapshot(&[("REGIME_SHIFT", 0.8)]);
        let rules = vec![rule(
            "other",
            "interpret.divergence",
            vec![cond("REGIME_SHIFT", "gte", 0.1)],
        )];

        let matched = evaluate_rules("interpret.regime_state", &signals, &rules).unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn preserves_ruleset_order() {
        let signals = snapshot(&[("X", 0.9)]);
        let rules = vec![
            rule("first", "i", vec![cond("X", "gte", 0.5)]),
            rule("second", "i", vec![cond("X", "gte", 0.5)]),
            rule("miss", "i", vec![cond("X", "gte", 0.95)]),
        ];

        let matched = evaluate_rules("i", &signals, &rules).unwrap();
        let ids: Vec<&str> = matched.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn propagates_operator_error() {
        let signals = snapshot(&[("X", 0.9)]);
        let rules = vec![rule("bad", "i", vec![cond("X", "between", 0.5)])];

        let err = evaluate_rules("i", &signals, &rules).unwrap_err();
        assert!(matches!(err, ReasonError::UnsupportedOperator(_)));
    }
}
