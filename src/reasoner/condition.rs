// =============================================================================
// Condition evaluation
// =============================================================================

use std::collections::HashMap;

use crate::error::ReasonError;
use crate::reasoner::rules::{Condition, ConditionBlock};

/// Evaluate a single condition against the signal snapshot.
///
/// A signal missing from the snapshot is a non-match (`Ok(false)`), not an
/// error. Comparison is plain `f64` comparison; `eq` is exact. An operator
/// that validation did not catch fails the call instead of panicking.
pub fn evaluate_condition(
    cond: &Condition,
    signals: &HashMap<String, f64>,
) -> Result<bool, ReasonError> {
    let value = match signals.get(&cond.signal) {
        Some(v) => *v,
        None => return Ok(false),
    };

    match cond.op.as_str() {
        "gte" => Ok(value >= cond.value),
        "gt" => Ok(value > cond.value),
        "lte" => Ok(value <= cond.value),
        "lt" => Ok(value < cond.value),
        "eq" => Ok(value == cond.value),
        other => Err(ReasonError::UnsupportedOperator(other.to_string())),
    }
}

/// Evaluate a condition block: every `all` condition must hold, and when
/// `any` is non-empty at least one of its conditions must hold.
pub fn evaluate_condition_block(
    block: &ConditionBlock,
    signals: &HashMap<String, f64>,
) -> Result<bool, ReasonError> {
    for cond in &block.all {
        if !evaluate_condition(cond, signals)? {
            return Ok(false);
        }
    }

    if !block.any.is_empty() {
        let mut hit = false;
        for cond in &block.any {
            if evaluate_condition(cond, signals)? {
                hit = true;
                break;
            }
        }
        if !hit {
            return Ok(false);
        }
    }

    Ok(true)
}
