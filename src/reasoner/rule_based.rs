// =============================================================================
// Rule-based reasoner — precedence, aggregation, output assembly
// =============================================================================
//
// Precedence policy (the only one in the engine): matched rules are sorted by
// priority descending with a stable sort, so ties keep ruleset order. The
// status comes from the head of the sorted list; confidence is the sum of
// confidence_boost over ALL matches, clamped to [0, 1]. Zero matches fall
// back to `not_triggered` with confidence 0 — never an error.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::ReasonError;
use crate::intents::{
    Guardrails, IntentOutput, IntentStatus, Meta, Reasoning, ReasoningStep, SignalUsage,
};
use crate::reasoner::engine::evaluate_rules;
use crate::reasoner::rules::Ruleset;
use crate::reasoner::{IntentReasoner, SignalInput};

/// Evaluates intents against an immutable, pre-validated ruleset.
pub struct RuleBasedReasoner {
    version: String,
    ruleset: Arc<Ruleset>,
}

impl RuleBasedReasoner {
    /// Build a reasoner over a validated ruleset.
    ///
    /// The ruleset is shared, never copied: hot reload constructs a new
    /// reasoner around a new `Arc` while in-flight evaluations keep the old.
    pub fn new(version: impl Into<String>, ruleset: Arc<Ruleset>) -> Self {
        Self {
            version: version.into(),
            ruleset,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ruleset(&self) -> &Arc<Ruleset> {
        &self.ruleset
    }
}

impl IntentReasoner for RuleBasedReasoner {
    fn evaluate(
        &self,
        intent_id: &str,
        _params: Option<&serde_json::Value>,
        signals: &[SignalInput],
    ) -> Result<IntentOutput, ReasonError> {
        if intent_id.is_empty() {
            return Err(ReasonError::InvalidInput("intent_id is required".to_string()));
        }
        if signals.is_empty() {
            return Err(ReasonError::InvalidInput("signals are required".to_string()));
        }

        // Normalize the input list into a snapshot map; later duplicates win.
        let mut signal_map: HashMap<String, f64> = HashMap::with_capacity(signals.len());
        for s in signals {
            signal_map.insert(s.signal_id.clone(), s.value);
        }

        let mut matched = evaluate_rules(intent_id, &signal_map, &self.ruleset.rules)?;

        // Stable sort: equal priorities keep ruleset order.
        matched.sort_by(|a, b| b.priority.cmp(&a.priority));

        let status = match matched.first() {
            Some(top) => IntentStatus::parse(&top.then.status).ok_or_else(|| {
                ReasonError::InvalidOutput(format!(
                    "rule '{}' carries unrecognized status '{}'",
                    top.id, top.then.status
                ))
            })?,
            None => IntentStatus::NotTriggered,
        };

        let raw_confidence: f64 = matched.iter().map(|r| r.then.confidence_boost).sum();
        let confidence = raw_confidence.clamp(0.0, 1.0);
        let capped = raw_confidence > 1.0;

        let logic: Vec<ReasoningStep> = matched
            .iter()
            .enumerate()
            .map(|(i, rule)| ReasoningStep {
                step: i + 1,
                description: rule.explanation.clone(),
            })
            .collect();

        debug!(
            intent_id,
            matched = matched.len(),
            status = %status,
            confidence = format!("{:.3}", confidence),
            "intent evaluated"
        );

        Ok(IntentOutput {
            meta: Meta {
                intent_id: intent_id.to_string(),
                timestamp: Utc::now(),
                version: self.version.clone(),
            },
            status,
            confidence,
            summary: "Intent evaluated using the declarative rule engine.".to_string(),
            signals: map_signals(signals),
            reasoning: Reasoning {
                logic,
                explanation: "Declarative rules matched against the current signal snapshot."
                    .to_string(),
            },
            evaluation: None,
            guardrails: Some(Guardrails {
                // The engine never auto-acts.
                human_confirmation_required: true,
                confidence_capped: capped,
            }),
        })
    }
}

/// Report every input signal back with uniform attribution weight.
fn map_signals(inputs: &[SignalInput]) -> Vec<SignalUsage> {
    if inputs.is_empty() {
        return Vec::new();
    }

    let weight = 1.0 / inputs.len() as f64;
    inputs
        .iter()
        .map(|s| SignalUsage {
            signal_id: s.signal_id.clone(),
            value: s.value,
            weight,
        })
        .collect()
}
