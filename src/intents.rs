// =============================================================================
// Intent Output — Canonical result of an intent evaluation
// =============================================================================
//
// The single response shape produced by the reasoning layer. It is
// intentionally generic: `evaluation` is a free-form map for intent-specific
// metrics, and `guardrails` carries flags that are independent of the numeric
// confidence score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ReasonError;

/// The single source of truth for intent evaluation states.
///
/// Every status a rule can assign MUST be a variant here; ruleset validation
/// rejects anything else at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    NotTriggered,
    LowConfidence,
    WeakSignal,
    ModerateSignal,
    StrongSignal,
}

impl IntentStatus {
    /// Parse a status string as it appears in rule files.
    ///
    /// Returns `None` for anything that is not a recognized status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_triggered" => Some(Self::NotTriggered),
            "low_confidence" => Some(Self::LowConfidence),
            "weak_signal" => Some(Self::WeakSignal),
            "moderate_signal" => Some(Self::ModerateSignal),
            "strong_signal" => Some(Self::StrongSignal),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotTriggered => write!(f, "not_triggered"),
            Self::LowConfidence => write!(f, "low_confidence"),
            Self::WeakSignal => write!(f, "weak_signal"),
            Self::ModerateSignal => write!(f, "moderate_signal"),
            Self::StrongSignal => write!(f, "strong_signal"),
        }
    }
}

/// Evaluation metadata: which intent, when, and which engine version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub intent_id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// One input signal reported back with the weight it carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalUsage {
    pub signal_id: String,
    pub value: f64,
    /// Attribution weight in [0, 1].
    pub weight: f64,
}

/// A single numbered step of the reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: usize,
    pub description: String,
}

/// The ordered reasoning trace plus a free-text explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reasoning {
    pub logic: Vec<ReasoningStep>,
    pub explanation: String,
}

/// Flags that gate how the output may be acted upon, independent of the score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guardrails {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub human_confirmation_required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub confidence_capped: bool,
}

/// Canonical response produced by the reasoning layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentOutput {
    pub meta: Meta,
    pub status: IntentStatus,
    /// Aggregate confidence in [0, 1].
    pub confidence: f64,
    pub summary: String,

    pub signals: Vec<SignalUsage>,
    pub reasoning: Reasoning,

    /// Intent-specific metrics, free-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<HashMap<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Guardrails>,
}

impl IntentOutput {
    /// Structural-validity check over a produced output.
    ///
    /// Catches assembly mistakes before the output leaves the process: empty
    /// metadata, out-of-range confidence or weights, missing trace.
    pub fn validate_basic(&self) -> Result<(), ReasonError> {
        if self.meta.intent_id.is_empty() {
            return Err(ReasonError::InvalidOutput(
                "meta.intent_id is required".to_string(),
            ));
        }
        if self.meta.version.is_empty() {
            return Err(ReasonError::InvalidOutput(
                "meta.version is required".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ReasonError::InvalidOutput(format!(
                "confidence out of range: {}",
                self.confidence
            )));
        }
        if self.summary.is_empty() {
            return Err(ReasonError::InvalidOutput("summary is required".to_string()));
        }
        if self.signals.is_empty() {
            return Err(ReasonError::InvalidOutput(
                "signals must be non-empty".to_string(),
            ));
        }
        for (i, s) in self.signals.iter().enumerate() {
            if s.signal_id.is_empty() {
                return Err(ReasonError::InvalidOutput(format!(
                    "signals[{i}].signal_id is required"
                )));
            }
            if !(0.0..=1.0).contains(&s.weight) {
                return Err(ReasonError::InvalidOutput(format!(
                    "signals[{i}].weight out of range: {}",
                    s.weight
                )));
            }
        }
        if self.reasoning.explanation.is_empty() {
            return Err(ReasonError::InvalidOutput(
                "reasoning.explanation is required".to_string(),
            ));
        }
        // The trace can legitimately be a single fallback step, but never empty.
        if self.reasoning.logic.is_empty() {
            return Err(ReasonError::InvalidOutput(
                "reasoning.logic must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}
