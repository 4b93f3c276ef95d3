// =============================================================================
// Core error taxonomy for the reasoning engine
// =============================================================================
//
// Two tiers of failure live in this crate: typed `ReasonError` values for the
// reasoning core (returned to API callers with a meaningful status code), and
// `anyhow` errors at the I/O edges (config files, provider HTTP). Only the
// typed tier lives here.

use thiserror::Error;

/// Errors produced by the reasoning core.
#[derive(Debug, Error)]
pub enum ReasonError {
    /// The evaluation request itself is malformed (empty intent id, empty
    /// signal list). The caller receives this per call; no output is produced.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A rule failed load-time validation. The whole ruleset is rejected.
    #[error("rule[{index}] ({id}): {reason}")]
    InvalidRule {
        index: usize,
        id: String,
        reason: String,
    },

    /// An operator slipped past validation and reached the evaluator.
    /// Fails the evaluation call instead of aborting the process.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A produced intent output failed its structural-validity check.
    #[error("invalid output: {0}")]
    InvalidOutput(String),
}

impl ReasonError {
    /// Shorthand for an [`ReasonError::InvalidRule`] with a formatted reason.
    pub fn invalid_rule(index: usize, id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            index,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
