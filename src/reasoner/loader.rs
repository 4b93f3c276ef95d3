// =============================================================================
// Ruleset loader — YAML file to validated in-memory ruleset
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::reasoner::rules::Ruleset;
use crate::reasoner::validation::validate_rules;

/// Load a ruleset from a YAML file and validate it fail-fast.
///
/// A ruleset that fails any validation check never becomes eligible for
/// evaluation; the caller keeps whatever ruleset was active before.
pub fn load_ruleset(path: impl AsRef<Path>) -> Result<Ruleset> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ruleset from {}", path.display()))?;

    let ruleset: Ruleset = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse ruleset from {}", path.display()))?;

    validate_rules(&ruleset.rules)
        .with_context(|| format!("ruleset {} failed validation", path.display()))?;

    info!(
        path = %path.display(),
        version = %ruleset.version,
        rules = ruleset.rules.len(),
        "ruleset loaded"
    );

    Ok(ruleset)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const VALID_RULESET: &str = r#"
version: v1
rules:
  - id: regime_strong
    intent: interpret.regime_state
    priority: 5
    when:
      all:
        - signal: REGIME_SHIFT
          op: gte
          value: 0.7
    then:
      status: strong_signal
      confidence_boost: 0.3
    explanation: Strong regime shift detected
"#;

    fn write_tmp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_and_validates_yaml_file() {
        let path = write_tmp("kestrel_ruleset_ok.yaml", VALID_RULESET);
        let ruleset = load_ruleset(&path).unwrap();
        assert_eq!(ruleset.version, "v1");
        assert_eq!(ruleset.rules.len(), 1);
    }

    #[test]
    fn rejects_invalid_ruleset_wholesale() {
        let bad = VALID_RULESET.replace("confidence_boost: 0.3", "confidence_boost: 1.5");
        let path = write_tmp("kestrel_ruleset_bad.yaml", &bad);
        assert!(load_ruleset(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_ruleset("/nonexistent/kestrel_rules.yaml").is_err());
    }
}
