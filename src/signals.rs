// =============================================================================
// Signal Generator — continuous features to named signals
// =============================================================================
//
// Maps the continuous feature vector into discrete named signals, each
// normalized to [0, 1] and emitted only when it crosses its activation
// threshold (strict `>`; a value exactly at the threshold stays silent).
// Thresholds and squash scales are contractual constants.

use crate::features::FeatureVector;
use crate::reasoner::SignalInput;

pub const PROBABILITY_ACCELERATION: &str = "PROBABILITY_ACCELERATION";
pub const CONVICTION_SPIKE: &str = "CONVICTION_SPIKE";
pub const DIVERGENCE_ALERT: &str = "DIVERGENCE_ALERT";
pub const LOW_CONFIDENCE_MOVE: &str = "LOW_CONFIDENCE_MOVE";
pub const REGIME_SHIFT: &str = "REGIME_SHIFT";

/// Build the active signal set for a feature vector.
///
/// Order-stable, at most one entry per signal kind.
pub fn build_signals(f: &FeatureVector) -> Vec<SignalInput> {
    let mut out = Vec::new();

    // 1) PROBABILITY_ACCELERATION
    // Momentum lives in log-odds space; squash it into [0, 1] with large
    // positive momentum approaching 1.
    let accel = squash_signed(f.probability_momentum, 0.35);
    if accel > 0.60 {
        out.push(SignalInput {
            signal_id: PROBABILITY_ACCELERATION.to_string(),
            value: accel,
        });
    }

    // 2) CONVICTION_SPIKE — implied confidence is already ~[0, 1].
    if f.implied_confidence > 0.60 {
        out.push(SignalInput {
            signal_id: CONVICTION_SPIKE.to_string(),
            value: clamp01(f.implied_confidence),
        });
    }

    // 3) DIVERGENCE_ALERT — stdev of log-odds across peers, squashed.
    let div = squash_positive(f.dispersion, 0.8);
    if div > 0.55 {
        out.push(SignalInput {
            signal_id: DIVERGENCE_ALERT.to_string(),
            value: div,
        });
    }

    // 4) LOW_CONFIDENCE_MOVE — high acceleration while confidence is low.
    let low_conf_move = accel * (1.0 - clamp01(f.implied_confidence));
    if low_conf_move > 0.55 {
        out.push(SignalInput {
            signal_id: LOW_CONFIDENCE_MOVE.to_string(),
            value: clamp01(low_conf_move),
        });
    }

    // 5) REGIME_SHIFT — composite: strong acceleration + decent confidence +
    // stable belief (low volatility).
    let vol_penalty = 1.0 - squash_positive(f.belief_volatility, 1.2);
    let regime = clamp01(0.45 * accel + 0.35 * clamp01(f.implied_confidence) + 0.20 * vol_penalty);
    if regime > 0.60 {
        out.push(SignalInput {
            signal_id: REGIME_SHIFT.to_string(),
            value: regime,
        });
    }

    out
}

// ── squash helpers ───────────────────────────────────────────────────────────

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Map x >= 0 roughly into [0, 1] via tanh(x/scale).
pub fn squash_positive(x: f64, scale: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let scale = if scale <= 0.0 { 1.0 } else { scale };
    clamp01((x / scale).tanh())
}

/// Map signed values into [0, 1] centered at 0: positive above 0.5,
/// negative below.
pub fn squash_signed(x: f64, scale: f64) -> f64 {
    let scale = if scale <= 0.0 { 1.0 } else { scale };
    clamp01(0.5 * (1.0 + (x / scale).tanh()))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector::default()
    }

    fn ids(signals: &[SignalInput]) -> Vec<&str> {
        signals.iter().map(|s| s.signal_id.as_str()).collect()
    }

    #[test]
    fn squash_signed_centered_at_half() {
        assert!((squash_signed(0.0, 0.35) - 0.5).abs() < 1e-12);
        assert!(squash_signed(1.0, 0.35) > 0.5);
        assert!(squash_signed(-1.0, 0.35) < 0.5);
    }

    #[test]
    fn squash_signed_symmetry() {
        let up = squash_signed(0.7, 0.35);
        let down = squash_signed(-0.7, 0.35);
        assert!((up + down - 1.0).abs() < 1e-12);
    }

    #[test]
    fn squash_positive_floor_at_zero() {
        assert!((squash_positive(0.0, 0.8) - 0.0).abs() < f64::EPSILON);
        assert!((squash_positive(-5.0, 0.8) - 0.0).abs() < f64::EPSILON);
        assert!(squash_positive(0.5, 0.8) > 0.0);
    }

    #[test]
    fn squash_helpers_substitute_unit_scale() {
        assert!((squash_positive(0.5, 0.0) - 0.5_f64.tanh()).abs() < 1e-12);
        assert!((squash_signed(0.5, -1.0) - 0.5 * (1.0 + 0.5_f64.tanh())).abs() < 1e-12);
    }

    #[test]
    fn quiet_features_emit_nothing() {
        assert!(build_signals(&features()).is_empty());
    }

    #[test]
    fn acceleration_activates_above_threshold() {
        let mut f = features();
        // squash_signed(0.35, 0.35) = 0.5*(1+tanh(1)) ≈ 0.8808 > 0.60
        f.probability_momentum = 0.35;
        let signals = build_signals(&f);
        assert!(ids(&signals).contains(&PROBABILITY_ACCELERATION));
        let accel = &signals[0];
        assert!((accel.value - 0.5 * (1.0 + 1.0_f64.tanh())).abs() < 1e-12);
    }

    #[test]
    fn conviction_boundary_does_not_activate() {
        let mut f = features();
        // High volatility keeps the regime composite quiet so only the
        // conviction threshold is in play.
        f.belief_volatility = 5.0;

        f.implied_confidence = 0.60;
        assert!(build_signals(&f).is_empty());

        f.implied_confidence = 0.600001;
        let signals = build_signals(&f);
        assert_eq!(ids(&signals), vec![CONVICTION_SPIKE]);
    }

    #[test]
    fn divergence_activates_on_high_dispersion() {
        let mut f = features();
        // tanh(1.2/0.8) = tanh(1.5) ≈ 0.905 > 0.55
        f.dispersion = 1.2;
        let signals = build_signals(&f);
        assert_eq!(ids(&signals), vec![DIVERGENCE_ALERT]);
        assert!((signals[0].value - (1.5_f64).tanh()).abs() < 1e-12);
    }

    #[test]
    fn low_confidence_move_needs_accel_without_conviction() {
        let mut f = features();
        // Strong momentum, zero confidence: accel ≈ 0.982, lcm = accel.
        f.probability_momentum = 0.7;
        f.implied_confidence = 0.0;
        let signals = build_signals(&f);
        let id_list = ids(&signals);
        assert!(id_list.contains(&LOW_CONFIDENCE_MOVE));

        // Same momentum with high confidence suppresses the signal.
        f.implied_confidence = 0.9;
        let signals = build_signals(&f);
        assert!(!ids(&signals).contains(&LOW_CONFIDENCE_MOVE));
    }

    #[test]
    fn regime_shift_composite() {
        let mut f = features();
        f.probability_momentum = 0.7; // accel ≈ 0.982
        f.implied_confidence = 0.8;
        f.belief_volatility = 0.0; // vol penalty term contributes full 0.20

        let signals = build_signals(&f);
        let id_list = ids(&signals);
        assert!(id_list.contains(&REGIME_SHIFT));

        let accel = squash_signed(0.7, 0.35);
        let expected = clamp01(0.45 * accel + 0.35 * 0.8 + 0.20 * 1.0);
        let regime = signals
            .iter()
            .find(|s| s.signal_id == REGIME_SHIFT)
            .unwrap();
        assert!((regime.value - expected).abs() < 1e-12);
    }

    #[test]
    fn high_volatility_dampens_regime_shift() {
        let mut f = features();
        f.probability_momentum = 0.2; // accel ≈ 0.758
        f.implied_confidence = 0.62;
        f.belief_volatility = 0.0;
        let calm = build_signals(&f);
        assert!(ids(&calm).contains(&REGIME_SHIFT));

        f.belief_volatility = 5.0; // vol penalty ≈ 0 → composite drops below 0.60
        let noisy = build_signals(&f);
        assert!(!ids(&noisy).contains(&REGIME_SHIFT));
    }

    #[test]
    fn output_order_is_stable() {
        let mut f = features();
        f.probability_momentum = 0.7;
        f.implied_confidence = 0.8;
        f.dispersion = 1.5;
        f.belief_volatility = 0.0;

        let signals = build_signals(&f);
        assert_eq!(
            ids(&signals),
            vec![
                PROBABILITY_ACCELERATION,
                CONVICTION_SPIKE,
                DIVERGENCE_ALERT,
                REGIME_SHIFT,
            ]
        );
    }
}
