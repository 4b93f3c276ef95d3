// =============================================================================
// Feature Extractor — continuous market features in log-odds space
// =============================================================================
//
// Derives a fixed set of continuous numeric features from one market
// observation, an optional prior observation, a history window, and a peer
// set. NO thresholds, NO decisions — those live in the signal generator.

use serde::{Deserialize, Serialize};

use crate::market_data::snapshot::MarketObservation;

/// Continuous, numerical features for one market.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Clamped event probability in (1e-6, 1-1e-6).
    pub p_event: f64,
    /// logit(p_event).
    pub log_odds: f64,
    /// Change in log-odds vs the previous observation; 0 without one.
    pub probability_momentum: f64,
    /// Population stdev of log-odds over the history window.
    pub belief_volatility: f64,
    /// Liquidity/volume/spread confidence proxy in [0, 1).
    pub implied_confidence: f64,
    /// Population stdev of log-odds across current + peers.
    pub dispersion: f64,
}

/// Compute the full feature vector for `current`.
///
/// Pure function of its inputs; inputs are defensively clamped and the
/// computation never fails.
pub fn compute_features(
    current: &MarketObservation,
    previous: Option<&MarketObservation>,
    history: &[MarketObservation],
    peers: &[MarketObservation],
) -> FeatureVector {
    let p = clamp_prob(current.mid_price);
    let log_odds = logit(p);

    let momentum = match previous {
        Some(prev) => log_odds - logit(clamp_prob(prev.mid_price)),
        None => 0.0,
    };

    let vol = log_odds_volatility(history);

    let conf = implied_confidence(current.liquidity, current.volume, current.spread);

    let disp = cross_market_dispersion(current, peers);

    FeatureVector {
        p_event: p,
        log_odds,
        probability_momentum: momentum,
        belief_volatility: vol,
        implied_confidence: conf,
        dispersion: disp,
    }
}

// ── math helpers ─────────────────────────────────────────────────────────────

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

/// Clamp a probability into (1e-6, 1-1e-6) so logit stays finite.
pub fn clamp_prob(p: f64) -> f64 {
    p.clamp(1e-6, 1.0 - 1e-6)
}

fn log_odds_volatility(history: &[MarketObservation]) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }
    let vals: Vec<f64> = history
        .iter()
        .map(|h| logit(clamp_prob(h.mid_price)))
        .collect();
    population_stdev(&vals)
}

/// Lightweight confidence proxy: more liquidity/volume and a tighter spread
/// imply higher confidence. A missing spread is penalized (substituted with
/// 0.02) rather than rewarded.
fn implied_confidence(liquidity: f64, volume: f64, spread: f64) -> f64 {
    let eps = 1e-6;
    let spread = if spread <= 0.0 { 0.02 } else { spread };
    let raw = (liquidity.ln_1p() + volume.ln_1p()) / (spread + eps);
    (raw / 10.0).tanh()
}

fn cross_market_dispersion(current: &MarketObservation, peers: &[MarketObservation]) -> f64 {
    if peers.is_empty() {
        return 0.0;
    }
    let mut vals = Vec::with_capacity(peers.len() + 1);
    vals.push(logit(clamp_prob(current.mid_price)));
    for p in peers {
        vals.push(logit(clamp_prob(p.mid_price)));
    }
    population_stdev(&vals)
}

fn population_stdev(vals: &[f64]) -> f64 {
    let mean = vals.iter().sum::<f64>() / vals.len() as f64;
    let sum: f64 = vals.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum / vals.len() as f64).sqrt()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn obs(mid: f64) -> MarketObservation {
        MarketObservation {
            mid_price: mid,
            ..Default::default()
        }
    }

    fn obs_full(mid: f64, liquidity: f64, volume: f64, spread: f64) -> MarketObservation {
        MarketObservation {
            mid_price: mid,
            liquidity,
            volume,
            spread,
            ..Default::default()
        }
    }

    #[test]
    fn clamp_prob_identity_inside_open_interval() {
        for p in [0.001, 0.25, 0.5, 0.75, 0.999] {
            assert!((clamp_prob(p) - p).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn clamp_prob_snaps_to_bounds() {
        assert!((clamp_prob(0.0) - 1e-6).abs() < f64::EPSILON);
        assert!((clamp_prob(-3.0) - 1e-6).abs() < f64::EPSILON);
        assert!((clamp_prob(1.0) - (1.0 - 1e-6)).abs() < f64::EPSILON);
        assert!((clamp_prob(42.0) - (1.0 - 1e-6)).abs() < f64::EPSILON);
    }

    #[test]
    fn logit_zero_at_half_and_monotone() {
        assert!(logit(0.5).abs() < 1e-12);
        let mut prev = f64::NEG_INFINITY;
        for p in [0.01, 0.1, 0.3, 0.5, 0.7, 0.9, 0.99] {
            let l = logit(p);
            assert!(l > prev);
            prev = l;
        }
    }

    #[test]
    fn momentum_zero_without_previous() {
        let f = compute_features(&obs(0.6), None, &[], &[]);
        assert!((f.probability_momentum - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn momentum_is_log_odds_delta() {
        let f = compute_features(&obs(0.6), Some(&obs(0.4)), &[], &[]);
        let expected = logit(0.6) - logit(0.4);
        assert!((f.probability_momentum - expected).abs() < 1e-12);
        assert!(f.probability_momentum > 0.0);
    }

    #[test]
    fn volatility_zero_with_short_history() {
        let f = compute_features(&obs(0.5), None, &[obs(0.5)], &[]);
        assert!((f.belief_volatility - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volatility_zero_for_constant_history() {
        let history = vec![obs(0.5), obs(0.5), obs(0.5)];
        let f = compute_features(&obs(0.5), None, &history, &[]);
        assert!(f.belief_volatility.abs() < 1e-12);
    }

    #[test]
    fn volatility_positive_for_moving_history() {
        let history = vec![obs(0.3), obs(0.5), obs(0.7)];
        let f = compute_features(&obs(0.5), None, &history, &[]);
        assert!(f.belief_volatility > 0.0);
    }

    #[test]
    fn dispersion_zero_without_peers() {
        let f = compute_features(&obs(0.5), None, &[], &[]);
        assert!((f.dispersion - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dispersion_includes_current_market() {
        // Two peers at the same price as current: zero dispersion.
        let f = compute_features(&obs(0.5), None, &[], &[obs(0.5), obs(0.5)]);
        assert!(f.dispersion.abs() < 1e-12);

        // A diverging peer produces positive dispersion.
        let f = compute_features(&obs(0.5), None, &[], &[obs(0.9)]);
        assert!(f.dispersion > 0.0);
    }

    #[test]
    fn implied_confidence_in_unit_range() {
        let f = compute_features(&obs_full(0.5, 3.0, 5.0, 0.2), None, &[], &[]);
        assert!(f.implied_confidence > 0.0);
        assert!(f.implied_confidence < 1.0);
    }

    #[test]
    fn implied_confidence_saturates_on_deep_markets() {
        let f = compute_features(&obs_full(0.5, 10_000.0, 50_000.0, 0.01), None, &[], &[]);
        assert!(f.implied_confidence > 0.99);
        assert!(f.implied_confidence <= 1.0);
    }

    #[test]
    fn missing_spread_penalized_not_rewarded() {
        // With spread=0 the default 0.02 applies; a genuinely tight spread
        // must yield strictly higher confidence than a missing one. Thin
        // liquidity keeps tanh out of its saturated tail so the ordering is
        // observable.
        let missing = compute_features(&obs_full(0.5, 0.2, 0.2, 0.0), None, &[], &[]);
        let tight = compute_features(&obs_full(0.5, 0.2, 0.2, 0.005), None, &[], &[]);
        assert!(tight.implied_confidence > missing.implied_confidence);
    }

    #[test]
    fn zero_mid_price_stays_finite() {
        // Both sides absent => mid 0 => p clamps to 1e-6; nothing blows up.
        let f = compute_features(&obs(0.0), None, &[], &[]);
        assert!((f.p_event - 1e-6).abs() < f64::EPSILON);
        assert!(f.log_odds.is_finite());
        assert!(f.log_odds < 0.0);
    }
}
