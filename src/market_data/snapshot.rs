// =============================================================================
// Market Snapshot — frozen, normalized view of the provider at time T
// =============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::market_data::provider::RawEvent;

/// Source label stamped on every snapshot built from the Gamma adapter.
const SOURCE_GAMMA: &str = "polymarket-gamma";

/// A market considered "extreme" when its bid is below this bound...
const EXTREME_BID_BELOW: f64 = 0.05;
/// ...or its ask is above this one.
const EXTREME_ASK_ABOVE: f64 = 0.95;

/// Normalized per-market record consumed by the feature pipeline.
///
/// Mid price is 0 when both bid and ask are absent, and collapses to the
/// known side when only one exists. Spread is only defined when both sides
/// are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketObservation {
    pub market_id: String,
    pub slug: String,
    pub condition_id: String,

    pub best_bid: f64,
    pub best_ask: f64,
    pub mid_price: f64,
    pub spread: f64,

    pub liquidity: f64,
    pub volume: f64,

    pub last_trade: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One event's group of normalized markets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventObservation {
    pub event_id: String,
    pub slug: String,
    pub title: String,
    pub end_date: Option<DateTime<Utc>>,

    pub liquidity: f64,
    pub volume: f64,

    pub markets: Vec<MarketObservation>,
}

/// Aggregate statistics over one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub total_events: usize,
    pub total_markets: usize,
    pub avg_liquidity: f64,
    pub avg_spread: f64,
    pub extreme_markets: usize,
}

/// Frozen view of the provider at time T.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub snapshot_id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,

    pub events: Vec<EventObservation>,
    pub stats: SnapshotStats,
}

/// Convert raw Gamma events into a normalized snapshot.
pub fn build_snapshot(events: Vec<RawEvent>) -> MarketSnapshot {
    let now = Utc::now();

    let mut event_obs = Vec::with_capacity(events.len());
    let mut total_liquidity = 0.0;
    let mut total_spread = 0.0;
    let mut total_markets = 0usize;
    let mut extreme_count = 0usize;

    for e in events {
        let mut eo = EventObservation {
            event_id: e.id,
            slug: e.slug.unwrap_or_default(),
            title: e.title.unwrap_or_default(),
            end_date: e.end_date.as_deref().and_then(parse_rfc3339),
            liquidity: e.liquidity.into(),
            volume: e.volume.into(),
            markets: Vec::with_capacity(e.markets.len()),
        };

        for m in e.markets {
            let mut obs = MarketObservation {
                market_id: m.id,
                slug: m.slug.unwrap_or_default(),
                condition_id: m.condition_id.unwrap_or_default(),
                best_bid: m.best_bid.into(),
                best_ask: m.best_ask.into(),
                liquidity: m.liquidity_num.into(),
                volume: m.volume_num.into(),
                last_trade: m.last_trade_price.into(),
                updated_at: m.updated_at.as_deref().and_then(parse_rfc3339),
                ..Default::default()
            };

            // Mid price + spread: collapse to the known side when one is
            // missing; both missing leaves mid at 0.
            if obs.best_bid > 0.0 || obs.best_ask > 0.0 {
                if obs.best_bid > 0.0 && obs.best_ask > 0.0 {
                    obs.mid_price = (obs.best_bid + obs.best_ask) / 2.0;
                    obs.spread = obs.best_ask - obs.best_bid;
                    total_spread += obs.spread;
                } else if obs.best_bid > 0.0 {
                    obs.mid_price = obs.best_bid;
                } else {
                    obs.mid_price = obs.best_ask;
                }
            }

            if (obs.best_bid > 0.0 && obs.best_bid < EXTREME_BID_BELOW)
                || obs.best_ask > EXTREME_ASK_ABOVE
            {
                extreme_count += 1;
            }

            total_liquidity += obs.liquidity;
            total_markets += 1;

            eo.markets.push(obs);
        }

        event_obs.push(eo);
    }

    let mut stats = SnapshotStats {
        total_events: event_obs.len(),
        total_markets,
        extreme_markets: extreme_count,
        ..Default::default()
    };
    if total_markets > 0 {
        stats.avg_liquidity = total_liquidity / total_markets as f64;
        // Average only meaningful over markets where a spread exists.
        if total_spread > 0.0 {
            stats.avg_spread = total_spread / total_markets as f64;
        }
    }

    let mut snapshot = MarketSnapshot {
        snapshot_id: String::new(),
        timestamp: now,
        source: SOURCE_GAMMA.to_string(),
        events: event_obs,
        stats,
    };
    snapshot.snapshot_id = compute_snapshot_id(&snapshot);

    snapshot
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Deterministic content hash of a snapshot: SHA-256 over source, timestamp,
/// and (event id, market id, mid price) rows sorted by event then market id.
/// Truncated to 16 hex chars.
fn compute_snapshot_id(s: &MarketSnapshot) -> String {
    let mut rows: Vec<(&str, &str, f64)> = Vec::new();
    for e in &s.events {
        for m in &e.markets {
            rows.push((e.event_id.as_str(), m.market_id.as_str(), m.mid_price));
        }
    }
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(b.1)));

    let mut hasher = Sha256::new();
    hasher.update(s.source.as_bytes());
    hasher.update(
        s.timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );

    for (eid, mid, p) in rows {
        hasher.update(eid.as_bytes());
        hasher.update(mid.as_bytes());
        hasher.update(format!("{p:.6}").as_bytes());
    }

    hex::encode(hasher.finalize())[..16].to_string()
}
