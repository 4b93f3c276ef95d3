// =============================================================================
// Market Scan Loop — poll provider, build snapshot, derive signals
// =============================================================================
//
// Background task that keeps the engine's view of the market fresh: fetch
// active events, freeze them into a snapshot, run every market through the
// feature/signal pipeline, and publish the result for the API.
//
// Per-market continuity (previous observation + rolling history window) lives
// in `ScanMemory`, owned by the loop — the reasoning core itself stays pure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::features::{compute_features, FeatureVector};
use crate::market_data::snapshot::{build_snapshot, MarketObservation, SnapshotStats};
use crate::market_data::GammaClient;
use crate::reasoner::SignalInput;
use crate::signals::build_signals;

// =============================================================================
// Scan result types
// =============================================================================

/// Feature/signal readout for one market in one scan.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSignalPreview {
    pub event_id: String,
    pub market_id: String,
    pub mid_price: f64,
    pub features: FeatureVector,
    pub signals: Vec<SignalInput>,
}

/// Published result of one scan pass.
#[derive(Debug, Clone, Serialize)]
pub struct MarketScan {
    pub snapshot_id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub stats: SnapshotStats,
    pub markets: Vec<MarketSignalPreview>,
}

// =============================================================================
// ScanMemory — per-market continuity across scans
// =============================================================================

/// Rolling per-market observation windows. The most recent entry doubles as
/// the "previous" observation for momentum.
struct ScanMemory {
    history: HashMap<String, Vec<MarketObservation>>,
    window: usize,
}

impl ScanMemory {
    fn new(window: usize) -> Self {
        Self {
            history: HashMap::new(),
            window: window.max(2),
        }
    }

    fn previous(&self, market_id: &str) -> Option<&MarketObservation> {
        self.history.get(market_id).and_then(|h| h.last())
    }

    fn window_for(&self, market_id: &str) -> &[MarketObservation] {
        self.history
            .get(market_id)
            .map(|h| h.as_slice())
            .unwrap_or(&[])
    }

    fn record(&mut self, obs: &MarketObservation) {
        let entry = self.history.entry(obs.market_id.clone()).or_default();
        entry.push(obs.clone());
        if entry.len() > self.window {
            entry.remove(0);
        }
    }
}

// =============================================================================
// Loop + single pass
// =============================================================================

/// Run the scan loop forever. Provider failures are logged and the loop
/// carries on; there is no retry beyond the next tick.
pub async fn run_scan_loop(state: Arc<AppState>) {
    let client = GammaClient::new(state.config.gamma_base_url.clone());
    let mut memory = ScanMemory::new(state.config.history_window);

    let mut interval = tokio::time::interval(Duration::from_secs(state.config.scan_interval_secs));

    loop {
        interval.tick().await;

        match scan_once(&state, &client, &mut memory).await {
            Ok(scan) => {
                let active: usize = scan.markets.iter().map(|m| m.signals.len()).sum();
                info!(
                    snapshot_id = %scan.snapshot_id,
                    events = scan.stats.total_events,
                    markets = scan.markets.len(),
                    active_signals = active,
                    "market scan complete"
                );
                state.record_scan(scan);
            }
            Err(e) => {
                warn!(error = %e, "market scan failed");
                state.record_scan_error(e.to_string());
            }
        }
    }
}

async fn scan_once(
    state: &AppState,
    client: &GammaClient,
    memory: &mut ScanMemory,
) -> Result<MarketScan> {
    let events = client
        .fetch_active_events(state.config.scan_event_limit, 0)
        .await?;

    let snapshot = build_snapshot(events);

    // Flattened view for peer selection across all events.
    let all: Vec<MarketObservation> = snapshot
        .events
        .iter()
        .flat_map(|e| e.markets.iter().cloned())
        .collect();

    let mut previews = Vec::new();

    'events: for event in &snapshot.events {
        for obs in &event.markets {
            if previews.len() >= state.config.scan_max_markets {
                break 'events;
            }

            let peers = pick_peers(&all, &obs.market_id, state.config.scan_peer_count);

            let features = compute_features(
                obs,
                memory.previous(&obs.market_id),
                memory.window_for(&obs.market_id),
                &peers,
            );
            let signals = build_signals(&features);

            if obs.mid_price <= 0.0 {
                debug!(
                    market_id = %obs.market_id,
                    "mid price is 0 (bid/ask missing?); features degrade to the clamp floor"
                );
            }

            if !signals.is_empty() {
                debug!(
                    market_id = %obs.market_id,
                    signals = signals.len(),
                    p_event = format!("{:.4}", features.p_event),
                    "signals active"
                );
            }

            previews.push(MarketSignalPreview {
                event_id: event.event_id.clone(),
                market_id: obs.market_id.clone(),
                mid_price: obs.mid_price,
                features,
                signals,
            });

            memory.record(obs);
        }
    }

    Ok(MarketScan {
        snapshot_id: snapshot.snapshot_id,
        timestamp: snapshot.timestamp,
        source: snapshot.source,
        stats: snapshot.stats,
        markets: previews,
    })
}

/// Pick up to `n` peers with the highest liquidity, excluding the market
/// itself. Peer choice by liquidity is a pragmatic default until markets are
/// grouped by topic.
fn pick_peers(all: &[MarketObservation], exclude_market_id: &str, n: usize) -> Vec<MarketObservation> {
    let mut rows: Vec<&MarketObservation> = all
        .iter()
        .filter(|m| m.market_id != exclude_market_id)
        .collect();

    rows.sort_by(|a, b| {
        b.liquidity
            .partial_cmp(&a.liquidity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    rows.into_iter().take(n).cloned().collect()
}
