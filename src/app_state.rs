// =============================================================================
// Central Application State — Kestrel Intent Engine
// =============================================================================
//
// Ties the engine's shared pieces together for the API and the scan loop.
//
// Thread safety:
//   - The active ruleset is an `Arc<Ruleset>` behind a parking_lot RwLock.
//     Hot reload swaps the Arc; in-flight evaluations keep the Arc they
//     already cloned and never observe a partially-updated set.
//   - Atomic counter for scan tracking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::info;

use crate::config::EngineConfig;
use crate::reasoner::{RuleBasedReasoner, Ruleset};
use crate::scan::MarketScan;

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    pub config: EngineConfig,

    /// The active, validated ruleset. Swapped atomically on reload.
    ruleset: RwLock<Arc<Ruleset>>,

    /// Number of completed market scans.
    pub scan_count: AtomicU64,

    /// Most recent scan failure, if any.
    pub last_scan_error: RwLock<Option<String>>,

    /// Latest published scan result.
    pub latest_scan: RwLock<Option<MarketScan>>,

    /// Engine start instant, for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Construct state around a config and an already-validated ruleset.
    pub fn new(config: EngineConfig, ruleset: Ruleset) -> Self {
        Self {
            config,
            ruleset: RwLock::new(Arc::new(ruleset)),
            scan_count: AtomicU64::new(0),
            last_scan_error: RwLock::new(None),
            latest_scan: RwLock::new(None),
            start_time: Instant::now(),
        }
    }

    /// Clone a handle to the active ruleset.
    pub fn current_ruleset(&self) -> Arc<Ruleset> {
        self.ruleset.read().clone()
    }

    /// Publish a new, fully-validated ruleset.
    ///
    /// Callers must validate before swapping; this method assumes the set is
    /// good and replaces the handle in one write.
    pub fn swap_ruleset(&self, ruleset: Ruleset) {
        info!(
            version = %ruleset.version,
            rules = ruleset.rules.len(),
            "ruleset swapped"
        );
        *self.ruleset.write() = Arc::new(ruleset);
    }

    /// Build a reasoner over the active ruleset.
    ///
    /// Cheap: a version-string clone plus an Arc clone. Each call pins the
    /// ruleset that was active at that moment.
    pub fn reasoner(&self) -> RuleBasedReasoner {
        RuleBasedReasoner::new(self.config.reasoner_version.clone(), self.current_ruleset())
    }

    /// Publish the result of a completed scan.
    pub fn record_scan(&self, scan: MarketScan) {
        *self.latest_scan.write() = Some(scan);
        *self.last_scan_error.write() = None;
        self.scan_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a failed scan without touching the last good result.
    pub fn record_scan_error(&self, message: String) {
        *self.last_scan_error.write() = Some(message);
    }

    pub fn scans_completed(&self) -> u64 {
        self.scan_count.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
