// =============================================================================
// Market Data Module
// =============================================================================
//
// Provider-facing side of the engine:
// - Raw Gamma wire models and the polling HTTP client
// - Snapshot building: raw events → normalized observations + stats

pub mod provider;
pub mod snapshot;

pub use provider::{GammaClient, RawEvent, RawMarket};
pub use snapshot::{build_snapshot, MarketObservation, MarketSnapshot};
