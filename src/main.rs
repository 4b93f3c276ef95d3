// =============================================================================
// Kestrel Intent Engine — Main Entry Point
// =============================================================================
//
// Deterministic, explainable intent evaluation for prediction markets:
// market observations → continuous features → named signals → declarative
// rule matching → auditable intent output.
//
// The engine refuses to start with an invalid ruleset: a set that fails
// validation must never become eligible for evaluation.
// =============================================================================

mod api;
mod app_state;
mod config;
mod error;
mod features;
mod intents;
mod market_data;
mod reasoner;
mod scan;
mod signals;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::EngineConfig;
use crate::reasoner::load_ruleset;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Kestrel Intent Engine — starting up");

    let mut config = EngineConfig::load("engine_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        EngineConfig::default()
    });

    // Env overrides for deployment without a config file.
    if let Ok(addr) = std::env::var("KESTREL_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(url) = std::env::var("KESTREL_GAMMA_URL") {
        config.gamma_base_url = url;
    }
    if let Ok(path) = std::env::var("KESTREL_RULESET") {
        config.ruleset_path = path;
    }

    info!(
        bind_addr = %config.bind_addr,
        gamma_base_url = %config.gamma_base_url,
        ruleset = %config.ruleset_path,
        "engine configured"
    );

    // ── 2. Ruleset (fail-fast) ───────────────────────────────────────────
    let ruleset = load_ruleset(&config.ruleset_path)
        .context("refusing to start without a valid ruleset")?;

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, ruleset));

    // ── 4. Market scan loop ──────────────────────────────────────────────
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            scan::run_scan_loop(state).await;
        });
    }

    // ── 5. HTTP API ──────────────────────────────────────────────────────
    let app = api::rest::router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(addr = %bind_addr, "REST API listening");

    axum::serve(listener, app)
        .await
        .context("HTTP server exited")?;

    Ok(())
}
