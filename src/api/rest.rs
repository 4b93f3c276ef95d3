// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. CORS is configured permissively for
// development; tighten `allowed_origins` in production.
//
// Error mapping: invalid evaluation input and failed ruleset reloads return
// 400 with a JSON error body; an internal invariant breach (an operator that
// slipped past validation) returns 500. The process never aborts on a
// per-call error.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::ReasonError;
use crate::reasoner::{load_ruleset, IntentReasoner, SignalInput};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/intent/evaluate", post(evaluate_intent))
        .route("/api/v1/rules", get(rules))
        .route("/api/v1/rules/reload", post(reload_rules))
        .route("/api/v1/snapshot", get(snapshot))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: String,
    uptime_secs: u64,
    scans_completed: u64,
    ruleset_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_scan_error: Option<String>,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        version: state.config.reasoner_version.clone(),
        uptime_secs: state.uptime_secs(),
        scans_completed: state.scans_completed(),
        ruleset_version: state.current_ruleset().version.clone(),
        last_scan_error: state.last_scan_error.read().clone(),
    };
    Json(resp)
}

// =============================================================================
// Intent evaluation
// =============================================================================

/// Input to the reasoning layer. Intentionally generic: `params` is passed
/// through to the reasoner untouched.
#[derive(Debug, Deserialize)]
pub struct IntentEvaluateRequest {
    pub intent_id: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    #[serde(default)]
    pub signals: Vec<SignalSnapshot>,
}

/// A point-in-time signal value coming from the signal layer.
#[derive(Debug, Deserialize)]
pub struct SignalSnapshot {
    pub signal_id: String,
    /// Expected normalized 0..1.
    pub value: f64,
}

async fn evaluate_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IntentEvaluateRequest>,
) -> impl IntoResponse {
    let signals: Vec<SignalInput> = req
        .signals
        .into_iter()
        .map(|s| SignalInput {
            signal_id: s.signal_id,
            value: s.value,
        })
        .collect();

    let reasoner = state.reasoner();

    match reasoner.evaluate(&req.intent_id, req.params.as_ref(), &signals) {
        Ok(output) => Json(output).into_response(),
        Err(e) => {
            let status = match &e {
                ReasonError::InvalidInput(_) | ReasonError::InvalidRule { .. } => {
                    StatusCode::BAD_REQUEST
                }
                ReasonError::UnsupportedOperator(_) | ReasonError::InvalidOutput(_) => {
                    warn!(error = %e, "evaluation hit an internal invariant");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            let body = serde_json::json!({ "error": e.to_string() });
            (status, Json(body)).into_response()
        }
    }
}

// =============================================================================
// Ruleset introspection + hot reload
// =============================================================================

#[derive(Serialize)]
struct RuleSummary {
    id: String,
    intent: String,
    priority: u32,
    status: String,
    confidence_boost: f64,
    explanation: String,
}

#[derive(Serialize)]
struct RulesResponse {
    version: String,
    rule_count: usize,
    rules: Vec<RuleSummary>,
}

async fn rules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ruleset = state.current_ruleset();

    let summaries = ruleset
        .rules
        .iter()
        .map(|r| RuleSummary {
            id: r.id.clone(),
            intent: r.intent.clone(),
            priority: r.priority,
            status: r.then.status.clone(),
            confidence_boost: r.then.confidence_boost,
            explanation: r.explanation.clone(),
        })
        .collect();

    Json(RulesResponse {
        version: ruleset.version.clone(),
        rule_count: ruleset.rules.len(),
        rules: summaries,
    })
}

async fn reload_rules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match load_ruleset(&state.config.ruleset_path) {
        Ok(ruleset) => {
            let version = ruleset.version.clone();
            let count = ruleset.rules.len();
            state.swap_ruleset(ruleset);
            info!(version = %version, rules = count, "ruleset reloaded via API");

            let body = serde_json::json!({
                "version": version,
                "rule_count": count,
                "message": "ruleset reloaded",
            });
            Json(body).into_response()
        }
        // The active ruleset stays untouched on a failed load.
        Err(e) => {
            warn!(error = %e, "ruleset reload rejected");
            let body = serde_json::json!({ "error": format!("{e:#}") });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

// =============================================================================
// Latest market scan
// =============================================================================

async fn snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let scan = state.latest_scan.read().clone();
    match scan {
        Some(scan) => Json(scan).into_response(),
        None => {
            let body = serde_json::json!({ "error": "no market scan completed yet" });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}
