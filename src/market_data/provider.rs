// =============================================================================
// Gamma Provider Adapter — raw wire models + HTTP fetch
// =============================================================================
//
// Raw models mirror the Gamma API responses and MUST NOT contain business
// logic. Gamma is loose with numeric fields (numbers, numeric strings, empty
// strings, null all appear), so every numeric field goes through `FlexFloat`.

use anyhow::{Context, Result};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// Default page size when the caller passes 0.
const DEFAULT_LIMIT: u32 = 50;

// =============================================================================
// FlexFloat
// =============================================================================

/// An `f64` that deserializes from a JSON number, a numeric string, an empty
/// string, or null (null/empty parse as 0).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlexFloat(pub f64);

impl From<FlexFloat> for f64 {
    fn from(f: FlexFloat) -> Self {
        f.0
    }
}

impl<'de> Deserialize<'de> for FlexFloat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(FlexFloat(0.0)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(FlexFloat)
                .ok_or_else(|| D::Error::custom(format!("invalid number {n}"))),
            serde_json::Value::String(s) => {
                if s.is_empty() {
                    return Ok(FlexFloat(0.0));
                }
                s.trim()
                    .parse::<f64>()
                    .map(FlexFloat)
                    .map_err(|e| D::Error::custom(format!("invalid string-number {s:?}: {e}")))
            }
            other => Err(D::Error::custom(format!(
                "unsupported json value for float: {other}"
            ))),
        }
    }
}

// =============================================================================
// Raw wire models
// =============================================================================

/// An event as returned by the Gamma `/events` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub liquidity: FlexFloat,
    #[serde(default)]
    pub volume: FlexFloat,
    #[serde(default)]
    pub markets: Vec<RawMarket>,
}

/// A market nested inside a raw event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarket {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub condition_id: Option<String>,

    #[serde(default)]
    pub best_bid: FlexFloat,
    #[serde(default)]
    pub best_ask: FlexFloat,
    #[serde(default)]
    pub last_trade_price: FlexFloat,

    // Gamma exposes both numeric and string forms; the *Num fields are the
    // ones worth trusting.
    #[serde(default)]
    pub volume_num: FlexFloat,
    #[serde(default)]
    pub liquidity_num: FlexFloat,

    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// =============================================================================
// GammaClient
// =============================================================================

/// HTTP client for the Gamma market-data API.
#[derive(Clone)]
pub struct GammaClient {
    base_url: String,
    client: reqwest::Client,
}

impl GammaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        let base_url = base_url.into();
        debug!(base_url = %base_url, "GammaClient initialised");

        Self { base_url, client }
    }

    /// GET /events — newest active (non-closed) events, paginated.
    pub async fn fetch_active_events(&self, limit: u32, offset: u32) -> Result<Vec<RawEvent>> {
        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

        let url = format!(
            "{}/events?order=id&ascending=false&closed=false&limit={}&offset={}",
            self.base_url, limit, offset
        );

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", "kestrel-engine/1.0 (gamma-adapter)")
            .send()
            .await
            .context("GET /events request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("gamma api error: status {}", status);
        }

        let events: Vec<RawEvent> = resp
            .json()
            .await
            .context("failed to parse /events response")?;

        debug!(events = events.len(), "fetched active events");
        Ok(events)
    }
}
