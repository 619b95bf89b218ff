//! Polymarket API response types.
//!
//! Two API surfaces:
//! - **Gamma API** (`gamma-api.polymarket.com`) - market metadata lookup
//!   by slug. Uses [`GammaMarket`].
//! - **CLOB API** (`clob.polymarket.com`) - price quotes and order
//!   submission. The quote endpoint answers with [`PriceEnvelope`] on the
//!   happy path and free text otherwise.

use serde::Deserialize;
use tracing::debug;

use crate::domain::{MarketMeta, OutcomeToken};

/// Market metadata from the Gamma API.
///
/// List-valued fields come back as JSON-encoded *strings* (for example
/// `"[\"Yes\", \"No\"]"`); a field that fails to decode logs at debug
/// and yields an empty list rather than failing the whole lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    pub slug: String,
    /// Resolution rules text, later handed to the oracle verbatim.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the market is active.
    #[serde(default)]
    pub active: bool,
    /// Whether the market is closed.
    #[serde(default)]
    pub closed: bool,
    /// JSON-encoded outcome names (e.g., `["Yes", "No"]`).
    #[serde(default)]
    pub outcomes: Option<String>,
    /// JSON-encoded CLOB token IDs, positionally aligned with `outcomes`.
    #[serde(default)]
    pub clob_token_ids: Option<String>,
}

impl GammaMarket {
    /// Parse the JSON-encoded CLOB token IDs.
    pub fn token_ids(&self) -> Vec<String> {
        self.clob_token_ids
            .as_deref()
            .and_then(|s| {
                serde_json::from_str::<Vec<String>>(s)
                    .map_err(|e| {
                        debug!(
                            error = %e,
                            raw = %s,
                            slug = %self.slug,
                            "Failed to parse clob_token_ids"
                        );
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Parse the JSON-encoded outcome names.
    pub fn outcome_names(&self) -> Vec<String> {
        self.outcomes
            .as_deref()
            .and_then(|s| {
                serde_json::from_str::<Vec<String>>(s)
                    .map_err(|e| {
                        debug!(
                            error = %e,
                            raw = %s,
                            slug = %self.slug,
                            "Failed to parse outcomes"
                        );
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Zip outcome names with token IDs into domain metadata. Unequal
    /// lengths truncate to the shorter side; whether the result carries
    /// the tokens a subscription needs is checked at subscription time.
    pub fn into_meta(self) -> MarketMeta {
        let outcomes = self
            .outcome_names()
            .into_iter()
            .zip(self.token_ids())
            .map(|(name, token)| OutcomeToken::new(name, token))
            .collect();
        MarketMeta {
            slug: self.slug,
            description: self.description.unwrap_or_default(),
            outcomes,
        }
    }
}

/// Happy-path body of the CLOB quote endpoint: `{"price": "0.42"}`.
#[derive(Debug, Deserialize)]
pub struct PriceEnvelope {
    pub price: String,
}
