//! Polymarket REST API client.
//!
//! Two API surfaces:
//! - **Gamma API** (`gamma-api.polymarket.com`) - market metadata lookup
//!   by slug, done once per subscription.
//! - **CLOB API** (`clob.polymarket.com`) - sell-side price quotes during
//!   resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::response::{GammaMarket, PriceEnvelope};
use super::settings::PolymarketConfig;
use crate::domain::{MarketMeta, TokenId};
use crate::error::{PriceError, Result};
use crate::port::MarketDataFeed;

/// HTTP client for the Polymarket REST APIs.
pub struct PolymarketClient {
    http: HttpClient,
    gamma_url: String,
    clob_url: String,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl PolymarketClient {
    #[must_use]
    pub fn from_config(config: &PolymarketConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            gamma_url: config.gamma_url.clone(),
            clob_url: config.clob_url.clone(),
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Fetch one market's metadata by slug.
    pub async fn fetch_market(&self, slug: &str) -> Result<MarketMeta> {
        let url = format!("{}/markets/slug/{}", self.gamma_url, slug);
        debug!(url = %url, "Fetching market metadata (Gamma)");

        let market: GammaMarket = self.get_with_retry(&url).await?;
        if market.closed {
            warn!(slug = %slug, "Market is already closed");
        }
        Ok(market.into_meta())
    }

    /// Fetch the current sell-side quote for a token. Returns the body's
    /// `price` field when the response is the usual JSON envelope, and the
    /// raw body text otherwise; the caller's tolerant decimal parse turns
    /// a non-quote body into a captured failure instead of an abort.
    pub async fn sell_price(&self, token: &TokenId) -> Result<String> {
        let url = format!(
            "{}/price?token_id={}&side=SELL",
            self.clob_url,
            token.as_str()
        );
        let body = self
            .get_text_with_retry(&url)
            .await
            .map_err(PriceError::Request)?;

        match serde_json::from_str::<PriceEnvelope>(&body) {
            Ok(envelope) => Ok(envelope.price),
            Err(_) => Ok(body),
        }
    }

    async fn get_with_retry<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let response = self.http.get(url).send().await;
            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let response = match response.error_for_status() {
                Ok(response) => response,
                Err(err) => return Err(err.into()),
            };

            let parsed = response.json::<T>().await;
            match parsed {
                Ok(parsed) => return Ok(parsed),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err.into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    async fn get_text_with_retry(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            let sent = match self.http.get(url).send().await {
                Ok(response) => response.error_for_status(),
                Err(err) => Err(err),
            };

            match sent {
                Ok(response) => return response.text().await,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(err);
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

#[async_trait]
impl MarketDataFeed for PolymarketClient {
    async fn market_by_slug(&self, slug: &str) -> Result<MarketMeta> {
        self.fetch_market(slug).await
    }

    async fn price(&self, token: &TokenId) -> Result<String> {
        self.sell_price(token).await
    }
}
