//! Polymarket client configuration.

use serde::Deserialize;

/// Gamma and CLOB endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketConfig {
    /// Gamma metadata API base URL.
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    /// CLOB API base URL, used for price quotes and order submission.
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    /// Chain id orders are signed for. 137 is Polygon mainnet, where the
    /// markets this binary watches live.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry attempts for timeouts and connection failures.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Wallet key for signing live orders. Never read from the config
    /// file; `Config::load` fills it from the `WALLET_PRIVATE_KEY`
    /// environment variable.
    #[serde(skip)]
    pub private_key: Option<String>,
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".into()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".into()
}

const fn default_chain_id() -> u64 {
    137
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_retry_max_attempts() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            gamma_url: default_gamma_url(),
            clob_url: default_clob_url(),
            chain_id: default_chain_id(),
            timeout_ms: default_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            private_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_production_endpoints() {
        let config = PolymarketConfig::default();
        assert_eq!(config.gamma_url, "https://gamma-api.polymarket.com");
        assert_eq!(config.clob_url, "https://clob.polymarket.com");
        assert_eq!(config.chain_id, 137);
    }

    #[test]
    fn private_key_never_comes_from_the_file() {
        let config: PolymarketConfig =
            toml::from_str("gamma_url = \"http://localhost:1\"").unwrap();
        assert_eq!(config.gamma_url, "http://localhost:1");
        assert!(config.private_key.is_none());
    }
}
