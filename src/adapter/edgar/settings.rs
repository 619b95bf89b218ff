//! EDGAR client configuration.

use serde::Deserialize;

/// EDGAR feed and directory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgarConfig {
    /// Latest-filings Atom feed URL.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Company ticker directory URL.
    #[serde(default = "default_tickers_url")]
    pub tickers_url: String,
    /// User-Agent sent with every request. EDGAR's fair-use policy
    /// requires a contact string; requests without one get blocked.
    #[serde(default)]
    pub user_agent: String,
    /// Minimum spacing between any two EDGAR requests. The poll loop has
    /// no sleep of its own; this is the system's pacing.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry attempts for timeouts and connection failures.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff between retries.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_feed_url() -> String {
    "https://www.sec.gov/cgi-bin/browse-edgar?action=getcurrent&type=&company=&dateb=&owner=include&count=40&output=atom".into()
}

fn default_tickers_url() -> String {
    "https://www.sec.gov/files/company_tickers.json".into()
}

/// Just under nine requests per second, EDGAR's fair-use ceiling.
const fn default_min_interval_ms() -> u64 {
    112
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

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            tickers_url: default_tickers_url(),
            user_agent: String::new(),
            min_interval_ms: default_min_interval_ms(),
            timeout_ms: default_timeout_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}
