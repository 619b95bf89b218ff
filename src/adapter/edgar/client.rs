//! SEC EDGAR HTTP client.
//!
//! Three surfaces, all paced by one shared rate limiter:
//! - the latest-filings Atom feed (the poll loop's data source),
//! - the company ticker directory (`company_tickers.json`),
//! - filing directory listings, for locating the filing's documents.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::settings::EdgarConfig;
use crate::domain::{Cik, Filing};
use crate::error::{FeedError, Result};
use crate::port::{FilingFeed, TickerDirectory};

/// HTTP client for SEC EDGAR.
///
/// Every request flows through [`EdgarClient::throttle`], which enforces a
/// minimum interval between any two calls across all users of the client.
pub struct EdgarClient {
    http: HttpClient,
    feed_url: String,
    tickers_url: String,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
    tickers: OnceCell<HashMap<String, Cik>>,
    retry_max_attempts: u32,
    retry_backoff_ms: u64,
}

impl EdgarClient {
    #[must_use]
    pub fn from_config(config: &EdgarConfig) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            feed_url: config.feed_url.clone(),
            tickers_url: config.tickers_url.clone(),
            min_interval: Duration::from_millis(config.min_interval_ms),
            last_call: Mutex::new(None),
            tickers: OnceCell::new(),
            retry_max_attempts: config.retry_max_attempts,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Fetch and parse the current feed state.
    pub async fn latest_filings(&self) -> Result<Vec<Filing>> {
        let xml = self.get_text_with_retry(&self.feed_url).await?;
        let filings = parse_feed(&xml)?;
        debug!(count = filings.len(), "fetched filings feed");
        Ok(filings)
    }

    /// `.htm` document URLs inside a filing directory, excluding the
    /// `R<n>.htm` viewer artifacts, absolutized against the directory.
    pub async fn document_urls(&self, directory_url: &str) -> Result<Vec<String>> {
        let page = self.get_text_with_retry(directory_url).await?;
        extract_document_urls(directory_url, &page)
    }

    /// Fetch one document body.
    pub async fn document(&self, url: &str) -> Result<String> {
        self.get_text_with_retry(url).await
    }

    async fn ticker_map(&self) -> Result<&HashMap<String, Cik>> {
        self.tickers
            .get_or_try_init(|| async {
                let body = self.get_text_with_retry(&self.tickers_url).await?;
                let map = parse_ticker_directory(&body)?;
                debug!(companies = map.len(), "loaded company ticker directory");
                Ok(map)
            })
            .await
    }

    /// Fair-use pacing: at most one request per `min_interval`, serialized
    /// across callers. Holding the lock through the sleep is what spaces
    /// concurrent callers out.
    async fn throttle(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_text_with_retry(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        let max_attempts = self.retry_max_attempts.max(1);

        loop {
            attempt += 1;
            self.throttle().await;
            let response = match self.http.get(url).send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(FeedError::Request(err).into());
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status {
                    status: status.as_u16(),
                }
                .into());
            }

            match response.text().await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(FeedError::Request(err).into());
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
            "EDGAR request failed, retrying"
        );
        if self.retry_backoff_ms > 0 {
            sleep(Duration::from_millis(self.retry_backoff_ms)).await;
        }
    }
}

#[async_trait]
impl FilingFeed for EdgarClient {
    async fn poll(&self) -> Result<Vec<Filing>> {
        self.latest_filings().await
    }
}

#[async_trait]
impl TickerDirectory for EdgarClient {
    async fn cik_for_ticker(&self, ticker: &str) -> Result<Option<Cik>> {
        let map = self.ticker_map().await?;
        Ok(map.get(&ticker.to_ascii_uppercase()).cloned())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// One record of `company_tickers.json`, which maps arbitrary string keys
/// to `{cik_str, ticker, title}` objects.
#[derive(Debug, Deserialize)]
struct TickerRecord {
    cik_str: u64,
    ticker: String,
}

fn malformed(what: impl std::fmt::Display) -> FeedError {
    FeedError::Malformed(what.to_string())
}

/// Pull title/href/updated triples out of the Atom feed. Entries missing
/// any of the three are skipped, not fatal.
fn parse_feed(xml: &str) -> Result<Vec<Filing>> {
    let entry_re = Regex::new(r"(?s)<entry>(.*?)</entry>").map_err(malformed)?;
    let title_re = Regex::new(r"(?s)<title>(.*?)</title>").map_err(malformed)?;
    let link_re = Regex::new(r#"<link[^>]*href="([^"]+)""#).map_err(malformed)?;
    let updated_re = Regex::new(r"<updated>([^<]+)</updated>").map_err(malformed)?;

    let mut filings = Vec::new();
    for entry in entry_re.captures_iter(xml) {
        let body = &entry[1];
        let title = title_re.captures(body).map(|c| c[1].trim().to_string());
        let href = link_re.captures(body).map(|c| c[1].to_string());
        let updated = updated_re.captures(body).map(|c| c[1].trim().to_string());
        match (title, href, updated) {
            (Some(title), Some(href), Some(updated)) => {
                filings.push(Filing::new(title, href, updated));
            }
            _ => {
                debug!("feed entry missing title, link or updated, skipping");
            }
        }
    }
    Ok(filings)
}

fn parse_ticker_directory(json: &str) -> Result<HashMap<String, Cik>> {
    let records: HashMap<String, TickerRecord> =
        serde_json::from_str(json).map_err(malformed)?;
    Ok(records
        .into_values()
        .map(|r| (r.ticker.to_ascii_uppercase(), Cik::new(r.cik_str.to_string())))
        .collect())
}

fn extract_document_urls(directory_url: &str, page: &str) -> Result<Vec<String>> {
    let href_re = Regex::new(r#"href="([^"]+\.htm)""#).map_err(malformed)?;
    let viewer_re = Regex::new(r"R\d+\.htm$").map_err(malformed)?;
    let base = url::Url::parse(directory_url)?;

    let mut urls = Vec::new();
    for capture in href_re.captures_iter(page) {
        let href = &capture[1];
        if viewer_re.is_match(href) {
            continue;
        }
        let Ok(absolute) = base.join(href) else {
            continue;
        };
        let absolute = absolute.to_string();
        if !urls.contains(&absolute) {
            urls.push(absolute);
        }
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="ISO-8859-1" ?>
<feed xmlns="http://www.w3.org/2005/Atom">
<title>Latest Filings</title>
<updated>2025-11-20T14:30:10-05:00</updated>
<entry>
<title>8-K - ACME CORP (0000000123) (Filer)</title>
<link rel="alternate" type="text/html" href="https://www.sec.gov/Archives/edgar/data/123/000012325000001/0000123-25-000001-index.htm"/>
<summary type="html">&lt;b&gt;Filed:&lt;/b&gt; 2025-11-20</summary>
<updated>2025-11-20T14:30:02-05:00</updated>
<id>urn:tag:sec.gov,2008:accession-number=0000123-25-000001</id>
</entry>
<entry>
<title>10-Q - WIDGETS INC (0000000777) (Filer)</title>
<link rel="alternate" type="text/html" href="https://www.sec.gov/Archives/edgar/data/777/000077725000045/0000777-25-000045-index.htm"/>
<updated>2025-11-20T14:29:55-05:00</updated>
<id>urn:tag:sec.gov,2008:accession-number=0000777-25-000045</id>
</entry>
</feed>"#;

    // ---- feed parsing ----

    #[test]
    fn parses_feed_entries() {
        let filings = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(filings.len(), 2);
        assert_eq!(filings[0].title, "8-K - ACME CORP (0000000123) (Filer)");
        assert_eq!(
            filings[0].document_url,
            "https://www.sec.gov/Archives/edgar/data/123/000012325000001/0000123-25-000001-index.htm"
        );
        assert_eq!(filings[0].updated_at, "2025-11-20T14:30:02-05:00");
        assert_eq!(filings[1].cik(), Some(Cik::new("777")));
    }

    #[test]
    fn empty_feed_parses_to_nothing() {
        let filings = parse_feed("<feed></feed>").unwrap();
        assert!(filings.is_empty());
    }

    #[test]
    fn entry_missing_link_is_skipped() {
        let xml = r#"<feed><entry><title>t</title><updated>now</updated></entry></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    // ---- ticker directory ----

    #[test]
    fn parses_ticker_directory() {
        let json = r#"{
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "1": {"cik_str": 789019, "ticker": "msft", "title": "Microsoft Corp"}
        }"#;
        let map = parse_ticker_directory(json).unwrap();
        assert_eq!(map.get("AAPL"), Some(&Cik::new("320193")));
        assert_eq!(map.get("MSFT"), Some(&Cik::new("789019")));
        assert_eq!(map.get("TSLA"), None);
    }

    #[test]
    fn ticker_directory_rejects_garbage() {
        assert!(parse_ticker_directory("not json").is_err());
    }

    // ---- document discovery ----

    #[test]
    fn extracts_documents_excluding_viewer_artifacts() {
        let page = r#"
            <a href="/Archives/edgar/data/777/000077725000045/widgets-10q.htm">widgets-10q.htm</a>
            <a href="/Archives/edgar/data/777/000077725000045/R2.htm">R2.htm</a>
            <a href="exhibit99.htm">exhibit99.htm</a>
            <a href="/Archives/edgar/data/777/000077725000045/data.xml">data.xml</a>
            <a href="exhibit99.htm">exhibit99.htm</a>
        "#;
        let urls = extract_document_urls(
            "https://www.sec.gov/Archives/edgar/data/777/000077725000045/",
            page,
        )
        .unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.sec.gov/Archives/edgar/data/777/000077725000045/widgets-10q.htm",
                "https://www.sec.gov/Archives/edgar/data/777/000077725000045/exhibit99.htm",
            ]
        );
    }

    // ---- pacing ----

    #[tokio::test]
    async fn throttle_spaces_consecutive_calls() {
        let config = EdgarConfig {
            min_interval_ms: 50,
            ..Default::default()
        };
        let client = EdgarClient::from_config(&config);

        let start = Instant::now();
        client.throttle().await;
        client.throttle().await;
        client.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn first_throttle_does_not_wait() {
        let config = EdgarConfig {
            min_interval_ms: 5_000,
            ..Default::default()
        };
        let client = EdgarClient::from_config(&config);
        // Completes immediately; a waiting first call would hang the test.
        tokio::time::timeout(Duration::from_millis(500), client.throttle())
            .await
            .unwrap();
    }
}

// -------------------------------------------------------------------------
// Integration Tests (behind feature flag)
// -------------------------------------------------------------------------
