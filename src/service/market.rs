//! Earnings market subscriber and its lifecycle.

use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::{
    release_date_from_slug, slug_from_url, ticker_from_slug, Cik, MarketMeta, ResolutionReport,
};
use crate::error::{ConfigError, Result};
use crate::port::{MarketDataFeed, TickerDirectory};
use crate::service::latch::{AlertLatch, Wake};
use crate::service::pipeline::ResolutionPipeline;

/// Subscriber lifecycle. Transitions are strictly forward; `Resolved`,
/// `Failed` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPhase {
    /// Waiting for the company to file.
    Pending,
    /// A filing was dispatched; the worker has not picked it up yet.
    Alerted,
    /// The resolution pipeline is running.
    Resolving,
    /// The pipeline finished and produced a report.
    Resolved,
    /// The pipeline hit an unrecoverable error.
    Failed,
    /// The deadline passed without a filing.
    Expired,
}

impl MarketPhase {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Failed | Self::Expired)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Alerted => "alerted",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Alerted => 1,
            Self::Resolving => 2,
            Self::Resolved | Self::Failed | Self::Expired => 3,
        }
    }
}

impl fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How subscriber deadlines are derived.
#[derive(Debug, Clone, Copy)]
pub struct DeadlinePolicy {
    /// Hours past the expected release date before a pending market
    /// expires.
    pub grace_hours: i64,
    /// Deadline window from subscription time when the slug carries no
    /// parseable release date.
    pub fallback_window_hours: i64,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            grace_hours: 96,
            // 45 days, the market family's no-filing horizon.
            fallback_window_hours: 45 * 24,
        }
    }
}

impl DeadlinePolicy {
    /// Deadline for a market: expected release midnight UTC plus grace,
    /// or subscription time plus the fallback window.
    #[must_use]
    pub fn deadline_for(&self, expected: Option<NaiveDate>, now: DateTime<Utc>) -> DateTime<Utc> {
        match expected {
            Some(date) => {
                date.and_time(NaiveTime::MIN).and_utc() + chrono::Duration::hours(self.grace_hours)
            }
            None => now + chrono::Duration::hours(self.fallback_window_hours),
        }
    }
}

/// One watched prediction market: identity resolved at subscription time,
/// a one-shot latch the dispatcher fires, and a worker task that runs the
/// resolution pipeline after the wake.
pub struct EarningsMarket {
    id: Uuid,
    slug: String,
    ticker: String,
    cik: Cik,
    meta: MarketMeta,
    expected_release: Option<NaiveDate>,
    deadline: DateTime<Utc>,
    phase: RwLock<MarketPhase>,
    latch: AlertLatch,
    filing_url: OnceLock<String>,
    report: OnceLock<ResolutionReport>,
}

impl EarningsMarket {
    /// Resolve a market URL into a subscriber: slug from the URL, ticker
    /// from the slug, CIK from the ticker directory, metadata from the
    /// market data feed. Every failure here is a subscription-time
    /// configuration error and fatal at startup.
    pub async fn create(
        url: &str,
        directory: &dyn TickerDirectory,
        market_data: &dyn MarketDataFeed,
        policy: DeadlinePolicy,
    ) -> Result<Arc<Self>> {
        let slug = slug_from_url(url).ok_or_else(|| ConfigError::Subscription {
            slug: url.to_string(),
            reason: "URL has no market slug".to_string(),
        })?;
        let ticker = ticker_from_slug(&slug).ok_or_else(|| ConfigError::Subscription {
            slug: slug.clone(),
            reason: "slug has no ticker segment".to_string(),
        })?;
        let cik = directory
            .cik_for_ticker(&ticker)
            .await?
            .ok_or_else(|| ConfigError::Subscription {
                slug: slug.clone(),
                reason: format!("ticker {ticker} not in the company directory"),
            })?;
        let meta = market_data.market_by_slug(&slug).await?;
        for required in ["Yes", "No"] {
            if meta.token_for(required).is_none() {
                return Err(ConfigError::Subscription {
                    slug: slug.clone(),
                    reason: format!("market has no '{required}' outcome token"),
                }
                .into());
            }
        }

        let expected_release = release_date_from_slug(&slug);
        let deadline = policy.deadline_for(expected_release, Utc::now());
        Ok(Self::from_parts(
            slug,
            ticker,
            cik,
            meta,
            expected_release,
            deadline,
        ))
    }

    /// Assemble a subscriber from already-resolved parts. `create` is the
    /// production path; this is the seam for wiring pre-fetched metadata.
    pub fn from_parts(
        slug: impl Into<String>,
        ticker: impl Into<String>,
        cik: impl Into<Cik>,
        meta: MarketMeta,
        expected_release: Option<NaiveDate>,
        deadline: DateTime<Utc>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            slug: slug.into(),
            ticker: ticker.into(),
            cik: cik.into(),
            meta,
            expected_release,
            deadline,
            phase: RwLock::new(MarketPhase::Pending),
            latch: AlertLatch::new(),
            filing_url: OnceLock::new(),
            report: OnceLock::new(),
        })
    }

    /// Dispatcher entry point: record the filing directory URL, enter
    /// `Alerted`, fire the latch. Returns `true` when this call performed
    /// the alert; redundant deliveries return `false` and change nothing.
    /// Cheap and non-blocking, safe to call from the poll loop.
    pub fn deliver_filing(&self, url: &str) -> bool {
        if self.latch.is_signaled() {
            return false;
        }
        if self.filing_url.set(url.to_string()).is_err() {
            return false;
        }
        self.advance(MarketPhase::Alerted);
        self.latch.signal();
        true
    }

    /// Worker task body: park on the latch, then run the pipeline once.
    pub async fn run_worker(self: Arc<Self>, pipeline: ResolutionPipeline) {
        match self.latch.wait_until(self.deadline).await {
            Wake::Alerted => {
                self.advance(MarketPhase::Resolving);
                let Some(filing_url) = self.filing_url.get().cloned() else {
                    // deliver_filing sets the URL before signaling, so a
                    // bare signal is a wiring bug.
                    error!(slug = %self.slug, "alert latch fired without a filing URL");
                    self.advance(MarketPhase::Failed);
                    return;
                };
                match pipeline.run(&self, &filing_url).await {
                    Ok(report) => {
                        let _ = self.report.set(report);
                        self.advance(MarketPhase::Resolved);
                    }
                    Err(error) => {
                        error!(slug = %self.slug, %error, "resolution pipeline failed");
                        self.advance(MarketPhase::Failed);
                    }
                }
            }
            Wake::Expired => {
                warn!(slug = %self.slug, deadline = %self.deadline, "deadline passed without a filing");
                self.advance(MarketPhase::Expired);
                pipeline.expire(&self);
            }
        }
    }

    fn advance(&self, to: MarketPhase) {
        let mut phase = self.phase.write();
        if to.rank() > phase.rank() {
            debug!(slug = %self.slug, from = %*phase, to = %to, "phase transition");
            *phase = to;
        } else {
            warn!(slug = %self.slug, from = %*phase, to = %to, "ignoring backwards phase transition");
        }
    }

    // ---- observers ----

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    #[must_use]
    pub fn cik(&self) -> &Cik {
        &self.cik
    }

    #[must_use]
    pub fn meta(&self) -> &MarketMeta {
        &self.meta
    }

    #[must_use]
    pub fn expected_release(&self) -> Option<NaiveDate> {
        self.expected_release
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    #[must_use]
    pub fn phase(&self) -> MarketPhase {
        *self.phase.read()
    }

    #[must_use]
    pub fn filing_url(&self) -> Option<&str> {
        self.filing_url.get().map(String::as_str)
    }

    #[must_use]
    pub fn report(&self) -> Option<&ResolutionReport> {
        self.report.get()
    }
}

impl fmt::Debug for EarningsMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EarningsMarket")
            .field("slug", &self.slug)
            .field("ticker", &self.ticker)
            .field("cik", &self.cik)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
