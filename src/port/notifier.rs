//! Notifier port for event notifications.
//!
//! This module defines the trait for sending notifications about
//! system events such as filing alerts, market resolutions, and expiries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{ResolutionReport, TradeOutcome, Verdict};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// A watched company filed; a subscriber was alerted.
    FilingMatched(FilingEvent),
    /// A resolution pipeline finished (decisive or not).
    MarketResolved(ResolutionEvent),
    /// A subscriber's deadline passed without an alert.
    MarketExpired(ExpiryEvent),
}

/// Filing alert event.
#[derive(Debug, Clone)]
pub struct FilingEvent {
    /// Slug of the alerted market.
    pub slug: String,
    /// Ticker symbol of the filer.
    pub ticker: String,
    /// Company key the alert was dispatched under.
    pub cik: String,
    /// Filing directory URL delivered to the subscriber.
    pub filing_url: String,
    /// Feed entry title.
    pub title: String,
}

/// Resolution completion event.
#[derive(Debug, Clone)]
pub struct ResolutionEvent {
    /// Slug of the resolved market.
    pub slug: String,
    /// Ticker symbol.
    pub ticker: String,
    /// Normalized verdict.
    pub verdict: Verdict,
    /// Oracle reasoning text.
    pub rationale: String,
    /// Oracle wall time in seconds.
    pub oracle_seconds: f64,
    /// Post-verdict price of the verdict's token, when captured.
    pub outcome_price: Option<Decimal>,
    /// Pre-call YES price, when captured.
    pub yes_price: Option<Decimal>,
    /// Pre-call NO price, when captured.
    pub no_price: Option<Decimal>,
    /// Exchange order id when a trade went through.
    pub order_id: Option<String>,
    /// True when the trade step ran in dry-run.
    pub dry_run: bool,
    /// Captured trade submission error, if any.
    pub trade_error: Option<String>,
}

impl ResolutionEvent {
    /// Build the event from a finished resolution report.
    #[must_use]
    pub fn from_report(slug: &str, ticker: &str, report: &ResolutionReport) -> Self {
        let (order_id, dry_run, trade_error) = match &report.trade {
            Some(TradeOutcome::Executed { order_id, dry_run }) => {
                (Some(order_id.clone()), *dry_run, None)
            }
            Some(TradeOutcome::Failed(text)) => (None, false, Some(text.clone())),
            None => (None, false, None),
        };
        Self {
            slug: slug.to_string(),
            ticker: ticker.to_string(),
            verdict: report.verdict,
            rationale: report.rationale.clone(),
            oracle_seconds: report.oracle_duration.as_secs_f64(),
            outcome_price: report.post_price.as_ref().and_then(|c| c.price()),
            yes_price: report.pre_price_for("Yes").and_then(|c| c.price()),
            no_price: report.pre_price_for("No").and_then(|c| c.price()),
            order_id,
            dry_run,
            trade_error,
        }
    }
}

/// Deadline expiry event.
#[derive(Debug, Clone)]
pub struct ExpiryEvent {
    /// Slug of the expired market.
    pub slug: String,
    /// Ticker symbol.
    pub ticker: String,
    /// The deadline that passed.
    pub deadline: DateTime<Utc>,
}

/// Trait for notification handlers.
///
/// Implement this trait to receive events from the system.
/// Notifications are fire-and-forget (async but not awaited).
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method should not block or perform slow I/O synchronously
/// - Consider spawning async tasks for slow operations
pub trait Notifier: Send + Sync {
    /// Handle an event.
    ///
    /// This method should return quickly. For slow operations (e.g., HTTP calls),
    /// implementations should spawn an async task.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::info;
        match event {
            Event::FilingMatched(e) => {
                info!(
                    slug = %e.slug,
                    ticker = %e.ticker,
                    cik = %e.cik,
                    url = %e.filing_url,
                    "Filing matched"
                );
            }
            Event::MarketResolved(e) => {
                info!(
                    slug = %e.slug,
                    ticker = %e.ticker,
                    verdict = %e.verdict,
                    oracle_seconds = e.oracle_seconds,
                    order_id = e.order_id.as_deref().unwrap_or("-"),
                    trade_error = e.trade_error.as_deref().unwrap_or("-"),
                    "Market resolved"
                );
            }
            Event::MarketExpired(e) => {
                info!(
                    slug = %e.slug,
                    ticker = %e.ticker,
                    deadline = %e.deadline,
                    "Market expired without a filing"
                );
            }
        }
    }
}
