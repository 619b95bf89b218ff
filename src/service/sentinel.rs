//! Feed sentinel: poll, diff, dispatch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{FeedSnapshot, Filing};
use crate::error::Result;
use crate::port::{Event, FilingEvent, FilingFeed, MetricsSink, NotifierRegistry};
use crate::service::registry::SubscriptionRegistry;

const METRIC_ALERTS: &str = "filing_alerts_total";

/// Watches the filings feed and wakes subscribers whose company filed.
///
/// Two nested loops: the outer watchdog establishes a baseline snapshot
/// and restarts polling after any failure; the inner loop fetches, diffs
/// against the previous snapshot, and dispatches every new entry. Neither
/// loop sleeps; pacing comes entirely from the feed's rate limiting.
/// Dispatch is fire-and-continue: waking a subscriber is a latch signal,
/// never a blocking call.
pub struct FilingSentinel {
    feed: Arc<dyn FilingFeed>,
    registry: Arc<SubscriptionRegistry>,
    notifiers: Arc<NotifierRegistry>,
    metrics: Arc<dyn MetricsSink>,
}

impl FilingSentinel {
    pub fn new(
        feed: Arc<dyn FilingFeed>,
        registry: Arc<SubscriptionRegistry>,
        notifiers: Arc<NotifierRegistry>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            feed,
            registry,
            notifiers,
            metrics,
        }
    }

    /// Watchdog loop; runs until the owning task is aborted. Poll errors
    /// are logged and answered with a fresh baseline, so entries appearing
    /// while the feed was down are silently missed (best-effort contract).
    pub async fn run(&self) {
        loop {
            let baseline = match self.feed.poll().await {
                Ok(entries) => FeedSnapshot::from_entries(entries),
                Err(error) => {
                    warn!(%error, "baseline fetch failed, retrying");
                    continue;
                }
            };
            info!(entries = baseline.len(), "feed baseline established");

            let mut previous = baseline;
            loop {
                match self.poll_cycle(&mut previous).await {
                    Ok(woken) if woken > 0 => {
                        debug!(woken, "dispatched filing alerts");
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%error, "poll cycle failed, restarting from a fresh baseline");
                        break;
                    }
                }
            }
        }
    }

    /// One fetch/diff/dispatch/advance step. The first call after a
    /// (re)start only establishes state; `run` handles that by fetching
    /// the baseline itself. Returns the number of subscribers woken.
    pub async fn poll_cycle(&self, previous: &mut FeedSnapshot) -> Result<usize> {
        let current = FeedSnapshot::from_entries(self.feed.poll().await?);
        let fresh = current.new_since(previous);
        let mut woken = 0;
        for filing in &fresh {
            woken += self.dispatch(filing);
        }
        *previous = current;
        Ok(woken)
    }

    /// Fan one new entry out to the markets watching its filer. Entries
    /// without a usable CIK and filers nobody watches are informational.
    fn dispatch(&self, filing: &Filing) -> usize {
        let Some(cik) = filing.cik() else {
            debug!(url = %filing.document_url, "feed entry without a CIK, skipping");
            return 0;
        };
        let subscribers = self.registry.subscribers_for(&cik);
        if subscribers.is_empty() {
            debug!(%cik, title = %filing.title, "filing from an unwatched company");
            return 0;
        }
        let Some(directory_url) = filing.directory_url() else {
            warn!(url = %filing.document_url, "cannot derive filing directory, skipping");
            return 0;
        };

        let mut woken = 0;
        for market in subscribers {
            if market.deliver_filing(&directory_url) {
                info!(
                    %cik,
                    slug = %market.slug(),
                    url = %directory_url,
                    "filing alert dispatched"
                );
                self.metrics.inc_counter(
                    METRIC_ALERTS,
                    vec![
                        ("ticker", market.ticker().to_string()),
                        ("slug", market.slug().to_string()),
                        ("cik", cik.to_string()),
                    ],
                );
                self.notifiers.notify_all(Event::FilingMatched(FilingEvent {
                    slug: market.slug().to_string(),
                    ticker: market.ticker().to_string(),
                    cik: cik.to_string(),
                    filing_url: directory_url.clone(),
                    title: filing.title.clone(),
                }));
                woken += 1;
            } else {
                warn!(
                    slug = %market.slug(),
                    "subscriber already alerted, ignoring duplicate filing"
                );
            }
        }
        woken
    }
}
