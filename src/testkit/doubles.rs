//! Scripted and recording doubles for the ports.
//!
//! Scripted doubles replay a queue of results, one per call; recording
//! doubles capture what the system under test handed them. All of them
//! take `&self` like the ports they implement, so the scripts live
//! behind mutexes.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Cik, Filing, MarketMeta, OracleReply, TokenId};
use crate::error::{Error, Result};
use crate::port::{
    Event, FilingFeed, Labels, MarketDataFeed, MetricsSink, Notifier, OrderReceipt, OrderRequest,
    ResolutionOracle, TickerDirectory, TradeExecutor,
};

// ---------------------------------------------------------------------------
// ScriptedFeed
// ---------------------------------------------------------------------------

/// A filing feed that replays a queue of poll results.
///
/// Each call to `poll()` pops the next scripted result. When the queue is
/// exhausted the call parks forever instead of returning, matching a real
/// feed that simply has nothing new; this keeps sentinel loops awaitable
/// under `tokio::time::timeout` without hot-spinning.
pub struct ScriptedFeed {
    polls: Mutex<VecDeque<Result<Vec<Filing>>>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            polls: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_polls(self, polls: Vec<Result<Vec<Filing>>>) -> Self {
        *self.polls.lock().unwrap() = polls.into();
        self
    }

    /// Append one more poll result to the script.
    pub fn push_poll(&self, result: Result<Vec<Filing>>) {
        self.polls.lock().unwrap().push_back(result);
    }

    pub fn remaining(&self) -> usize {
        self.polls.lock().unwrap().len()
    }
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilingFeed for ScriptedFeed {
    async fn poll(&self) -> Result<Vec<Filing>> {
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// StaticDirectory
// ---------------------------------------------------------------------------

/// A ticker directory backed by a fixed map.
pub struct StaticDirectory {
    entries: HashMap<String, Cik>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_ticker(mut self, ticker: &str, cik: &str) -> Self {
        self.entries
            .insert(ticker.to_ascii_uppercase(), Cik::new(cik));
        self
    }
}

impl Default for StaticDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TickerDirectory for StaticDirectory {
    async fn cik_for_ticker(&self, ticker: &str) -> Result<Option<Cik>> {
        Ok(self.entries.get(&ticker.to_ascii_uppercase()).cloned())
    }
}

// ---------------------------------------------------------------------------
// StaticMarketData
// ---------------------------------------------------------------------------

/// Market data backed by fixed metadata and per-token price scripts.
///
/// Prices advance through their script one quote per call and repeat the
/// last quote once exhausted, so a test can script a pre-call price and a
/// different post-verdict price. Unknown slugs and tokens return errors.
pub struct StaticMarketData {
    metas: Mutex<HashMap<String, MarketMeta>>,
    prices: Mutex<HashMap<TokenId, (Vec<String>, usize)>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self {
            metas: Mutex::new(HashMap::new()),
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_market(self, meta: MarketMeta) -> Self {
        self.metas.lock().unwrap().insert(meta.slug.clone(), meta);
        self
    }

    /// Append one quote to a token's price script.
    pub fn with_price(self, token: impl Into<TokenId>, quote: &str) -> Self {
        self.prices
            .lock()
            .unwrap()
            .entry(token.into())
            .or_insert_with(|| (Vec::new(), 0))
            .0
            .push(quote.to_string());
        self
    }

    /// Number of price lookups served for a token.
    pub fn price_calls(&self, token: &TokenId) -> usize {
        self.prices
            .lock()
            .unwrap()
            .get(token)
            .map_or(0, |(_, served)| *served)
    }
}

impl Default for StaticMarketData {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataFeed for StaticMarketData {
    async fn market_by_slug(&self, slug: &str) -> Result<MarketMeta> {
        self.metas
            .lock()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| Error::Connection(format!("no market scripted for slug '{slug}'")))
    }

    async fn price(&self, token: &TokenId) -> Result<String> {
        let mut prices = self.prices.lock().unwrap();
        let Some((quotes, served)) = prices.get_mut(token) else {
            return Err(Error::Connection(format!(
                "no price scripted for token '{token}'"
            )));
        };
        if quotes.is_empty() {
            return Err(Error::Connection(format!(
                "empty price script for token '{token}'"
            )));
        }
        let index = (*served).min(quotes.len() - 1);
        *served += 1;
        Ok(quotes[index].clone())
    }
}

// ---------------------------------------------------------------------------
// ScriptedOracle
// ---------------------------------------------------------------------------

/// An oracle that replays a queue of replies and records its calls.
///
/// Each call to `resolve()` pops the next scripted result (defaults to an
/// indecisive reply when exhausted). An optional delay simulates oracle
/// wall time.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<OracleReply>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An oracle that always answers YES.
    pub fn yes() -> Self {
        Self::new().with_reply("yes", "the filing reports a beat")
    }

    pub fn with_reply(self, verdict_text: &str, rationale: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(OracleReply::new(verdict_text, rationale)));
        self
    }

    pub fn with_result(self, result: Result<OracleReply>) -> Self {
        self.replies.lock().unwrap().push_back(result);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(filing_url, rules)` pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolutionOracle for ScriptedOracle {
    async fn resolve(&self, filing_url: &str, rules: &str) -> Result<OracleReply> {
        self.calls
            .lock()
            .unwrap()
            .push((filing_url.to_string(), rules.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(OracleReply::new("not enough information", "script exhausted")))
    }
}

// ---------------------------------------------------------------------------
// RecordingExecutor
// ---------------------------------------------------------------------------

/// An executor that records every order and replays scripted results.
///
/// When the result queue is exhausted it returns a live receipt with a
/// synthetic order id.
pub struct RecordingExecutor {
    orders: Mutex<Vec<OrderRequest>>,
    results: Mutex<VecDeque<Result<OrderReceipt>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_result(self, result: Result<OrderReceipt>) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeExecutor for RecordingExecutor {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let serial = {
            let mut orders = self.orders.lock().unwrap();
            orders.push(order.clone());
            orders.len()
        };
        let next = self.results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(OrderReceipt::live(format!("test-order-{serial}"))))
    }

    fn executor_name(&self) -> &'static str {
        "recording"
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// A notifier that appends every event to a shared list.
///
/// Clones share the list, so a test can hand one clone to a
/// [`NotifierRegistry`](crate::port::NotifierRegistry) and keep the other
/// for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    pub fn alert_count(&self) -> usize {
        self.count(|e| matches!(e, Event::FilingMatched(_)))
    }

    pub fn resolution_count(&self) -> usize {
        self.count(|e| matches!(e, Event::MarketResolved(_)))
    }

    pub fn expiry_count(&self) -> usize {
        self.count(|e| matches!(e, Event::MarketExpired(_)))
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// RecordingMetrics
// ---------------------------------------------------------------------------

/// A metrics sink that appends every observation to shared lists.
#[derive(Clone, Default)]
pub struct RecordingMetrics {
    counters: Arc<Mutex<Vec<(&'static str, Labels)>>>,
    gauges: Arc<Mutex<Vec<(&'static str, Labels, f64)>>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> Vec<(&'static str, Labels)> {
        self.counters.lock().unwrap().clone()
    }

    pub fn gauges(&self) -> Vec<(&'static str, Labels, f64)> {
        self.gauges.lock().unwrap().clone()
    }

    /// Total increments recorded under `name`.
    pub fn counter_total(&self, name: &str) -> usize {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| *n == name)
            .count()
    }

    /// Values recorded under `name`, in emission order.
    pub fn gauge_values(&self, name: &str) -> Vec<f64> {
        self.gauges
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _, _)| *n == name)
            .map(|(_, _, v)| *v)
            .collect()
    }
}

impl MetricsSink for RecordingMetrics {
    fn inc_counter(&self, name: &'static str, labels: Labels) {
        self.counters.lock().unwrap().push((name, labels));
    }

    fn set_gauge(&self, name: &'static str, labels: Labels, value: f64) {
        self.gauges.lock().unwrap().push((name, labels, value));
    }
}
