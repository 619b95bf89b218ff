//! Resolution pipeline: prices, oracle, trade, notify, metrics.
//!
//! Every step is fault-tolerant and leaves an explicit trace in the
//! [`ResolutionReport`]: a failed price lookup becomes a captured error,
//! a failed oracle call becomes an UNKNOWN verdict with the error text,
//! a failed trade submission is surfaced in the report and notification.
//! The only unrecoverable error is a decisive verdict with no matching
//! outcome token, which subscription-time validation rules out.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use crate::domain::{OracleReply, OutcomeToken, PriceCapture, ResolutionReport, TradeOutcome};
use crate::error::{ExecutionError, PriceError, Result};
use crate::port::{
    Event, ExpiryEvent, MarketDataFeed, MetricsSink, NotifierRegistry, OrderRequest, OrderSide,
    ResolutionEvent, ResolutionOracle, TradeExecutor,
};
use crate::service::market::EarningsMarket;

const METRIC_RESOLUTIONS: &str = "oracle_resolutions_total";
const METRIC_ORACLE_SECONDS: &str = "oracle_resolution_seconds";
const METRIC_TOKEN_PRICE: &str = "token_price_usd";
const METRIC_EXPIRED: &str = "markets_expired_total";

/// Sizing for the resolution trade. Deliberately minimal: fixed share
/// count, limit price clamped from the captured quote.
#[derive(Debug, Clone, Copy)]
pub struct TradingPolicy {
    pub size: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl Default for TradingPolicy {
    fn default() -> Self {
        Self {
            size: dec!(5),
            min_price: dec!(0.01),
            max_price: dec!(0.99),
        }
    }
}

impl TradingPolicy {
    fn clamp(&self, price: Decimal) -> Decimal {
        price.clamp(self.min_price, self.max_price)
    }
}

/// Executes the resolution steps for one alerted subscriber.
#[derive(Clone)]
pub struct ResolutionPipeline {
    market_data: Arc<dyn MarketDataFeed>,
    oracle: Arc<dyn ResolutionOracle>,
    executor: Arc<dyn TradeExecutor>,
    notifiers: Arc<NotifierRegistry>,
    metrics: Arc<dyn MetricsSink>,
    trading: TradingPolicy,
}

impl ResolutionPipeline {
    pub fn new(
        market_data: Arc<dyn MarketDataFeed>,
        oracle: Arc<dyn ResolutionOracle>,
        executor: Arc<dyn TradeExecutor>,
        notifiers: Arc<NotifierRegistry>,
        metrics: Arc<dyn MetricsSink>,
        trading: TradingPolicy,
    ) -> Self {
        Self {
            market_data,
            oracle,
            executor,
            notifiers,
            metrics,
            trading,
        }
    }

    /// Run the pipeline once for `market` against the filing found under
    /// `filing_url`. Emits exactly one resolution notification, decisive
    /// or not.
    pub async fn run(&self, market: &EarningsMarket, filing_url: &str) -> Result<ResolutionReport> {
        let meta = market.meta();
        info!(slug = %market.slug(), url = filing_url, "resolving market");

        // Pre-call prices, best effort, one capture per outcome.
        let mut pre_prices = Vec::with_capacity(meta.outcomes.len());
        for outcome in &meta.outcomes {
            let capture = self.capture_price(outcome).await;
            self.price_gauge(market, &capture, "edgar_alert");
            pre_prices.push(capture);
        }

        // Timed oracle call. Wall time is measured around the call alone.
        let oracle_started_at = Instant::now();
        let oracle_result = self.oracle.resolve(filing_url, &meta.description).await;
        let oracle_duration = oracle_started_at.elapsed();

        let (reply, oracle_error) = match oracle_result {
            Ok(reply) => (reply, None),
            Err(error) => {
                warn!(slug = %market.slug(), %error, "oracle call failed, treating as unknown");
                let text = error.to_string();
                (OracleReply::new("", text.clone()), Some(text))
            }
        };
        let verdict = reply.verdict();

        self.metrics.set_gauge(
            METRIC_ORACLE_SECONDS,
            vec![
                ("ticker", market.ticker().to_string()),
                ("slug", market.slug().to_string()),
            ],
            oracle_duration.as_secs_f64(),
        );
        self.metrics.inc_counter(
            METRIC_RESOLUTIONS,
            vec![
                ("ticker", market.ticker().to_string()),
                ("slug", market.slug().to_string()),
                ("outcome", verdict.as_str().to_string()),
            ],
        );
        info!(
            slug = %market.slug(),
            %verdict,
            seconds = oracle_duration.as_secs_f64(),
            "oracle verdict"
        );

        // Trade only on decisive verdicts; the executor choice (live or
        // dry-run) was made at wiring time.
        let mut post_price = None;
        let mut trade = None;
        if verdict.is_decisive() {
            let outcome = meta
                .outcomes
                .iter()
                .find(|o| o.name.eq_ignore_ascii_case(verdict.as_str()))
                .ok_or_else(|| ExecutionError::MissingOutcomeToken {
                    verdict: verdict.to_string(),
                })?;

            let capture = self.capture_price(outcome).await;
            self.price_gauge(market, &capture, "oracle_resolution");

            let limit = capture.price().or_else(|| {
                pre_prices
                    .iter()
                    .find(|c| c.outcome.eq_ignore_ascii_case(verdict.as_str()))
                    .and_then(PriceCapture::price)
            });
            trade = Some(self.submit_order(market, outcome, limit).await);
            post_price = Some(capture);
        }

        let report = ResolutionReport {
            verdict,
            rationale: reply.rationale,
            oracle_error,
            oracle_started_at,
            oracle_duration,
            pre_prices,
            post_price,
            trade,
        };

        self.notifiers.notify_all(Event::MarketResolved(ResolutionEvent::from_report(
            market.slug(),
            market.ticker(),
            &report,
        )));
        Ok(report)
    }

    /// Expiry side-effects for a market whose deadline passed unalerted.
    pub fn expire(&self, market: &EarningsMarket) {
        self.metrics.inc_counter(
            METRIC_EXPIRED,
            vec![
                ("ticker", market.ticker().to_string()),
                ("slug", market.slug().to_string()),
            ],
        );
        self.notifiers.notify_all(Event::MarketExpired(ExpiryEvent {
            slug: market.slug().to_string(),
            ticker: market.ticker().to_string(),
            deadline: market.deadline(),
        }));
    }

    async fn submit_order(
        &self,
        market: &EarningsMarket,
        outcome: &OutcomeToken,
        limit: Option<Decimal>,
    ) -> TradeOutcome {
        let Some(quote) = limit else {
            warn!(slug = %market.slug(), "no usable quote, skipping order");
            return TradeOutcome::Failed("no usable quote for a limit price".to_string());
        };
        let order = OrderRequest {
            token: outcome.token.clone(),
            side: OrderSide::Buy,
            size: self.trading.size,
            price: self.trading.clamp(quote),
        };
        match self.executor.place_order(&order).await {
            Ok(receipt) => {
                info!(
                    slug = %market.slug(),
                    order_id = %receipt.order_id,
                    dry_run = receipt.dry_run,
                    price = %order.price,
                    size = %order.size,
                    "order placed"
                );
                TradeOutcome::Executed {
                    order_id: receipt.order_id,
                    dry_run: receipt.dry_run,
                }
            }
            Err(error) => {
                warn!(slug = %market.slug(), %error, "order submission failed");
                TradeOutcome::Failed(error.to_string())
            }
        }
    }

    async fn capture_price(&self, outcome: &OutcomeToken) -> PriceCapture {
        let quote = match self.market_data.price(&outcome.token).await {
            Ok(text) => {
                let text = text.trim().to_string();
                match Decimal::from_str(&text) {
                    Ok(price) => Ok(price),
                    Err(_) => {
                        debug!(token = %outcome.token, text = %text, "price text is not a decimal");
                        Err(PriceError::NotDecimal { text }.to_string())
                    }
                }
            }
            Err(error) => {
                debug!(token = %outcome.token, %error, "price lookup failed");
                Err(error.to_string())
            }
        };
        PriceCapture {
            token: outcome.token.clone(),
            outcome: outcome.name.clone(),
            quote,
            captured_at: Instant::now(),
        }
    }

    fn price_gauge(&self, market: &EarningsMarket, capture: &PriceCapture, event: &'static str) {
        let Some(value) = capture.price().and_then(|p| p.to_f64()) else {
            return;
        };
        self.metrics.set_gauge(
            METRIC_TOKEN_PRICE,
            vec![
                ("ticker", market.ticker().to_string()),
                ("slug", market.slug().to_string()),
                ("event", event.to_string()),
                ("outcome", capture.outcome.clone()),
            ],
            value,
        );
    }
}
