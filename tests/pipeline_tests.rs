//! Resolution pipeline integration tests: price capture, oracle verdicts,
//! trade submission, and the notification that ends every run.

use std::sync::Arc;
use std::time::Duration;

use edgarwatch::domain::{TokenId, TradeOutcome, Verdict};
use edgarwatch::error::{ExecutionError, OracleError};
use edgarwatch::port::{Event, NotifierRegistry, OrderReceipt, OrderSide, ResolutionEvent};
use edgarwatch::service::{ResolutionPipeline, TradingPolicy};
use edgarwatch::testkit::domain::{directory_url, pending_market};
use edgarwatch::testkit::doubles::{
    RecordingExecutor, RecordingMetrics, RecordingNotifier, ScriptedOracle, StaticMarketData,
};
use rust_decimal_macros::dec;

struct Rig {
    pipeline: ResolutionPipeline,
    oracle: Arc<ScriptedOracle>,
    executor: Arc<RecordingExecutor>,
    notifier: RecordingNotifier,
    metrics: RecordingMetrics,
}

fn rig(market_data: StaticMarketData, oracle: ScriptedOracle, executor: RecordingExecutor) -> Rig {
    let oracle = Arc::new(oracle);
    let executor = Arc::new(executor);
    let notifier = RecordingNotifier::new();
    let mut notifiers = NotifierRegistry::new();
    notifiers.register(Box::new(notifier.clone()));
    let metrics = RecordingMetrics::new();
    let pipeline = ResolutionPipeline::new(
        Arc::new(market_data),
        oracle.clone(),
        executor.clone(),
        Arc::new(notifiers),
        Arc::new(metrics.clone()),
        TradingPolicy::default(),
    );
    Rig {
        pipeline,
        oracle,
        executor,
        notifier,
        metrics,
    }
}

/// Price scripts for a binary market built by `pending_market`.
fn quotes(slug: &str, yes: &[&str], no: &[&str]) -> StaticMarketData {
    let mut data = StaticMarketData::new();
    for quote in yes {
        data = data.with_price(format!("{slug}-yes"), quote);
    }
    for quote in no {
        data = data.with_price(format!("{slug}-no"), quote);
    }
    data
}

fn resolution_event(notifier: &RecordingNotifier) -> ResolutionEvent {
    notifier
        .events()
        .into_iter()
        .find_map(|event| match event {
            Event::MarketResolved(e) => Some(e),
            _ => None,
        })
        .expect("no resolution event recorded")
}

const SLUG: &str = "acme-quarterly-earnings";

#[tokio::test]
async fn yes_verdict_buys_the_yes_token() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42", "0.90"], &["0.58"]);
    let r = rig(data, ScriptedOracle::yes(), RecordingExecutor::new());

    let url = directory_url("777", "000123");
    let report = r.pipeline.run(&market, &url).await.unwrap();

    assert_eq!(report.verdict, Verdict::Yes);
    assert!(report.oracle_error.is_none());
    assert_eq!(
        report.pre_price_for("Yes").and_then(|c| c.price()),
        Some(dec!(0.42))
    );
    assert_eq!(
        report.pre_price_for("No").and_then(|c| c.price()),
        Some(dec!(0.58))
    );
    let post = report.post_price.as_ref().expect("post-verdict capture");
    assert_eq!(post.price(), Some(dec!(0.90)));

    let orders = r.executor.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].token, TokenId::new(format!("{SLUG}-yes")));
    assert_eq!(orders[0].side, OrderSide::Buy);
    assert_eq!(orders[0].size, dec!(5));
    assert_eq!(orders[0].price, dec!(0.90));

    // One oracle call, against the filing directory and the market rules.
    assert_eq!(r.oracle.call_count(), 1);
    let calls = r.oracle.calls();
    assert_eq!(calls[0].0, url);
    assert_eq!(calls[0].1, market.meta().description);

    assert_eq!(r.notifier.resolution_count(), 1);
    assert_eq!(r.metrics.counter_total("oracle_resolutions_total"), 1);
    assert_eq!(r.metrics.gauge_values("token_price_usd").len(), 3);
}

#[tokio::test]
async fn no_verdict_buys_the_no_token() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42"], &["0.58", "0.12"]);
    let oracle = ScriptedOracle::new().with_reply("no", "reported EPS missed the strike");
    let r = rig(data, oracle, RecordingExecutor::new());

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::No);
    let orders = r.executor.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].token, TokenId::new(format!("{SLUG}-no")));
    assert_eq!(orders[0].price, dec!(0.12));
}

#[tokio::test]
async fn oracle_failure_downgrades_to_unknown() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42"], &["0.58"]);
    let oracle = ScriptedOracle::new().with_result(Err(OracleError::EmptyReply.into()));
    let r = rig(data, oracle, RecordingExecutor::new());

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Unknown);
    assert!(report.oracle_error.is_some());
    assert!(report.trade.is_none());
    assert!(report.post_price.is_none());
    assert_eq!(r.executor.order_count(), 0);
    // The resolution notification still goes out.
    assert_eq!(r.notifier.resolution_count(), 1);
}

#[tokio::test]
async fn indecisive_reply_trades_nothing() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42"], &["0.58"]);
    let oracle =
        ScriptedOracle::new().with_reply("not enough information", "the filing lacks EPS figures");
    let r = rig(data, oracle, RecordingExecutor::new());

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Unknown);
    assert!(report.oracle_error.is_none());
    assert!(report.trade.is_none());
    assert_eq!(r.executor.order_count(), 0);
    assert_eq!(r.notifier.resolution_count(), 1);
}

#[tokio::test]
async fn trade_failure_is_captured_not_fatal() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42"], &["0.58"]);
    let executor = RecordingExecutor::new().with_result(Err(ExecutionError::SubmissionFailed(
        "insufficient balance".to_string(),
    )
    .into()));
    let r = rig(data, ScriptedOracle::yes(), executor);

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Yes);
    let error = report.trade_error().expect("captured trade error");
    assert!(error.contains("insufficient balance"));

    let event = resolution_event(&r.notifier);
    assert!(event.order_id.is_none());
    assert!(event
        .trade_error
        .as_deref()
        .is_some_and(|text| text.contains("insufficient balance")));
}

#[tokio::test]
async fn missing_quotes_skip_the_order() {
    let market = pending_market(SLUG, "777");
    // No price scripts at all: every capture records a miss.
    let r = rig(
        StaticMarketData::new(),
        ScriptedOracle::yes(),
        RecordingExecutor::new(),
    );

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Yes);
    assert_eq!(r.executor.order_count(), 0);
    assert!(report.pre_price_for("Yes").expect("capture taken").quote.is_err());
    match &report.trade {
        Some(TradeOutcome::Failed(text)) => assert!(text.contains("no usable quote")),
        other => panic!("expected a failed trade, got {other:?}"),
    }
}

#[tokio::test]
async fn order_limit_falls_back_to_the_pre_call_quote() {
    let market = pending_market(SLUG, "777");
    // The post-verdict lookup returns non-decimal text; the pre-call
    // capture supplies the limit instead.
    let data = quotes(SLUG, &["0.42", "unavailable"], &["0.58"]);
    let r = rig(data, ScriptedOracle::yes(), RecordingExecutor::new());

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert!(report.post_price.as_ref().expect("capture taken").quote.is_err());
    let orders = r.executor.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].price, dec!(0.42));
}

#[tokio::test]
async fn order_limit_is_clamped_to_the_policy_band() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42", "1.50"], &["0.58"]);
    let r = rig(data, ScriptedOracle::yes(), RecordingExecutor::new());

    r.pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    let orders = r.executor.orders();
    assert_eq!(orders[0].price, dec!(0.99));
}

#[tokio::test]
async fn dry_run_receipts_are_flagged_in_the_event() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42"], &["0.58"]);
    let executor = RecordingExecutor::new().with_result(Ok(OrderReceipt::dry_run()));
    let r = rig(data, ScriptedOracle::yes(), executor);

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    match &report.trade {
        Some(TradeOutcome::Executed { dry_run, .. }) => assert!(dry_run),
        other => panic!("expected an executed trade, got {other:?}"),
    }
    let event = resolution_event(&r.notifier);
    assert!(event.dry_run);
    assert_eq!(event.order_id.as_deref(), Some("dry-run"));
}

#[tokio::test]
async fn oracle_wall_time_lands_in_report_and_gauge() {
    let market = pending_market(SLUG, "777");
    let data = quotes(SLUG, &["0.42", "0.90"], &["0.58"]);
    let oracle = ScriptedOracle::yes().with_delay(Duration::from_millis(50));
    let r = rig(data, oracle, RecordingExecutor::new());

    let report = r
        .pipeline
        .run(&market, &directory_url("777", "000123"))
        .await
        .unwrap();

    assert!(report.oracle_duration >= Duration::from_millis(50));
    let seconds = r.metrics.gauge_values("oracle_resolution_seconds");
    assert_eq!(seconds.len(), 1);
    assert!(seconds[0] >= 0.05);

    // Captures bracket the oracle call: pre before, post after.
    for pre in &report.pre_prices {
        assert!(pre.captured_at <= report.oracle_started_at);
    }
    let post = report.post_price.as_ref().expect("post-verdict capture");
    assert!(post.captured_at >= report.oracle_started_at);
}

#[test]
fn expire_emits_metric_and_notification() {
    let market = pending_market(SLUG, "777");
    let r = rig(
        StaticMarketData::new(),
        ScriptedOracle::new(),
        RecordingExecutor::new(),
    );

    r.pipeline.expire(&market);

    assert_eq!(r.metrics.counter_total("markets_expired_total"), 1);
    assert_eq!(r.notifier.expiry_count(), 1);
    assert_eq!(r.oracle.call_count(), 0);
}
