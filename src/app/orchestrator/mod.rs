//! App orchestration module.
//!
//! Wires the adapters to the sentinel and the per-market workers and runs
//! them to completion.

mod builder;

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::adapter::edgar::EdgarClient;
use crate::adapter::metrics::RuntimeMetrics;
use crate::adapter::oracle::GeminiOracle;
use crate::adapter::polymarket::PolymarketClient;
use crate::app::config::Config;
use crate::error::Result;
use crate::port::{MetricsSink, ResolutionOracle};
use crate::service::{EarningsMarket, FilingSentinel, ResolutionPipeline, SubscriptionRegistry};

use builder::{build_executor, build_notifier_registry};

/// Main application orchestrator.
pub struct App;

impl App {
    /// Subscribe every configured market, then watch the feed until all
    /// subscribers have finished.
    ///
    /// Subscription failures are fatal: a half-watched market list is
    /// worse than a clean startup error.
    pub async fn run(config: Config) -> Result<()> {
        info!(
            markets = config.markets.len(),
            dry_run = config.dry_run,
            "Starting edgarwatch"
        );

        let edgar = Arc::new(EdgarClient::from_config(&config.edgar));
        let polymarket = Arc::new(PolymarketClient::from_config(&config.polymarket));
        let oracle: Arc<dyn ResolutionOracle> =
            Arc::new(GeminiOracle::from_config(&config.oracle, edgar.clone())?);

        let notifiers = Arc::new(build_notifier_registry(&config));
        info!(notifiers = notifiers.len(), "Notifiers initialized");

        let executor = build_executor(&config).await?;

        let metrics: Arc<dyn MetricsSink> = Arc::new(RuntimeMetrics);

        let pipeline = ResolutionPipeline::new(
            polymarket.clone(),
            oracle,
            executor,
            notifiers.clone(),
            metrics.clone(),
            config.resolution.trading_policy(),
        );

        let registry = Arc::new(SubscriptionRegistry::new());
        let policy = config.resolution.deadline_policy();

        let mut workers = JoinSet::new();
        for url in &config.markets {
            let market =
                EarningsMarket::create(url, edgar.as_ref(), polymarket.as_ref(), policy).await?;
            info!(
                slug = %market.slug(),
                ticker = %market.ticker(),
                cik = %market.cik(),
                deadline = %market.deadline(),
                "Market subscribed"
            );
            metrics.inc_counter(
                "markets_watched_total",
                vec![
                    ("ticker", market.ticker().to_string()),
                    ("slug", market.slug().to_string()),
                ],
            );
            registry.register(market.clone());
            workers.spawn(market.run_worker(pipeline.clone()));
        }

        let sentinel = FilingSentinel::new(
            edgar.clone(),
            registry.clone(),
            notifiers.clone(),
            metrics.clone(),
        );
        let sentinel_task = tokio::spawn(async move { sentinel.run().await });

        info!(
            companies = registry.company_count(),
            subscribers = registry.len(),
            "Watching the EDGAR feed"
        );

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Market worker panicked");
            }
        }

        info!("All subscribers finished, stopping the feed watch");
        sentinel_task.abort();

        Ok(())
    }
}
