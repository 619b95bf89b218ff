//! Notifier and executor initialization.

use std::sync::Arc;

use tracing::info;

use crate::adapter::polymarket::DryRunExecutor;
use crate::app::config::Config;
use crate::error::Result;
use crate::port::{LogNotifier, NotifierRegistry, TradeExecutor};

#[cfg(feature = "telegram")]
use crate::adapter::notifier::{TelegramConfig, TelegramNotifier};

/// Build notifier registry from configuration.
pub(crate) fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();

    // Always add log notifier
    registry.register(Box::new(LogNotifier));

    // Add telegram notifier if configured
    #[cfg(feature = "telegram")]
    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            let tg_config = TelegramConfig {
                notify_alerts: config.telegram.notify_alerts,
                notify_resolutions: config.telegram.notify_resolutions,
                ..tg_config
            };
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            tracing::warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    // Suppress unused variable warning when telegram feature is disabled
    #[cfg(not(feature = "telegram"))]
    let _ = config;

    registry
}

/// Build the trade executor. Dry-run always wins; live trading needs the
/// `trading` feature and an authenticated CLOB session.
pub(crate) async fn build_executor(config: &Config) -> Result<Arc<dyn TradeExecutor>> {
    if config.dry_run {
        info!("Dry-run mode, orders stay local");
        return Ok(Arc::new(DryRunExecutor::default()));
    }
    live_executor(config).await
}

#[cfg(feature = "trading")]
async fn live_executor(config: &Config) -> Result<Arc<dyn TradeExecutor>> {
    let executor = crate::adapter::polymarket::ClobExecutor::new(&config.polymarket).await?;
    info!("CLOB executor authenticated, trading is live");
    Ok(Arc::new(executor))
}

#[cfg(not(feature = "trading"))]
async fn live_executor(config: &Config) -> Result<Arc<dyn TradeExecutor>> {
    let _ = config;
    tracing::warn!("Built without the trading feature, orders stay local");
    Ok(Arc::new(DryRunExecutor::default()))
}
