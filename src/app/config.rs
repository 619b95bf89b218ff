//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file; secrets (`WALLET_PRIVATE_KEY`,
//! `GEMINI_API_KEY`) come from environment variables only and are filled in
//! after parsing.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapter::edgar::EdgarConfig;
use crate::adapter::oracle::OracleConfig;
use crate::adapter::polymarket::PolymarketConfig;
use crate::error::{ConfigError, Result};
use crate::service::{DeadlinePolicy, TradingPolicy};

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Market page URLs to watch, one subscriber each.
    #[serde(default)]
    pub markets: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub edgar: EdgarConfig,
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub telegram: TelegramAppConfig,
    /// Dry-run mode: alert and resolve, but never submit orders.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Deadline and trade sizing knobs for the resolution flow.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    /// Hours past the expected release date before a pending market
    /// expires. The market family resolves NO 96h after close.
    #[serde(default = "default_grace_hours")]
    pub grace_hours: i64,
    /// Waiting window from subscription time for slugs with no parseable
    /// release date. 45 days is the family's no-filing horizon.
    #[serde(default = "default_fallback_window_hours")]
    pub fallback_window_hours: i64,
    /// Shares per resolution order.
    #[serde(default = "default_trade_size")]
    pub trade_size: Decimal,
}

const fn default_grace_hours() -> i64 {
    96
}

const fn default_fallback_window_hours() -> i64 {
    45 * 24
}

fn default_trade_size() -> Decimal {
    Decimal::from(5)
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            grace_hours: default_grace_hours(),
            fallback_window_hours: default_fallback_window_hours(),
            trade_size: default_trade_size(),
        }
    }
}

impl ResolutionConfig {
    #[must_use]
    pub fn deadline_policy(&self) -> DeadlinePolicy {
        DeadlinePolicy {
            grace_hours: self.grace_hours,
            fallback_window_hours: self.fallback_window_hours,
        }
    }

    #[must_use]
    pub fn trading_policy(&self) -> TradingPolicy {
        TradingPolicy {
            size: self.trade_size,
            ..TradingPolicy::default()
        }
    }
}

/// Telegram notification configuration.
/// The bot token and chat ID come from `TELEGRAM_BOT_TOKEN` /
/// `TELEGRAM_CHAT_ID` env vars, not from the file.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Send a message for every filing alert.
    #[serde(default = "default_true")]
    pub notify_alerts: bool,
    /// Send a message for every finished resolution.
    #[serde(default = "default_true")]
    pub notify_resolutions: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            notify_alerts: true,
            notify_resolutions: true,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        // Secrets come from the environment only, never the file.
        config.polymarket.private_key = std::env::var("WALLET_PRIVATE_KEY").ok();
        config.oracle.api_key = std::env::var("GEMINI_API_KEY").ok();

        config.validate()?;

        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.markets.is_empty() {
            return Err(ConfigError::MissingField { field: "markets" }.into());
        }
        if self.edgar.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "edgar.user_agent",
            }
            .into());
        }
        if self.resolution.trade_size <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "resolution.trade_size",
                reason: "must be positive".into(),
            }
            .into());
        }
        // The wallet key is checked where the live executor is built: the
        // CLI --dry-run override lands after load, so a key-less dry run
        // must still pass here.
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markets: Vec::new(),
            logging: LoggingConfig::default(),
            edgar: EdgarConfig::default(),
            polymarket: PolymarketConfig::default(),
            oracle: OracleConfig::default(),
            resolution: ResolutionConfig::default(),
            telegram: TelegramAppConfig::default(),
            dry_run: false,
        }
    }
}
