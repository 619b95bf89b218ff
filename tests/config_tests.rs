//! Configuration loading and validation tests.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use edgarwatch::app::Config;
use edgarwatch::error::{ConfigError, Error};
use rust_decimal_macros::dec;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
// Env mutations must not interleave across tests.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("edgarwatch-config-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

fn load(contents: &str) -> Result<Config, Error> {
    let path = write_temp_config(contents);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);
    result
}

const MINIMAL: &str = r#"
markets = ["https://polymarket.com/event/acme-quarterly-earnings-gaap-eps-2025-10-30-1pt23"]

[edgar]
user_agent = "example contact@example.com"
"#;

#[test]
fn minimal_config_fills_defaults() {
    let config = load(MINIMAL).unwrap();

    assert_eq!(config.markets.len(), 1);
    assert!(!config.dry_run);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "pretty");
    assert_eq!(config.edgar.min_interval_ms, 112);
    assert!(config.edgar.feed_url.contains("output=atom"));
    assert_eq!(
        config.polymarket.gamma_url,
        "https://gamma-api.polymarket.com"
    );
    assert_eq!(config.polymarket.clob_url, "https://clob.polymarket.com");
    assert_eq!(config.polymarket.chain_id, 137);
    assert_eq!(config.oracle.model, "gemini-2.5-flash");
    assert_eq!(config.resolution.grace_hours, 96);
    assert_eq!(config.resolution.fallback_window_hours, 45 * 24);
    assert_eq!(config.resolution.trade_size, dec!(5));
    assert!(!config.telegram.enabled);
    assert!(config.telegram.notify_alerts);
}

#[test]
fn missing_markets_is_fatal() {
    let toml = r#"
markets = []

[edgar]
user_agent = "example contact@example.com"
"#;

    match load(toml) {
        Err(Error::Config(ConfigError::MissingField { field: "markets" })) => {}
        other => panic!("expected a missing markets error, got {other:?}"),
    }
}

#[test]
fn blank_user_agent_is_fatal() {
    let toml = r#"
markets = ["https://polymarket.com/event/acme-quarterly-earnings"]

[edgar]
user_agent = "   "
"#;

    match load(toml) {
        Err(Error::Config(ConfigError::MissingField {
            field: "edgar.user_agent",
        })) => {}
        other => panic!("expected a missing user agent error, got {other:?}"),
    }
}

#[test]
fn nonpositive_trade_size_is_fatal() {
    let toml = r#"
markets = ["https://polymarket.com/event/acme-quarterly-earnings"]

[edgar]
user_agent = "example contact@example.com"

[resolution]
trade_size = 0
"#;

    match load(toml) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "resolution.trade_size",
            ..
        })) => {}
        other => panic!("expected an invalid trade size error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_a_read_error() {
    let result = Config::load("/nonexistent/edgarwatch-config.toml");
    match result {
        Err(Error::Config(ConfigError::ReadFile(_))) => {}
        other => panic!("expected a read error, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    match load("markets = [") {
        Err(Error::Config(ConfigError::Parse(_))) => {}
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn resolution_overrides_map_into_policies() {
    let toml = r#"
markets = ["https://polymarket.com/event/acme-quarterly-earnings"]

[edgar]
user_agent = "example contact@example.com"

[resolution]
grace_hours = 48
fallback_window_hours = 24
trade_size = 2.5
"#;

    let config = load(toml).unwrap();
    let deadlines = config.resolution.deadline_policy();
    assert_eq!(deadlines.grace_hours, 48);
    assert_eq!(deadlines.fallback_window_hours, 24);

    let trading = config.resolution.trading_policy();
    assert_eq!(trading.size, dec!(2.5));
    // Clamp band stays at its defaults.
    assert_eq!(trading.min_price, dec!(0.01));
    assert_eq!(trading.max_price, dec!(0.99));
}

#[test]
fn dry_run_flag_parses_from_the_file() {
    let toml = r#"
markets = ["https://polymarket.com/event/acme-quarterly-earnings"]
dry_run = true

[edgar]
user_agent = "example contact@example.com"
"#;

    assert!(load(toml).unwrap().dry_run);
}

#[test]
fn secrets_come_from_the_environment_only() {
    let _guard = ENV_LOCK.lock().unwrap();

    std::env::set_var("WALLET_PRIVATE_KEY", "0xdeadbeef");
    std::env::set_var("GEMINI_API_KEY", "test-api-key");
    let config = load(MINIMAL).unwrap();
    assert_eq!(config.polymarket.private_key.as_deref(), Some("0xdeadbeef"));
    assert_eq!(config.oracle.api_key.as_deref(), Some("test-api-key"));

    std::env::remove_var("WALLET_PRIVATE_KEY");
    std::env::remove_var("GEMINI_API_KEY");
    let config = load(MINIMAL).unwrap();
    assert!(config.polymarket.private_key.is_none());
    assert!(config.oracle.api_key.is_none());
}

#[test]
fn key_less_config_still_loads() {
    let _guard = ENV_LOCK.lock().unwrap();
    std::env::remove_var("WALLET_PRIVATE_KEY");
    std::env::remove_var("GEMINI_API_KEY");

    // Wallet key absence is checked where the live executor is built,
    // not at load time: a dry run needs no key.
    let config = load(MINIMAL).unwrap();
    assert!(config.polymarket.private_key.is_none());
    assert!(config.oracle.api_key.is_none());
}
