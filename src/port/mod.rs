//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (the filings feed, market APIs, the oracle, notification
//! services, etc.).
//!
//! # Available Ports
//!
//! - [`FilingFeed`], [`TickerDirectory`] - regulatory feed integration
//! - [`MarketDataFeed`] - market metadata and price lookups
//! - [`ResolutionOracle`] - filing-to-verdict decisions
//! - [`TradeExecutor`] - order submission
//! - [`Notifier`] - event notifications (Telegram, logging, etc.)
//! - [`MetricsSink`] - counters and gauges

mod execution;
mod feed;
mod market_data;
mod metrics;
mod notifier;
mod oracle;

// Feed ports
pub use feed::{FilingFeed, TickerDirectory};

// Market data port
pub use market_data::MarketDataFeed;

// Oracle port
pub use oracle::ResolutionOracle;

// Execution port
pub use execution::{OrderReceipt, OrderRequest, OrderSide, TradeExecutor};

// Notifier port
pub use notifier::{
    Event, ExpiryEvent, FilingEvent, LogNotifier, Notifier, NotifierRegistry, NullNotifier,
    ResolutionEvent,
};

// Metrics port
pub use metrics::{Labels, LogMetrics, MetricsSink, NullMetrics};
