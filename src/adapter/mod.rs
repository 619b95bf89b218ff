//! Concrete implementations of the outbound ports: EDGAR, Polymarket,
//! the Gemini oracle, notification channels, and metrics.

pub mod edgar;
pub mod metrics;
pub mod notifier;
pub mod oracle;
pub mod polymarket;
