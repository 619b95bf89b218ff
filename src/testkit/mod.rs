//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`doubles`] - Scripted and recording implementations of the ports:
//!   `ScriptedFeed`, `StaticDirectory`, `StaticMarketData`, `ScriptedOracle`,
//!   `RecordingExecutor`, `RecordingNotifier`, `RecordingMetrics`.
//! - [`domain`] - Builders for domain primitives: filings, market metadata,
//!   subscribers.

pub mod domain;
pub mod doubles;
