//! edgarwatch - SEC EDGAR filing sentinel with market resolution.
//!
//! Watches the EDGAR current-events feed for new filings from a watched
//! set of companies, wakes the matching prediction-market subscribers
//! exactly once, and runs each woken market through a resolution
//! pipeline: capture prices, ask an oracle for a verdict against the
//! market's rules, optionally place a trade, notify.
//!
//! # Architecture
//!
//! Hexagonal: pure domain types, ports as traits, adapters per external
//! system, services carrying the orchestration logic.
//!
//! - [`domain`] - Filings, feed snapshots, market metadata, verdicts
//! - [`port`] - Collaborator contracts: feed, market data, oracle,
//!   execution, notification, metrics
//! - [`service`] - The sentinel poll/diff/dispatch loop, the subscriber
//!   lifecycle, the one-shot alert latch, the resolution pipeline
//! - [`adapter`] - EDGAR, Polymarket, Gemini, Telegram, metrics
//! - [`app`] - Configuration and orchestration
//! - [`error`] - Error taxonomy for the crate
//!
//! # Features
//!
//! - `trading` - Live order submission through the Polymarket CLOB
//! - `telegram` - Telegram notifications
//! - `testkit` - Scripted/recording doubles for integration tests

pub mod adapter;
pub mod app;
pub mod domain;
pub mod error;
pub mod port;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
