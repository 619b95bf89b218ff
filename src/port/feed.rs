//! Filing feed port.
//!
//! This module defines the traits for pulling regulatory filing data.
//! The sentinel polls through [`FilingFeed`]; subscriber construction
//! resolves company keys through [`TickerDirectory`].

use async_trait::async_trait;

use crate::domain::{Cik, Filing};
use crate::error::Error;

/// One-shot fetch of the current feed state.
///
/// # Implementation Notes
///
/// - Errors are transient by contract: the caller's watchdog logs them and
///   restarts polling from a fresh baseline. Implementations should not
///   retry forever internally.
/// - Implementations own their own pacing. The poll loop calls `poll`
///   back-to-back and relies on the feed's rate limiting for cadence.
#[async_trait]
pub trait FilingFeed: Send + Sync {
    /// Fetch the current feed entries, most recent first or in any order;
    /// callers treat the result as an unordered snapshot.
    async fn poll(&self) -> Result<Vec<Filing>, Error>;
}

/// Company key lookup backing subscriber creation.
#[async_trait]
pub trait TickerDirectory: Send + Sync {
    /// Resolve a ticker symbol to its CIK. `Ok(None)` when the symbol is
    /// unknown to the directory.
    async fn cik_for_ticker(&self, ticker: &str) -> Result<Option<Cik>, Error>;
}
