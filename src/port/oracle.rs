//! Decision oracle port.

use async_trait::async_trait;

use crate::domain::OracleReply;
use crate::error::Error;

/// Reads a filing and produces a verdict against a market's resolution
/// rules.
///
/// # Implementation Notes
///
/// - Calls may take seconds to minutes; the worker task blocks on them,
///   so implementations need no internal queueing.
/// - A returned error is captured by the pipeline and downgraded to an
///   UNKNOWN verdict; implementations should surface failures as `Err`
///   rather than inventing verdict text.
#[async_trait]
pub trait ResolutionOracle: Send + Sync {
    /// Resolve the market described by `rules` against the filing found
    /// under `filing_url` (a filing directory URL).
    async fn resolve(&self, filing_url: &str, rules: &str) -> Result<OracleReply, Error>;
}
