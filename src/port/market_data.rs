//! Market data port for metadata and price lookups.

use async_trait::async_trait;

use crate::domain::{MarketMeta, TokenId};
use crate::error::Error;

/// Read-side market access: metadata at subscription time, prices during
/// resolution.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    /// Fetch metadata (description and outcome tokens) for a market slug.
    async fn market_by_slug(&self, slug: &str) -> Result<MarketMeta, Error>;

    /// Current sell-side price of an outcome token, as text.
    ///
    /// The contract is deliberately loose: the text is usually a decimal
    /// like `"0.515"`, but transports may hand back non-numeric or error
    /// text. Callers must tolerate parse failure and treat it as a missed
    /// observation, not a fault.
    async fn price(&self, token: &TokenId) -> Result<String, Error>;
}
