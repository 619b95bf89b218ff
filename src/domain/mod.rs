//! Exchange-agnostic domain logic: feed entries, snapshot diffing, market
//! metadata, and oracle verdicts.

mod filing;
mod ids;
mod market;
mod verdict;

// Core domain types
pub use filing::{FeedSnapshot, Filing};
pub use ids::{Cik, TokenId};
pub use market::{
    release_date_from_slug, slug_from_url, ticker_from_slug, MarketMeta, OutcomeToken,
};
pub use verdict::{OracleReply, PriceCapture, ResolutionReport, TradeOutcome, Verdict};
