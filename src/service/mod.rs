//! Application services: the latch, the registry, the sentinel, the
//! subscriber lifecycle, and the resolution pipeline.

mod latch;
mod market;
mod pipeline;
mod registry;
mod sentinel;

pub use latch::{AlertLatch, Wake};
pub use market::{DeadlinePolicy, EarningsMarket, MarketPhase};
pub use pipeline::{ResolutionPipeline, TradingPolicy};
pub use registry::SubscriptionRegistry;
pub use sentinel::FilingSentinel;
