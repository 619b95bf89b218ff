//! Polymarket exchange integration.

mod client;
mod executor;
mod response;
mod settings;

pub use client::PolymarketClient;
#[cfg(feature = "trading")]
pub use executor::ClobExecutor;
pub use executor::DryRunExecutor;
pub use response::GammaMarket;
pub use settings::PolymarketConfig;
