//! SEC EDGAR integration: the current-events Atom feed, the ticker
//! directory, and filing document retrieval, all behind one throttled
//! HTTP client.

mod client;
mod settings;

pub use client::EdgarClient;
pub use settings::EdgarConfig;
