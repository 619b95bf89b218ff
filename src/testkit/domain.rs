//! Builders for domain primitives used across tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Filing, MarketMeta, OutcomeToken};
use crate::service::EarningsMarket;

/// Archive document URL in the canonical EDGAR shape.
pub fn document_url(cik: &str, accession: &str, document: &str) -> String {
    format!("https://www.sec.gov/Archives/edgar/data/{cik}/{accession}/{document}")
}

/// Filing directory URL for the same archive path, trailing slash kept.
pub fn directory_url(cik: &str, accession: &str) -> String {
    format!("https://www.sec.gov/Archives/edgar/data/{cik}/{accession}/")
}

/// A feed entry for company `cik` pointing at a primary document.
pub fn filing(cik: &str, accession: &str) -> Filing {
    Filing::new(
        format!("8-K - ACME CORP ({cik}) (Filer)"),
        document_url(cik, accession, "primary.htm"),
        "2025-10-30T21:05:14-04:00",
    )
}

/// Binary market metadata with Yes/No tokens derived from the slug.
pub fn binary_meta(slug: &str) -> MarketMeta {
    MarketMeta {
        slug: slug.to_string(),
        description: "Resolves Yes if the reported EPS beats the strike.".to_string(),
        outcomes: vec![
            OutcomeToken::new("Yes", format!("{slug}-yes")),
            OutcomeToken::new("No", format!("{slug}-no")),
        ],
    }
}

/// A pending subscriber keyed under `cik` with a one-hour deadline.
pub fn pending_market(slug: &str, cik: &str) -> Arc<EarningsMarket> {
    market_with_deadline(slug, cik, Utc::now() + chrono::Duration::hours(1))
}

/// A subscriber whose deadline already passed; its worker expires on the
/// first latch wait.
pub fn expired_market(slug: &str, cik: &str) -> Arc<EarningsMarket> {
    market_with_deadline(slug, cik, Utc::now() - chrono::Duration::hours(1))
}

/// A pending subscriber with an explicit deadline. The ticker is the
/// slug's first dash segment, uppercased, matching the production
/// derivation.
pub fn market_with_deadline(slug: &str, cik: &str, deadline: DateTime<Utc>) -> Arc<EarningsMarket> {
    let ticker = slug
        .split('-')
        .next()
        .unwrap_or(slug)
        .to_ascii_uppercase();
    EarningsMarket::from_parts(slug, ticker, cik, binary_meta(slug), None, deadline)
}
