//! Market metadata and the slug conventions of the earnings market family.
//!
//! Market URLs look like
//! `https://polymarket.com/event/aapl-quarterly-earnings-gaap-eps-2025-10-30-1pt23`.
//! The slug encodes the ticker (first segment) and the expected release
//! date (segments five through seven, in either year-first or
//! month-first order).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::TokenId;

/// A single tradeable outcome within a market.
///
/// Each outcome has a token ID (used for pricing and trading) and a
/// human-readable name; for this market family the names are "Yes"/"No".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeToken {
    pub name: String,
    pub token: TokenId,
}

impl OutcomeToken {
    pub fn new(name: impl Into<String>, token: impl Into<TokenId>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }
}

/// Market metadata fetched once at subscription time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMeta {
    pub slug: String,
    /// Resolution rules text, handed to the oracle verbatim.
    pub description: String,
    pub outcomes: Vec<OutcomeToken>,
}

impl MarketMeta {
    /// Case-insensitive outcome lookup: `"yes"`, `"Yes"` and `"YES"` all
    /// hit the same token.
    pub fn token_for(&self, outcome: &str) -> Option<&TokenId> {
        self.outcomes
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(outcome))
            .map(|o| &o.token)
    }

    pub fn outcome_names(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|o| o.name.as_str())
    }
}

/// Last non-empty path segment of a market URL.
pub fn slug_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let slug = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(slug.to_string())
}

/// Ticker symbol: slug text before the first `-`, uppercased.
pub fn ticker_from_slug(slug: &str) -> Option<String> {
    let ticker = slug.split('-').next()?;
    if ticker.is_empty() {
        None
    } else {
        Some(ticker.to_ascii_uppercase())
    }
}

/// Expected release date from slug segments five through seven. Both date
/// orderings occur in the wild; a four-digit fifth segment selects
/// year-first:
///
/// - `ccl-quarterly-earnings-nongaap-eps-2025-09-29-1pt32` -> 2025-09-29
/// - `dltr-quarterly-earnings-nongaap-eps-12-03-2025-1pt08` -> 2025-12-03
pub fn release_date_from_slug(slug: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = slug.split('-').collect();
    if parts.len() < 8 {
        return None;
    }
    let (y, m, d) = if parts[5].len() == 4 {
        (parts[5], parts[6], parts[7])
    } else {
        (parts[7], parts[5], parts[6])
    };
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}
