//! Feed entries and snapshot diffing.
//!
//! A poll of the EDGAR latest-filings feed yields an unordered bag of
//! entries. Change detection is a pure set difference between consecutive
//! snapshots; there is no persisted history, so a restart re-baselines and
//! anything filed during the gap is missed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::Cik;

/// One entry of the filings feed. Identity is the whole value: all three
/// fields participate in equality and hashing, so an edited `updated_at`
/// makes an entry "new" again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filing {
    /// Feed entry title, e.g. `"8-K - ACME CORP (0000123) (Filer)"`.
    pub title: String,
    /// Link to the primary document inside the filing directory.
    pub document_url: String,
    /// Raw feed timestamp text. Identity data only, never parsed.
    pub updated_at: String,
}

impl Filing {
    pub fn new(
        title: impl Into<String>,
        document_url: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            document_url: document_url.into(),
            updated_at: updated_at.into(),
        }
    }

    /// Company key extracted from the archive path, which has the fixed
    /// shape `/Archives/edgar/data/{cik}/{accession}/{document}`. `None`
    /// when the URL does not follow that shape.
    pub fn cik(&self) -> Option<Cik> {
        let url = url::Url::parse(&self.document_url).ok()?;
        let mut segments = url.path_segments()?;
        segments.find(|s| *s == "data")?;
        let cik = segments.next()?;
        if cik.is_empty() || !cik.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Cik::new(cik))
    }

    /// The filing directory: the document URL with its final path segment
    /// stripped, trailing slash kept. Listing this directory yields every
    /// document of the filing.
    pub fn directory_url(&self) -> Option<String> {
        let cut = self.document_url.rfind('/')?;
        Some(self.document_url[..=cut].to_string())
    }
}

/// An unordered snapshot of the feed at one poll instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    entries: HashSet<Filing>,
}

impl FeedSnapshot {
    /// Build a snapshot from one poll result. Duplicate entries collapse.
    pub fn from_entries(entries: Vec<Filing>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Entries present in `self` but not in `previous`: the set difference
    /// `self - previous`. Pure and total; result order is unspecified.
    pub fn new_since(&self, previous: &FeedSnapshot) -> Vec<Filing> {
        self.entries
            .iter()
            .filter(|e| !previous.entries.contains(*e))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, filing: &Filing) -> bool {
        self.entries.contains(filing)
    }
}

impl FromIterator<Filing> for FeedSnapshot {
    fn from_iter<I: IntoIterator<Item = Filing>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
