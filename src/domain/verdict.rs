//! Oracle verdicts and the per-run resolution report.

use std::fmt;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::TokenId;

/// Normalized oracle verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Yes,
    No,
    Unknown,
}

impl Verdict {
    /// Normalize raw oracle text. Trims and compares case-insensitively;
    /// anything that is not a plain yes or no (including "not enough
    /// information" phrasings and unparseable replies) is `Unknown`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("yes") {
            Self::Yes
        } else if text.eq_ignore_ascii_case("no") {
            Self::No
        } else {
            Self::Unknown
        }
    }

    /// True for verdicts that trigger a trade.
    #[must_use]
    pub const fn is_decisive(&self) -> bool {
        matches!(self, Self::Yes | Self::No)
    }

    /// Lowercase label form, used for metrics and outcome-token lookup.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yes => "YES",
            Self::No => "NO",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Raw oracle output before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleReply {
    /// Verdict text as the oracle produced it, e.g. `"yes"` or
    /// `"not enough information"`.
    pub verdict_text: String,
    /// Free-form reasoning attached to the verdict.
    pub rationale: String,
}

impl OracleReply {
    pub fn new(verdict_text: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            verdict_text: verdict_text.into(),
            rationale: rationale.into(),
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::parse(&self.verdict_text)
    }
}

/// One best-effort price observation. A failed lookup or a non-decimal
/// quote is recorded, never fatal.
#[derive(Debug, Clone)]
pub struct PriceCapture {
    pub token: TokenId,
    /// Outcome name as the market spells it, e.g. `"Yes"`.
    pub outcome: String,
    /// Parsed quote, or the failure text when the lookup or parse failed.
    pub quote: Result<Decimal, String>,
    pub captured_at: Instant,
}

impl PriceCapture {
    pub fn price(&self) -> Option<Decimal> {
        self.quote.as_ref().ok().copied()
    }
}

/// Outcome of the trade step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeOutcome {
    /// Order accepted (or recorded, in dry-run).
    Executed { order_id: String, dry_run: bool },
    /// Submission failed; text of the captured error.
    Failed(String),
}

/// Everything one pipeline run produced, with per-step errors captured as
/// values. Produced once per subscriber, immutable after.
#[derive(Debug, Clone)]
pub struct ResolutionReport {
    pub verdict: Verdict,
    pub rationale: String,
    /// Error text when the oracle call itself failed (the verdict is then
    /// `Unknown` by construction).
    pub oracle_error: Option<String>,
    pub oracle_started_at: Instant,
    pub oracle_duration: Duration,
    /// Prices captured before the oracle call, one per outcome token.
    pub pre_prices: Vec<PriceCapture>,
    /// Price of the verdict's outcome token, captured after the oracle
    /// call. `None` for indecisive verdicts.
    pub post_price: Option<PriceCapture>,
    /// `None` when no trade was attempted (indecisive verdict).
    pub trade: Option<TradeOutcome>,
}

impl ResolutionReport {
    /// Pre-call capture for a named outcome, if one was taken.
    pub fn pre_price_for(&self, outcome: &str) -> Option<&PriceCapture> {
        self.pre_prices
            .iter()
            .find(|c| c.outcome.eq_ignore_ascii_case(outcome))
    }

    pub fn trade_error(&self) -> Option<&str> {
        match &self.trade {
            Some(TradeOutcome::Failed(text)) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- normalization ----

    #[test]
    fn parse_yes_any_case() {
        assert_eq!(Verdict::parse("Yes"), Verdict::Yes);
        assert_eq!(Verdict::parse("YES"), Verdict::Yes);
        assert_eq!(Verdict::parse("yes"), Verdict::Yes);
        assert_eq!(Verdict::parse("  yes  "), Verdict::Yes);
    }

    #[test]
    fn parse_no_any_case() {
        assert_eq!(Verdict::parse("No"), Verdict::No);
        assert_eq!(Verdict::parse("NO"), Verdict::No);
        assert_eq!(Verdict::parse("no"), Verdict::No);
    }

    #[test]
    fn parse_anything_else_is_unknown() {
        assert_eq!(Verdict::parse("maybe"), Verdict::Unknown);
        assert_eq!(Verdict::parse(""), Verdict::Unknown);
        assert_eq!(Verdict::parse("not enough information"), Verdict::Unknown);
        assert_eq!(Verdict::parse("yes, probably"), Verdict::Unknown);
    }

    #[test]
    fn decisive_verdicts() {
        assert!(Verdict::Yes.is_decisive());
        assert!(Verdict::No.is_decisive());
        assert!(!Verdict::Unknown.is_decisive());
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(Verdict::Yes.to_string(), "YES");
        assert_eq!(Verdict::Unknown.to_string(), "UNKNOWN");
    }

    // ---- reply and captures ----

    #[test]
    fn reply_normalizes_through_verdict() {
        let reply = OracleReply::new("YES", "eps beat the strike");
        assert_eq!(reply.verdict(), Verdict::Yes);
    }

    #[test]
    fn capture_price_none_on_failure() {
        let capture = PriceCapture {
            token: TokenId::new("t"),
            outcome: "Yes".into(),
            quote: Err("price text 'oops' is not a decimal".into()),
            captured_at: Instant::now(),
        };
        assert_eq!(capture.price(), None);
    }

    #[test]
    fn report_exposes_trade_error() {
        let report = ResolutionReport {
            verdict: Verdict::Yes,
            rationale: String::new(),
            oracle_error: None,
            oracle_started_at: Instant::now(),
            oracle_duration: Duration::from_secs(3),
            pre_prices: vec![],
            post_price: None,
            trade: Some(TradeOutcome::Failed("order rejected: too small".into())),
        };
        assert_eq!(report.trade_error(), Some("order rejected: too small"));
    }
}
