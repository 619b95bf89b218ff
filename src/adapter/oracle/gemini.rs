//! Gemini resolution oracle.
//!
//! Turns a filing directory URL plus the market's resolution rules into a
//! verdict: the filing's documents are fetched through the throttled EDGAR
//! client, stripped to plain text, and sent to `generateContent` with a
//! strict-JSON instruction. The reply is parsed leniently; anything that
//! is not the expected JSON ends up as an UNKNOWN verdict downstream, not
//! an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::settings::OracleConfig;
use crate::adapter::edgar::EdgarClient;
use crate::domain::OracleReply;
use crate::error::{ConfigError, OracleError, Result};
use crate::port::ResolutionOracle;

const PERSONA: &str = "You are a blockchain oracle for Polymarket. You will be given the \
resolution rules of a stock earnings prediction market and evidence in the form of SEC 8-K, \
10-K or 10-Q filing documents. Return the market resolution as JSON: \
{\"resolution\": \"yes\" | \"no\" | \"not enough information\", \
\"reasoning\": \"explanation for the result\"}. Return ONLY valid JSON. Do not include \
explanations, markdown, or code fences.";

/// Oracle backed by the Gemini Generative Language API.
pub struct GeminiOracle {
    http: HttpClient,
    edgar: Arc<EdgarClient>,
    api_url: String,
    api_key: String,
    model: String,
    max_documents: usize,
    max_document_bytes: usize,
}

impl GeminiOracle {
    /// Build the oracle from config. The API key must have been loaded
    /// from `GEMINI_API_KEY`; a missing key is a startup error.
    pub fn from_config(config: &OracleConfig, edgar: Arc<EdgarClient>) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingField {
                field: "GEMINI_API_KEY",
            })?
            .to_string();

        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            edgar,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            max_documents: config.max_documents,
            max_document_bytes: config.max_document_bytes,
        })
    }

    /// Fetch and sanitize the filing's documents. Individual fetch or
    /// markup failures skip that document; only an empty result is an
    /// error.
    async fn gather_documents(&self, directory_url: &str) -> Result<Vec<String>> {
        let mut urls = self.edgar.document_urls(directory_url).await?;
        urls.truncate(self.max_documents);

        let fetches = urls.iter().map(|url| self.edgar.document(url));
        let bodies = futures_util::future::join_all(fetches).await;

        let mut documents = Vec::new();
        for (url, body) in urls.iter().zip(bodies) {
            let html = match body {
                Ok(html) => html,
                Err(err) => {
                    debug!(url = %url, error = %err, "Skipping unreadable filing document");
                    continue;
                }
            };
            match extract_text(&html) {
                Ok(mut text) if !text.is_empty() => {
                    truncate_to(&mut text, self.max_document_bytes);
                    documents.push(text);
                }
                Ok(_) => debug!(url = %url, "Filing document empty after markup stripping"),
                Err(err) => debug!(url = %url, error = %err, "Failed to strip document markup"),
            }
        }

        if documents.is_empty() {
            return Err(OracleError::Document {
                url: directory_url.to_string(),
                reason: "no readable documents in the filing index".to_string(),
            }
            .into());
        }
        Ok(documents)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = Request {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(OracleError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let reply = response
            .json::<Response>()
            .await
            .map_err(OracleError::Request)?;
        reply
            .text()
            .ok_or_else(|| OracleError::EmptyReply.into())
    }
}

#[async_trait]
impl ResolutionOracle for GeminiOracle {
    async fn resolve(&self, filing_url: &str, rules: &str) -> Result<OracleReply> {
        let documents = self.gather_documents(filing_url).await?;
        info!(
            url = %filing_url,
            documents = documents.len(),
            model = %self.model,
            "Asking the oracle for a verdict"
        );

        let prompt = build_prompt(rules, &documents);
        let raw = self.generate(&prompt).await?;
        debug!(reply = %raw, "Oracle replied");
        Ok(parse_reply(&raw))
    }
}

#[derive(Serialize)]
struct Request {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl Response {
    /// Concatenated text of the first candidate, if any.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn build_prompt(rules: &str, documents: &[String]) -> String {
    let mut prompt = String::new();
    prompt.push_str(PERSONA);
    prompt.push_str("\n\nRules:\n");
    prompt.push_str(rules);
    for (index, document) in documents.iter().enumerate() {
        prompt.push_str(&format!("\n\n--- Filing document {} ---\n", index + 1));
        prompt.push_str(document);
    }
    prompt
}

/// Decode the oracle's reply. Models wrap JSON in code fences despite
/// instructions, so fences are stripped first; a reply that still is not
/// the expected JSON is carried verbatim as the verdict text.
fn parse_reply(raw: &str) -> OracleReply {
    #[derive(Deserialize)]
    struct Wire {
        resolution: String,
        #[serde(default)]
        reasoning: String,
    }

    let text = strip_code_fences(raw);
    match serde_json::from_str::<Wire>(text) {
        Ok(wire) => OracleReply::new(wire.resolution, wire.reasoning),
        Err(_) => OracleReply::new(text, ""),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Reduce an EDGAR document page to plain text: drop script/style blocks,
/// then tags, decode the common entities, squeeze whitespace.
fn extract_text(html: &str) -> std::result::Result<String, regex::Error> {
    let block_re = Regex::new(r"(?is)<(?:script|style)[^>]*>.*?</(?:script|style)>")?;
    let tag_re = Regex::new(r"(?s)<[^>]*>")?;
    let ws_re = Regex::new(r"\s+")?;

    let text = block_re.replace_all(html, " ");
    let text = tag_re.replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    Ok(ws_re.replace_all(&text, " ").trim().to_string())
}

fn truncate_to(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Verdict;

    // -------------------------------------------------------------------
    // Reply parsing
    // -------------------------------------------------------------------

    #[test]
    fn parses_clean_json_reply() {
        let reply = parse_reply(r#"{"resolution": "yes", "reasoning": "EPS beat the strike"}"#);
        assert_eq!(reply.verdict(), Verdict::Yes);
        assert_eq!(reply.rationale, "EPS beat the strike");
    }

    #[test]
    fn strips_code_fences_before_parsing() {
        let raw = "```json\n{\"resolution\": \"no\", \"reasoning\": \"missed\"}\n```";
        let reply = parse_reply(raw);
        assert_eq!(reply.verdict(), Verdict::No);
        assert_eq!(reply.rationale, "missed");
    }

    #[test]
    fn bare_fences_without_language_tag() {
        let raw = "```\n{\"resolution\": \"yes\"}\n```";
        let reply = parse_reply(raw);
        assert_eq!(reply.verdict(), Verdict::Yes);
        assert_eq!(reply.rationale, "");
    }

    #[test]
    fn non_json_reply_becomes_verdict_text() {
        let reply = parse_reply("I could not find the EPS figure in these documents.");
        assert_eq!(reply.verdict(), Verdict::Unknown);
        assert_eq!(
            reply.verdict_text,
            "I could not find the EPS figure in these documents."
        );
    }

    #[test]
    fn indecisive_json_stays_unknown() {
        let reply = parse_reply(r#"{"resolution": "not enough information", "reasoning": "x"}"#);
        assert_eq!(reply.verdict(), Verdict::Unknown);
    }

    // -------------------------------------------------------------------
    // Markup stripping
    // -------------------------------------------------------------------

    #[test]
    fn extract_text_drops_tags_and_scripts() {
        let html = r#"<html><head><style>p { color: red; }</style>
            <script>var x = "<p>";</script></head>
            <body><p>GAAP EPS was&nbsp;$1.42</p></body></html>"#;
        let text = extract_text(html).unwrap();
        assert_eq!(text, "GAAP EPS was $1.42");
    }

    #[test]
    fn extract_text_decodes_entities() {
        let text = extract_text("<b>P&amp;G</b> &lt;diluted&gt;").unwrap();
        assert_eq!(text, "P&G <diluted>");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let mut text = "abc\u{00e9}def".to_string();
        // the cut lands inside the two-byte é and must back up
        truncate_to(&mut text, 4);
        assert_eq!(text, "abc");
    }

    // -------------------------------------------------------------------
    // Prompt and wire shapes
    // -------------------------------------------------------------------

    #[test]
    fn prompt_carries_rules_then_documents() {
        let documents = vec!["doc one".to_string(), "doc two".to_string()];
        let prompt = build_prompt("Resolves YES if EPS > 1.00", &documents);

        let rules_at = prompt.find("Resolves YES if").unwrap();
        let first_at = prompt.find("doc one").unwrap();
        let second_at = prompt.find("doc two").unwrap();
        assert!(prompt.starts_with("You are a blockchain oracle"));
        assert!(rules_at < first_at && first_at < second_at);
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn response_text_joins_candidate_parts() {
        let raw = r#"{"candidates": [{"content": {"parts": [
            {"text": "{\"resolution\""}, {"text": ": \"yes\"}"}
        ]}}]}"#;
        let response: Response = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text().as_deref(), Some(r#"{"resolution": "yes"}"#));
    }

    #[test]
    fn blocked_candidate_yields_no_text() {
        let response: Response =
            serde_json::from_str(r#"{"candidates": [{"content": null}]}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn missing_api_key_is_a_startup_error() {
        use crate::adapter::edgar::{EdgarClient, EdgarConfig};
        use crate::error::{ConfigError, Error};

        let edgar = Arc::new(EdgarClient::from_config(&EdgarConfig::default()));
        let err = GeminiOracle::from_config(&OracleConfig::default(), edgar).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField {
                field: "GEMINI_API_KEY"
            })
        ));
    }
}
