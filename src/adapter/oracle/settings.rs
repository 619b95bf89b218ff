//! Oracle configuration.

use serde::Deserialize;

/// Gemini oracle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Model name passed to `generateContent`.
    #[serde(default = "default_model")]
    pub model: String,
    /// Generative Language API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Most filing documents sent per resolution. Index pages of large
    /// filings list dozens of exhibits; the primary document comes first.
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,
    /// Per-document size cap after markup stripping.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
    /// Request timeout. Verdicts over long filings routinely take tens of
    /// seconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// API key. Never read from the config file; `Config::load` fills it
    /// from the `GEMINI_API_KEY` environment variable.
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

const fn default_max_documents() -> usize {
    8
}

const fn default_max_document_bytes() -> usize {
    200_000
}

const fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: default_api_url(),
            max_documents: default_max_documents(),
            max_document_bytes: default_max_document_bytes(),
            timeout_ms: default_timeout_ms(),
            api_key: None,
        }
    }
}
