use thiserror::Error;

/// Configuration-related errors with structured variants. Fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("cannot subscribe market '{slug}': {reason}")]
    Subscription { slug: String, reason: String },
}

/// Feed polling errors. Transient by contract: the sentinel watchdog
/// restarts the poll loop on any of these.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("feed returned status {status}")]
    Status { status: u16 },

    #[error("malformed feed payload: {0}")]
    Malformed(String),
}

/// Oracle call errors. Captured per resolution run and downgraded to an
/// UNKNOWN verdict, never propagated out of the pipeline.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle reply missing candidate text")]
    EmptyReply,

    #[error("failed to fetch filing document {url}: {reason}")]
    Document { url: String, reason: String },
}

/// Price lookup errors. Recorded in the price capture and skipped.
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("price request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("price text '{text}' is not a decimal")]
    NotDecimal { text: String },
}

/// Trade submission errors. Surfaced in the resolution report and the
/// notification; the subscriber still finishes resolved.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("invalid token ID '{token_id}': {reason}")]
    InvalidTokenId { token_id: String, reason: String },

    #[error("order rejected: {0}")]
    OrderRejected(String),

    #[error("failed to build order: {0}")]
    OrderBuildFailed(String),

    #[error("failed to sign order: {0}")]
    SigningFailed(String),

    #[error("failed to submit order: {0}")]
    SubmissionFailed(String),

    #[error("no outcome token for verdict '{verdict}'")]
    MissingOutcomeToken { verdict: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[cfg(feature = "trading")]
    #[error("Polymarket SDK error: {0}")]
    Polymarket(#[from] polymarket_client_sdk::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
