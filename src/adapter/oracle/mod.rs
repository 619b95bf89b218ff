//! Verdict oracle backed by a hosted LLM.

mod gemini;
mod settings;

pub use gemini::GeminiOracle;
pub use settings::OracleConfig;
