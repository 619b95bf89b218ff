//! Application layer - orchestration and configuration.

mod config;
mod orchestrator;

pub use config::{Config, LoggingConfig, ResolutionConfig, TelegramAppConfig};
pub use orchestrator::App;
