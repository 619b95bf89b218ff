//! Telegram notifications.
//!
//! Sends filing alerts, resolutions, and expiries to a configured chat.
//! Requires the `telegram` feature.

mod format;
mod notifier;

pub use notifier::{TelegramConfig, TelegramNotifier};
