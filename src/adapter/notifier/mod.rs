//! Outbound notification channels.
//!
//! The log notifier and the registry live with the port; this module holds
//! the channels that leave the process.

#[cfg(feature = "telegram")]
pub mod telegram;

#[cfg(feature = "telegram")]
pub use telegram::{TelegramConfig, TelegramNotifier};
