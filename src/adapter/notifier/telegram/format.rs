//! Message formatting for Telegram notifications.

use crate::domain::Verdict;
use crate::port::Event;

use super::notifier::TelegramConfig;

/// Format an event into a Telegram message, or None if the event should be skipped.
pub fn format_event_message(event: &Event, config: &TelegramConfig) -> Option<String> {
    match event {
        Event::FilingMatched(e) if config.notify_alerts => {
            let title = truncate(&e.title, 80);

            Some(format!(
                "🚨 *Filing Detected*\n\
                \n\
                📈 Ticker: `{}`\n\
                📋 Market: `{}`\n\
                📄 {}\n\
                🔗 `{}`",
                escape_markdown(&e.ticker),
                escape_markdown(&e.slug),
                escape_markdown(&title),
                e.filing_url
            ))
        }
        Event::MarketResolved(e) if config.notify_resolutions => {
            let (emoji, verdict) = match e.verdict {
                Verdict::Yes => ("✅", "YES"),
                Verdict::No => ("❌", "NO"),
                Verdict::Unknown => ("❓", "UNKNOWN"),
            };

            let mut msg = format!(
                "{} *Resolution: {}*\n\
                \n\
                📋 Market: `{}`\n\
                📈 Ticker: `{}`\n\
                ⏱ Oracle time: `{:.1}s`",
                emoji,
                verdict,
                escape_markdown(&e.slug),
                escape_markdown(&e.ticker),
                e.oracle_seconds
            );

            if let Some(price) = e.outcome_price {
                msg.push_str(&format!("\n💵 {} price: `{}`", verdict, price));
            }
            match (&e.order_id, e.dry_run) {
                (Some(order_id), true) => {
                    msg.push_str(&format!(
                        "\n🧪 Dry\\-run order: `{}`",
                        escape_markdown(order_id)
                    ));
                }
                (Some(order_id), false) => {
                    msg.push_str(&format!("\n🧾 Order: `{}`", escape_markdown(order_id)));
                }
                (None, _) => {}
            }
            if let Some(error) = &e.trade_error {
                let error = truncate(error, 120);
                msg.push_str(&format!("\n⚠️ Trade failed: {}", escape_markdown(&error)));
            }
            if !e.rationale.is_empty() {
                let rationale = truncate(&e.rationale, 200);
                msg.push_str(&format!("\n📝 _{}_", escape_markdown(&rationale)));
            }

            Some(msg)
        }
        Event::MarketExpired(e) => Some(format!(
            "⌛ *Market Expired*\n\
            \n\
            📋 Market: `{}`\n\
            📈 Ticker: `{}`\n\
            📅 Deadline: `{}`",
            escape_markdown(&e.slug),
            escape_markdown(&e.ticker),
            escape_markdown(&e.deadline.format("%Y-%m-%d %H:%M UTC").to_string())
        )),
        _ => None,
    }
}

/// Truncate a string with ellipsis (Unicode-safe).
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Escape special characters for Telegram `MarkdownV2`.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}
