use chrono::{DateTime, Utc};

use crate::domain::time::days_remaining;
use crate::domain::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Balance,
    Rates,
    Credits,
    Loans,
    Offers,
    Frr,
    Help,
}

impl BotCommand {
    /// Anything unrecognised maps to `Help`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        // "/rates@my_bot extra args" → "/rates"
        let word = text.split_whitespace().next().unwrap_or("");
        let word = word.split('@').next().unwrap_or("");

        match word {
            "/start" => BotCommand::Start,
            "/balance" | "查詢餘額" => BotCommand::Balance,
            "/rates" => BotCommand::Rates,
            "/credits" => BotCommand::Credits,
            "/loans" => BotCommand::Loans,
            "/offers" => BotCommand::Offers,
            "/frr" => BotCommand::Frr,
            _ => BotCommand::Help,
        }
    }
}

pub const HELP_TEXT: &str = "🤖 Commands:\n\
/balance (or 查詢餘額) idle funding balance\n\
/rates best book rates\n\
/credits active credits\n\
/loans active loans\n\
/offers resting offers\n\
/frr flash return rate";

pub fn format_start() -> String {
    format!("✅ Bot is running.\n\n{}", HELP_TEXT)
}

pub fn format_balance(currency: &str, values: &[f64]) -> String {
    if values.is_empty() {
        return format!("❗ No funding {} balance found", currency);
    }

    let lines: Vec<String> = values.iter().map(|v| format!("{:.2}", v)).collect();
    format!("💰 Funding {} available: {}", currency, lines.join(", "))
}

pub fn format_rates(symbol: &str, top: &[RateSummary]) -> String {
    if top.is_empty() {
        return format!("❗ {} book is empty", symbol);
    }

    let mut out = format!("📈 Top {} rates for {}", top.len(), symbol);
    for (i, r) in top.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {:.2}% APR | {}d | {}",
            i + 1,
            r.annual_rate_percent,
            r.period,
            r.amount
        ));
    }
    out
}

/// Credits and loans share one layout.
pub fn format_credits(title: &str, credits: &[FundingCredit], now: DateTime<Utc>) -> String {
    if credits.is_empty() {
        return format!("📭 No {}", title);
    }

    let total: f64 = credits.iter().map(|c| c.amount.abs()).sum();
    let mut out = format!("📋 {} {} (total {:.2})", credits.len(), title, total);

    for c in credits {
        let left = c
            .opened_at_ms
            .and_then(|ms| days_remaining(ms, c.period, now))
            .map(|d| format!("{}d left", d))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "\n#{} {:.2} @ {:.2}% APR | {}d | {} | {}",
            c.id,
            c.amount.abs(),
            c.annual_rate_percent,
            c.period,
            c.status,
            left
        ));
    }
    out
}

pub fn format_offers(offers: &[FundingOffer]) -> String {
    if offers.is_empty() {
        return "📭 No resting offers".to_string();
    }

    let mut out = format!("📝 {} resting offer(s)", offers.len());
    for o in offers {
        out.push_str(&format!(
            "\n#{} {} {:.2}/{:.2} @ {:.2}% APR | {}d | {}",
            o.id,
            o.offer_type,
            o.amount,
            o.amount_orig,
            annual_rate_percent(o.rate),
            o.period,
            o.status
        ));
    }
    out
}

pub fn format_frr(symbol: &str, stats: Option<&FrrStats>) -> String {
    match stats {
        None => format!("❗ No FRR data for {}", symbol),
        Some(s) => format!(
            "⚡ {} FRR {:.4}%/day ({:.2}% APR)\navg period {:.1}d | provided {:.0} | used {:.0}",
            symbol,
            s.daily_frr_percent,
            s.annual_frr_percent,
            s.avg_period,
            s.amount_provided,
            s.amount_used
        ),
    }
}
