use chrono::{DateTime, TimeZone, Utc};

/// Millisecond nonce for authenticated requests.
pub fn nonce_ms() -> String {
    Utc::now().timestamp_millis().to_string()
}

pub fn format_mts(mts: i64) -> String {
    match Utc.timestamp_millis_opt(mts).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "-".to_string(),
    }
}

/// Days left on a loan opened at `opened_ms` for `period` days.
pub fn days_remaining(opened_ms: i64, period: u32, now: DateTime<Utc>) -> Option<i64> {
    let opened = Utc.timestamp_millis_opt(opened_ms).single()?;
    let end = opened + chrono::Duration::days(period as i64);
    let diff = end - now;

    if diff.num_seconds() <= 0 {
        return Some(0);
    }

    Some(diff.num_days())
}
