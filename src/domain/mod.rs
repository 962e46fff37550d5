use serde::{Deserialize, Serialize};
use std::fmt;

pub mod offer;
pub mod offer_result;
pub mod time;

pub use offer::{OfferRequest, OfferType};
pub use offer_result::{OfferResult, OfferStatus};

// ==================================================
// FUNDING BOOK
// ==================================================

/// One level of the public funding book.
///
/// `amount` keeps the exchange sign: negative rows sit on the offer side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookRow {
    /// Daily rate as a fraction (0.0002 = 0.02% per day).
    pub rate: f64,
    /// Loan term in days.
    pub period: u32,
    pub count: u32,
    pub amount: f64,
}

/// Field selector used to parameterize dedup and annualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookField {
    Rate,
    Period,
    Count,
    Amount,
}

impl BookField {
    pub fn value(&self, row: &OrderBookRow) -> f64 {
        match self {
            BookField::Rate => row.rate,
            BookField::Period => row.period as f64,
            BookField::Count => row.count as f64,
            BookField::Amount => row.amount,
        }
    }
}

/// Book aggregation level accepted by `GET book/{symbol}/{precision}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookPrecision {
    P0,
    P1,
    P2,
    P3,
    P4,
    R0,
}

impl BookPrecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookPrecision::P0 => "P0",
            BookPrecision::P1 => "P1",
            BookPrecision::P2 => "P2",
            BookPrecision::P3 => "P3",
            BookPrecision::P4 => "P4",
            BookPrecision::R0 => "R0",
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, BookPrecision::R0)
    }
}

impl fmt::Display for BookPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A book row with its annualized rate appended.
///
/// `annual_rate_percent` is `None` when the source value was not a finite
/// number; such rows are carried along but never selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotatedRow {
    #[serde(flatten)]
    pub row: OrderBookRow,
    pub annual_rate_percent: Option<f64>,
}

impl AnnotatedRow {
    pub fn rate(&self) -> f64 {
        self.row.rate
    }

    pub fn period(&self) -> u32 {
        self.row.period
    }
}

/// Deduplicated, annotated book in exchange order.
pub type NormalizedBook = Vec<AnnotatedRow>;

/// One line of the top-N rate summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSummary {
    pub annual_rate_percent: f64,
    pub period: u32,
    pub amount: i64,
}

// ==================================================
// WALLETS
// ==================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    Exchange,
    Margin,
    Funding,
    Other(String),
}

impl WalletType {
    pub fn parse(s: &str) -> Self {
        match s {
            "exchange" => WalletType::Exchange,
            "margin" => WalletType::Margin,
            "funding" => WalletType::Funding,
            other => WalletType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletEntry {
    pub wallet_type: WalletType,
    pub currency: String,
    pub balance: f64,
    pub unsettled_interest: f64,
    /// Not every wallet snapshot reports this; `None` means "use `balance`".
    pub available_balance: Option<f64>,
}

impl WalletEntry {
    pub fn lendable(&self) -> f64 {
        self.available_balance.unwrap_or(self.balance)
    }
}

// ==================================================
// ACCOUNT FUNDING STATE
// ==================================================

/// A funding credit or loan as reported by the account endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingCredit {
    pub id: u64,
    pub symbol: String,
    pub amount: f64,
    pub status: String,
    pub rate: f64,
    pub period: u32,
    pub annual_rate_percent: f64,
    pub opened_at_ms: Option<i64>,
}

impl FundingCredit {
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }
}

/// An offer currently resting in the funding book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingOffer {
    pub id: u64,
    pub symbol: String,
    pub amount: f64,
    pub amount_orig: f64,
    pub offer_type: String,
    pub status: String,
    pub rate: f64,
    pub period: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub currency: String,
    pub mts: i64,
    pub amount: f64,
    pub balance: f64,
    pub description: String,
}

/// Latest flash return rate snapshot from `funding/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrrStats {
    pub mts: i64,
    /// Daily FRR as a fraction.
    pub frr: f64,
    pub daily_frr_percent: f64,
    pub annual_frr_percent: f64,
    pub avg_period: f64,
    pub amount_provided: f64,
    pub amount_used: f64,
}

/// `round(daily * 365 * 100, 2)`
pub fn annual_rate_percent(daily_rate: f64) -> f64 {
    round_dp(daily_rate * 365.0 * 100.0, 2)
}

pub fn round_dp(value: f64, dp: i32) -> f64 {
    let scale = 10f64.powi(dp);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annualizes_daily_rate_to_two_decimals() {
        assert_eq!(annual_rate_percent(0.0003965), 14.47);
        assert_eq!(annual_rate_percent(0.0003287), 12.0);
        assert_eq!(annual_rate_percent(0.0002), 7.3);
    }

    #[test]
    fn lendable_falls_back_to_balance() {
        let mut w = WalletEntry {
            wallet_type: WalletType::Funding,
            currency: "UST".into(),
            balance: 310.5,
            unsettled_interest: 0.0,
            available_balance: None,
        };
        assert_eq!(w.lendable(), 310.5);

        w.available_balance = Some(12.25);
        assert_eq!(w.lendable(), 12.25);
    }

    #[test]
    fn wallet_type_keeps_unknown_names() {
        assert_eq!(WalletType::parse("funding"), WalletType::Funding);
        assert_eq!(
            WalletType::parse("deriv"),
            WalletType::Other("deriv".to_string())
        );
    }
}
