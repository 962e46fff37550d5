use serde::{Deserialize, Serialize};

use crate::domain::{BookPrecision, OfferType};
use crate::strategy::allocator::{DEFAULT_BATCH_SIZE, DEFAULT_MIN_OFFER_SIZE};

/// Knobs of the allocation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingConfig {
    /// Wallet currency code, e.g. "UST".
    pub currency: String,
    /// Funding book symbol, e.g. "fUST".
    pub symbol: String,
    pub precision: BookPrecision,
    pub book_len: u32,

    /// Longest term considered when picking a rate. `null` = any term.
    pub max_period_days: Option<u32>,
    pub batch_size: f64,
    pub min_offer_size: f64,
    pub offer_type: OfferType,

    /// Pause between runs in `--watch` mode.
    pub check_interval_secs: u64,

    pub top_n: usize,
    pub history_limit: u32,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            currency: "UST".to_string(),
            symbol: "fUST".to_string(),
            precision: BookPrecision::P1,
            book_len: 25,
            max_period_days: Some(30),
            batch_size: DEFAULT_BATCH_SIZE,
            min_offer_size: DEFAULT_MIN_OFFER_SIZE,
            offer_type: OfferType::Limit,
            check_interval_secs: 600,
            top_n: 5,
            history_limit: 50,
        }
    }
}
