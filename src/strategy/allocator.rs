use serde::{Deserialize, Serialize};

use crate::execution::errors::FundingError;

pub const DEFAULT_BATCH_SIZE: f64 = 200.0;
/// Bitfinex rejects funding offers below this notional.
pub const DEFAULT_MIN_OFFER_SIZE: f64 = 150.0;
/// Upper bound on offers per run.
pub const MAX_CHUNKS: usize = 1000;

/// Offer amounts in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub chunks: Vec<f64>,
}

impl AllocationPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.chunks.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.chunks.iter().copied()
    }
}

/// Split `balance` into `batch_size` chunks plus a remainder.
///
/// A trailing remainder below `min_offer_size` is folded into the previous
/// chunk, so a multi-chunk plan never holds an offer the exchange would
/// reject. A single-chunk plan is returned as-is even when it is small.
///
/// `min_offer_size` must lie in `0..=batch_size`, and the plan may hold at
/// most `MAX_CHUNKS` offers.
pub fn allocate(
    balance: f64,
    batch_size: f64,
    min_offer_size: f64,
) -> Result<AllocationPlan, FundingError> {
    if !balance.is_finite() || balance <= 0.0 {
        return Err(FundingError::InvalidInput(format!(
            "balance must be positive, got {}",
            balance
        )));
    }
    if !batch_size.is_finite() || batch_size <= 0.0 {
        return Err(FundingError::InvalidInput(format!(
            "batch size must be positive, got {}",
            batch_size
        )));
    }
    if !min_offer_size.is_finite() || min_offer_size < 0.0 || min_offer_size > batch_size {
        return Err(FundingError::InvalidInput(format!(
            "min offer size must be within 0..={}, got {}",
            batch_size, min_offer_size
        )));
    }

    let needed = (balance / batch_size).ceil();
    if needed > MAX_CHUNKS as f64 {
        return Err(FundingError::InvalidInput(format!(
            "{} / {} needs {} offers, limit is {}",
            balance, batch_size, needed, MAX_CHUNKS
        )));
    }

    let mut chunks = Vec::with_capacity(needed as usize);
    let mut remaining = balance;

    while remaining > batch_size {
        chunks.push(batch_size);
        remaining -= batch_size;
    }
    chunks.push(remaining);

    if chunks.len() > 1 && remaining < min_offer_size {
        if let Some(last) = chunks.pop() {
            if let Some(prev) = chunks.last_mut() {
                *prev += last;
            }
        }
    }

    Ok(AllocationPlan { chunks })
}

/// `allocate` with the exchange defaults (200 / 150).
pub fn allocate_default(balance: f64) -> Result<AllocationPlan, FundingError> {
    allocate(balance, DEFAULT_BATCH_SIZE, DEFAULT_MIN_OFFER_SIZE)
}
