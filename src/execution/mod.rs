use anyhow::Result;
use std::future::Future;

use crate::domain::*;

pub mod errors;
pub mod pipeline;

pub use errors::FundingError;
pub use pipeline::{AllocationPipeline, PipelineOutcome, PipelineStage};

/// Everything the allocation pipeline needs from the exchange.
///
/// Calls are awaited one at a time; timeouts and retries, if any, belong to
/// the implementation.
pub trait FundingVenue {
    fn wallets(&self) -> impl Future<Output = Result<Vec<WalletEntry>>>;

    fn order_book(
        &self,
        symbol: &str,
        precision: BookPrecision,
        len: u32,
    ) -> impl Future<Output = Result<Vec<OrderBookRow>>>;

    fn submit_offer(&self, request: &OfferRequest) -> impl Future<Output = Result<OfferResult>>;
}
