use log::{info, warn};

use crate::domain::{AnnotatedRow, OfferResult};

/// Initialise env_logger, defaulting to `info` when `RUST_LOG` is unset.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub fn log_offer_result(index: usize, total: usize, result: &OfferResult) {
    if result.status.is_ok() {
        info!(
            "✅ Offer {}/{} {:?}: {:.2} @ {:.7} for {}d — {}",
            index, total, result.status, result.amount, result.rate, result.period, result.description
        );
    } else {
        warn!(
            "❌ Offer {}/{} {:?}: {:.2} @ {:.7} for {}d — {}",
            index, total, result.status, result.amount, result.rate, result.period, result.description
        );
    }
}

pub fn log_skipped(balance: f64, min_offer_size: f64, best: Option<&AnnotatedRow>) {
    match best {
        None => info!("⏸️  No rate within the term limit, nothing offered"),
        Some(_) => info!(
            "⏸️  Balance {:.2} not above minimum offer {:.2}, nothing offered",
            balance, min_offer_size
        ),
    }
}
