use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::FundingConfig;
use crate::domain::*;
use crate::execution::FundingVenue;
use crate::logging::{log_offer_result, log_skipped};
use crate::strategy::{allocate, normalize, select_best, AllocationPlan};
use crate::wallet::balance::extract_funding_balance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    FetchBalance,
    FetchBook,
    SelectRate,
    Decide,
    Allocate,
    Submit,
    Done,
}

/// How a run ended. Only `Submitted` touched the exchange's write side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineOutcome {
    /// No funding wallet for the configured currency.
    NoBalanceFound,
    /// Balance too small, or no rate within the term limit.
    ConditionsNotMet {
        balance: f64,
        best: Option<AnnotatedRow>,
    },
    Submitted {
        balance: f64,
        best: AnnotatedRow,
        plan: AllocationPlan,
        results: Vec<OfferResult>,
    },
}

impl PipelineOutcome {
    pub fn results(&self) -> &[OfferResult] {
        match self {
            PipelineOutcome::Submitted { results, .. } => results,
            _ => &[],
        }
    }

    /// Offers the exchange did not accept; non-zero should alert someone.
    pub fn failures(&self) -> usize {
        self.results().iter().filter(|r| !r.status.is_ok()).count()
    }
}

/// Admission check between rate selection and allocation.
pub fn should_offer(balance: f64, best: Option<&AnnotatedRow>, min_offer_size: f64) -> bool {
    balance > min_offer_size && best.is_some()
}

/// balance → book → rate → decision → allocation → offers, once.
pub struct AllocationPipeline<'a, V> {
    venue: &'a V,
    config: &'a FundingConfig,
}

impl<'a, V: FundingVenue> AllocationPipeline<'a, V> {
    pub fn new(venue: &'a V, config: &'a FundingConfig) -> Self {
        Self { venue, config }
    }

    fn enter(&self, stage: PipelineStage) {
        debug!("pipeline → {:?}", stage);
    }

    pub async fn run(&self) -> Result<PipelineOutcome> {
        let cfg = self.config;

        self.enter(PipelineStage::FetchBalance);
        let wallets = self.venue.wallets().await.context("fetching wallets")?;
        let balance = match extract_funding_balance(&wallets, &cfg.currency).first() {
            Some(b) => *b,
            None => {
                warn!("⚠️  No funding/{} wallet found", cfg.currency);
                return Ok(PipelineOutcome::NoBalanceFound);
            }
        };
        info!("💰 Funding {} available: {:.2}", cfg.currency, balance);

        self.enter(PipelineStage::FetchBook);
        let raw = self
            .venue
            .order_book(&cfg.symbol, cfg.precision, cfg.book_len)
            .await
            .with_context(|| format!("fetching {} book", cfg.symbol))?;
        let book = normalize(&raw);
        debug!("{} raw rows → {} unique periods", raw.len(), book.len());

        self.enter(PipelineStage::SelectRate);
        let best = select_best(&book, cfg.max_period_days)?.copied();

        self.enter(PipelineStage::Decide);
        let best = match best {
            Some(b) if should_offer(balance, Some(&b), cfg.min_offer_size) => b,
            _ => {
                log_skipped(balance, cfg.min_offer_size, best.as_ref());
                return Ok(PipelineOutcome::ConditionsNotMet { balance, best });
            }
        };
        info!(
            "📈 Best rate: {:.7}/day ({:.2}% APR) for {} days",
            best.rate(),
            best.annual_rate_percent.unwrap_or_default(),
            best.period()
        );

        self.enter(PipelineStage::Allocate);
        let plan = allocate(balance, cfg.batch_size, cfg.min_offer_size)?;
        info!("📊 Splitting {:.2} into {} offer(s)", balance, plan.len());

        self.enter(PipelineStage::Submit);
        let mut results = Vec::with_capacity(plan.len());
        for (i, amount) in plan.iter().enumerate() {
            let request = OfferRequest {
                offer_type: cfg.offer_type,
                symbol: cfg.symbol.clone(),
                amount,
                rate: best.rate(),
                period: best.period(),
                flags: 0,
            };

            let result = match self.venue.submit_offer(&request).await {
                Ok(r) => r,
                Err(e) => OfferResult::failed(&request, format!("{:#}", e)),
            };
            log_offer_result(i + 1, plan.len(), &result);
            results.push(result);
        }

        self.enter(PipelineStage::Done);
        Ok(PipelineOutcome::Submitted {
            balance,
            best,
            plan,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best() -> AnnotatedRow {
        AnnotatedRow {
            row: OrderBookRow {
                rate: 0.0002,
                period: 10,
                count: 1,
                amount: -500.0,
            },
            annual_rate_percent: Some(7.3),
        }
    }

    #[test]
    fn admission_needs_balance_above_minimum_and_a_rate() {
        assert!(should_offer(151.0, Some(&best()), 150.0));
        assert!(!should_offer(150.0, Some(&best()), 150.0));
        assert!(!should_offer(1000.0, None, 150.0));
    }

    #[test]
    fn failures_count_only_rejected_offers() {
        let req = OfferRequest::limit("fUST", 200.0, 0.0002, 10);
        let outcome = PipelineOutcome::Submitted {
            balance: 400.0,
            best: best(),
            plan: AllocationPlan {
                chunks: vec![200.0, 200.0],
            },
            results: vec![
                OfferResult::dry_run(&req),
                OfferResult::failed(&req, "timeout".into()),
            ],
        };

        assert_eq!(outcome.failures(), 1);
        assert_eq!(PipelineOutcome::NoBalanceFound.failures(), 0);
    }
}
