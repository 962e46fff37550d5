use bitfinex_funding_bot::*;

use anyhow::Result;
use clap::Parser;
use config::{is_read_only, Args, BitfinexCredentials, Config};
use log::{error, info, warn};
use tokio::time::{sleep, Duration};

use client::BitfinexClient;
use execution::{AllocationPipeline, PipelineOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    info!("🚀 Starting Bitfinex Funding Bot");

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    // ===============================
    // API CLIENT
    // ===============================
    let credentials = BitfinexCredentials::from_env()?;
    let read_only = is_read_only();
    if read_only {
        warn!("📝 READ_ONLY mode: offers are logged, not submitted");
    }

    let client = BitfinexClient::new(&config.bitfinex, Some(credentials), read_only)?;

    info!(
        "⚙️  {} | max term {:?}d | batch {:.0} | min offer {:.0}",
        config.funding.symbol,
        config.funding.max_period_days,
        config.funding.batch_size,
        config.funding.min_offer_size
    );

    // ===============================
    // MAIN LOOP
    // ===============================
    let pipeline = AllocationPipeline::new(&client, &config.funding);
    let interval = Duration::from_secs(config.funding.check_interval_secs);

    loop {
        match pipeline.run().await {
            Ok(outcome) => report(&outcome),
            Err(e) if args.watch => error!("❌ Pipeline run failed: {:#}", e),
            Err(e) => return Err(e),
        }

        if !args.watch {
            return Ok(());
        }

        info!("⏳ Next run in {}s", interval.as_secs());
        sleep(interval).await;
    }
}

fn report(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::NoBalanceFound => info!("🏁 Done: no funding balance"),
        PipelineOutcome::ConditionsNotMet { .. } => info!("🏁 Done: conditions not met"),
        PipelineOutcome::Submitted { plan, .. } => {
            let failed = outcome.failures();
            if failed == 0 {
                info!("🏁 Done: {} offer(s) placed, {:.2} total", plan.len(), plan.total());
            } else {
                warn!("🏁 Done: {}/{} offer(s) failed", failed, plan.len());
            }
        }
    }
}
