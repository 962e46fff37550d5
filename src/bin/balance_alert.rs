use anyhow::Result;
use clap::Parser;
use log::info;
use std::sync::Arc;

use bitfinex_funding_bot::client::BitfinexClient;
use bitfinex_funding_bot::config::{Args, BitfinexCredentials, Config, TelegramCredentials};
use bitfinex_funding_bot::logging;
use bitfinex_funding_bot::monitor::BalanceMonitor;
use bitfinex_funding_bot::notify::TelegramClient;

/// Telegram alert when idle funding balance sits above `alert.threshold`.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let api = Arc::new(BitfinexClient::new(
        &config.bitfinex,
        Some(BitfinexCredentials::from_env()?),
        true,
    )?);
    let telegram = TelegramClient::new(&config.telegram, &TelegramCredentials::from_env()?)?;
    if telegram.chat_id.is_none() {
        anyhow::bail!("TG_CHAT_ID missing in .env");
    }

    info!("🔔 Watching funding {} balance", config.funding.currency);

    BalanceMonitor::new(api, telegram, &config.funding.currency, &config.alert)
        .start_monitoring()
        .await;

    Ok(())
}
