use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use bitfinex_funding_bot::bot::BotListener;
use bitfinex_funding_bot::client::BitfinexClient;
use bitfinex_funding_bot::config::{Args, BitfinexCredentials, Config, TelegramCredentials};
use bitfinex_funding_bot::logging;
use bitfinex_funding_bot::notify::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    // queries only, never submits
    let api = Arc::new(BitfinexClient::new(
        &config.bitfinex,
        Some(BitfinexCredentials::from_env()?),
        true,
    )?);
    let telegram = TelegramClient::new(&config.telegram, &TelegramCredentials::from_env()?)?;

    BotListener::new(api, telegram, config.funding).run().await;

    Ok(())
}
