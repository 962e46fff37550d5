use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use colored::Colorize;

use bitfinex_funding_bot::bot::commands::*;
use bitfinex_funding_bot::client::BitfinexClient;
use bitfinex_funding_bot::config::{Args, BitfinexCredentials, Config};
use bitfinex_funding_bot::domain::time::format_mts;
use bitfinex_funding_bot::logging;
use bitfinex_funding_bot::strategy::{normalize, select_best, top_n};
use bitfinex_funding_bot::wallet::funding_wallets;

// ==================================================
// ONE-SHOT ACCOUNT REPORT
// ==================================================
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let cfg = &config.funding;

    let client = BitfinexClient::new(
        &config.bitfinex,
        Some(BitfinexCredentials::from_env()?),
        true,
    )?;
    let now = Utc::now();

    section("Funding wallets");
    let wallets = client.get_wallets().await?;
    for w in funding_wallets(&wallets) {
        println!(
            "  {:<6} balance {:>12.2} | available {:>12.2} | unsettled interest {:.6}",
            w.currency,
            w.balance,
            w.lendable(),
            w.unsettled_interest
        );
    }

    section("Book");
    let raw = client
        .get_order_book(&cfg.symbol, cfg.precision, cfg.book_len)
        .await?;
    println!("{}", format_rates(&cfg.symbol, &top_n(&normalize(&raw), cfg.top_n)));

    section("FRR");
    println!(
        "{}",
        format_frr(&cfg.symbol, client.get_frr_stats(&cfg.symbol).await?.as_ref())
    );

    section("Credits");
    let credits = client.get_funding_credits(&cfg.symbol).await?;
    println!("{}", format_credits("credits", &credits, now));

    section("Loans");
    let loans = client.get_funding_loans(&cfg.symbol).await?;
    println!("{}", format_credits("loans", &loans, now));

    section("Offers");
    println!("{}", format_offers(&client.get_funding_offers(&cfg.symbol).await?));

    section("Lending history");
    let history = client
        .get_funding_credits_history(&cfg.symbol, cfg.history_limit)
        .await?;
    if history.is_empty() {
        println!("📭 No lending history");
    } else {
        match select_best(&history, cfg.max_period_days)? {
            Some(best) => println!(
                "🏆 Best of last {}: {:.2}% APR for {}d (#{})",
                history.len(),
                best.annual_rate_percent,
                best.period,
                best.id
            ),
            None => println!(
                "📭 None of the last {} within {:?} days",
                history.len(),
                cfg.max_period_days
            ),
        }
    }

    section("Interest payments");
    let payments = client
        .get_interest_payments(&cfg.currency, cfg.history_limit)
        .await?;
    let total: f64 = payments.iter().map(|p| p.amount).sum();
    for p in &payments {
        println!("  {} {:>12.6} {}", format_mts(p.mts), p.amount, p.currency);
    }
    println!("  total {:.6} {} over {} payment(s)", total, cfg.currency, payments.len());

    Ok(())
}

fn section(title: &str) {
    println!("\n{}", format!("=== {} ===", title).cyan().bold());
}
