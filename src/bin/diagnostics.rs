use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use bitfinex_funding_bot::client::BitfinexClient;
use bitfinex_funding_bot::config::{is_read_only, BitfinexCredentials, Config};
use bitfinex_funding_bot::strategy::{normalize, select_best};
use bitfinex_funding_bot::wallet::extract_funding_balance;

// ==================================================
// DIAGNOSTICS STRUCTURE
// ==================================================
struct Diagnostic {
    name: String,
    status: DiagStatus,
    message: String,
}

enum DiagStatus {
    Pass,
    Warn,
    Fail,
}

impl DiagStatus {
    fn icon(&self) -> &str {
        match self {
            DiagStatus::Pass => "✅",
            DiagStatus::Warn => "⚠️ ",
            DiagStatus::Fail => "❌",
        }
    }
}

impl Diagnostic {
    fn pass(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: DiagStatus::Pass,
            message,
        }
    }

    fn warn(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: DiagStatus::Warn,
            message,
        }
    }

    fn fail(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: DiagStatus::Fail,
            message,
        }
    }
}

// ==================================================
// MAIN DIAGNOSTICS RUNNER
// ==================================================
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    print_header();

    let mut results = Vec::new();
    let total_tests = 6;

    print_test(1, total_tests, "Checking environment configuration");
    results.push(check_env_vars());

    print_test(2, total_tests, "Loading config.json");
    let config = match check_config() {
        Ok(cfg) => {
            results.push(Diagnostic::pass(
                "Config.json",
                format!(
                    "Config loaded\n   Symbol: {} ({})\n   Batch {:.0} / min offer {:.0}\n   Max term: {:?} days",
                    cfg.funding.symbol,
                    cfg.funding.precision,
                    cfg.funding.batch_size,
                    cfg.funding.min_offer_size,
                    cfg.funding.max_period_days
                ),
            ));
            cfg
        }
        Err(e) => {
            results.push(Diagnostic::fail("Config.json", format!("Failed to load: {:#}", e)));
            print_results(&results);
            return Ok(());
        }
    };

    let credentials = BitfinexCredentials::from_env().ok();
    let client = BitfinexClient::new(&config.bitfinex, credentials, true)?;

    print_test(3, total_tests, "Fetching public funding book");
    results.push(check_order_book(&client, &config).await);

    print_test(4, total_tests, "Fetching flash return rate");
    results.push(check_frr(&client, &config).await);

    print_test(5, total_tests, "Testing authenticated wallet read");
    results.push(check_wallets(&client, &config).await);

    print_test(6, total_tests, "Checking trading mode");
    results.push(check_trading_mode());

    print_results(&results);

    Ok(())
}

// ==================================================
// INDIVIDUAL TEST FUNCTIONS
// ==================================================

fn check_env_vars() -> Diagnostic {
    let required = ["BFX_API_KEY", "BFX_API_SECRET"];
    let optional = ["TG_BOT_TOKEN", "TG_CHAT_ID"];

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|var| std::env::var(var).is_err())
        .collect();
    let missing_optional: Vec<&str> = optional
        .iter()
        .copied()
        .filter(|var| std::env::var(var).is_err())
        .collect();

    if !missing.is_empty() {
        Diagnostic::fail("Environment Variables", format!("Missing: {}", missing.join(", ")))
    } else if !missing_optional.is_empty() {
        Diagnostic::warn(
            "Environment Variables",
            format!(
                "Bitfinex keys set\n   Telegram disabled, missing: {}",
                missing_optional.join(", ")
            ),
        )
    } else {
        Diagnostic::pass("Environment Variables", "All variables configured".to_string())
    }
}

fn check_config() -> Result<Config> {
    let path = PathBuf::from("config.json");
    Config::load(&path).context("Failed to load config.json")
}

async fn check_order_book(client: &BitfinexClient, config: &Config) -> Diagnostic {
    let cfg = &config.funding;

    let raw = match client
        .get_order_book(&cfg.symbol, cfg.precision, cfg.book_len)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return Diagnostic::fail("Funding Book", format!("Failed: {:#}", e)),
    };

    let book = normalize(&raw);
    match select_best(&book, cfg.max_period_days) {
        Ok(Some(best)) => Diagnostic::pass(
            "Funding Book",
            format!(
                "{} rows, {} unique periods\n   Best: {:.7}/day ({:.2}% APR) for {}d",
                raw.len(),
                book.len(),
                best.rate(),
                best.annual_rate_percent.unwrap_or_default(),
                best.period()
            ),
        ),
        Ok(None) => Diagnostic::warn(
            "Funding Book",
            format!("{} rows, none within {:?} days", raw.len(), cfg.max_period_days),
        ),
        Err(e) => Diagnostic::fail("Funding Book", e.to_string()),
    }
}

async fn check_frr(client: &BitfinexClient, config: &Config) -> Diagnostic {
    match client.get_frr_stats(&config.funding.symbol).await {
        Ok(Some(s)) => Diagnostic::pass(
            "FRR",
            format!(
                "{:.4}%/day ({:.2}% APR), avg period {:.1}d",
                s.daily_frr_percent, s.annual_frr_percent, s.avg_period
            ),
        ),
        Ok(None) => Diagnostic::warn("FRR", "No stats returned".to_string()),
        Err(e) => Diagnostic::fail("FRR", format!("Failed: {:#}", e)),
    }
}

async fn check_wallets(client: &BitfinexClient, config: &Config) -> Diagnostic {
    let currency = &config.funding.currency;

    match client.get_wallets().await {
        Ok(wallets) => {
            let values = extract_funding_balance(&wallets, currency);
            match values.first() {
                Some(v) => Diagnostic::pass(
                    "Wallets (auth)",
                    format!("{} wallets\n   Funding {}: {:.2}", wallets.len(), currency, v),
                ),
                None => Diagnostic::warn(
                    "Wallets (auth)",
                    format!("Authenticated, but no funding/{} wallet", currency),
                ),
            }
        }
        Err(e) => Diagnostic::fail("Wallets (auth)", format!("Failed: {:#}", e)),
    }
}

fn check_trading_mode() -> Diagnostic {
    if is_read_only() {
        Diagnostic::warn(
            "Trading Mode",
            "READ_ONLY=true (Safe mode)\n   Set READ_ONLY=false to submit offers".to_string(),
        )
    } else {
        Diagnostic::pass("Trading Mode", "READ_ONLY=false (Offers go live)".to_string())
    }
}

// ==================================================
// DISPLAY FUNCTIONS
// ==================================================

fn print_header() {
    println!("\n╔════════════════════════════════════════════════╗");
    println!("║   BITFINEX FUNDING BOT - DIAGNOSTICS           ║");
    println!("╚════════════════════════════════════════════════╝\n");
}

fn print_test(num: usize, total: usize, description: &str) {
    println!("[{}/{}] {}...", num, total, description);
}

fn print_results(results: &[Diagnostic]) {
    println!();

    let mut passed = 0;
    let mut warned = 0;
    let mut failed = 0;

    for diag in results {
        let name = match diag.status {
            DiagStatus::Pass => {
                passed += 1;
                diag.name.green()
            }
            DiagStatus::Warn => {
                warned += 1;
                diag.name.yellow()
            }
            DiagStatus::Fail => {
                failed += 1;
                diag.name.red()
            }
        };

        println!("{} {}", diag.status.icon(), name);
        for line in diag.message.lines() {
            println!("   {}", line);
        }
    }

    println!("\n╔════════════════════════════════════════════════╗");
    println!("║           DIAGNOSTICS SUMMARY                  ║");
    println!("╚════════════════════════════════════════════════╝");
    println!("\n✅ Passed:  {}", passed);
    println!("⚠️  Warnings: {}", warned);
    println!("❌ Failed:  {}", failed);

    if failed == 0 {
        println!("\n{}", "✅ Bot is ready!".green().bold());
    } else {
        println!(
            "\n{}",
            "❌ Bot has critical issues. Fix failures above before running.".red().bold()
        );
    }
    println!();
}
