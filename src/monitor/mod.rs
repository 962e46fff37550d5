use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use crate::client::BitfinexClient;
use crate::config::AlertConfig;
use crate::notify::TelegramClient;
use crate::wallet::balance::extract_funding_balance;

/// Result of one balance check.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceCheck {
    NoWallet,
    Checked { alerts: Vec<String>, quiet: Vec<f64> },
}

/// One alert line per balance strictly above `threshold`.
pub fn alert_messages(currency: &str, values: &[f64], threshold: f64) -> Vec<String> {
    values
        .iter()
        .filter(|v| **v > threshold)
        .map(|v| format!("🚨 Funding {} idle balance: {:.2} (> {})", currency, v, threshold))
        .collect()
}

pub struct BalanceMonitor {
    api: Arc<BitfinexClient>,
    telegram: TelegramClient,
    currency: String,
    threshold: f64,
    check_interval: Duration,
}

impl BalanceMonitor {
    pub fn new(
        api: Arc<BitfinexClient>,
        telegram: TelegramClient,
        currency: &str,
        alert: &AlertConfig,
    ) -> Self {
        Self {
            api,
            telegram,
            currency: currency.to_string(),
            threshold: alert.threshold,
            check_interval: Duration::from_secs(alert.check_interval_secs),
        }
    }

    /// Fetch wallets once and send an alert for every idle balance over the threshold.
    pub async fn check_once(&self) -> Result<BalanceCheck> {
        let wallets = self.api.get_wallets().await?;
        let values = extract_funding_balance(&wallets, &self.currency);

        if values.is_empty() {
            warn!("⚠️  No funding/{} wallet found", self.currency);
            return Ok(BalanceCheck::NoWallet);
        }

        let alerts = alert_messages(&self.currency, &values, self.threshold);
        let quiet: Vec<f64> = values.into_iter().filter(|v| *v <= self.threshold).collect();

        for msg in &alerts {
            info!("{}", msg);
            if let Err(e) = self.telegram.notify(msg).await {
                warn!("❌ Telegram alert failed: {:#}", e);
            }
        }
        for v in &quiet {
            info!("✅ {:.2} not above {}, no alert", v, self.threshold);
        }

        Ok(BalanceCheck::Checked { alerts, quiet })
    }

    /// Single check when the interval is zero, otherwise loop forever.
    pub async fn start_monitoring(&self) {
        info!("🎬 Balance monitor starting (threshold {})", self.threshold);

        loop {
            if let Err(e) = self.check_once().await {
                warn!("📊 Balance check error: {:#}", e);
            }

            if self.check_interval.is_zero() {
                break;
            }
            sleep(self.check_interval).await;
        }
    }
}
