use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use crate::client::BitfinexClient;
use crate::config::FundingConfig;
use crate::notify::telegram::{Message, TelegramClient};
use crate::strategy::{normalize, top_n};
use crate::wallet::balance::extract_funding_balance;

pub mod commands;

pub use commands::BotCommand;
use commands::*;

/// Telegram long-poll loop answering account queries.
pub struct BotListener {
    api: Arc<BitfinexClient>,
    telegram: TelegramClient,
    funding: FundingConfig,
}

impl BotListener {
    pub fn new(api: Arc<BitfinexClient>, telegram: TelegramClient, funding: FundingConfig) -> Self {
        Self {
            api,
            telegram,
            funding,
        }
    }

    /// With `TG_CHAT_ID` set, every other chat is ignored.
    pub fn accepts(&self, chat_id: i64) -> bool {
        self.telegram.chat_id.map_or(true, |allowed| allowed == chat_id)
    }

    pub async fn run(&self) {
        info!("✅ Telegram bot listening...");
        let mut offset = 0i64;

        loop {
            let updates = match self.telegram.get_updates(offset).await {
                Ok(u) => u,
                Err(e) => {
                    warn!("⚠️  getUpdates failed: {:#}", e);
                    sleep(Duration::from_secs(5)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(message) = update.message {
                    self.handle(&message).await;
                }
            }
        }
    }

    async fn handle(&self, message: &Message) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        if !self.accepts(message.chat.id) {
            warn!("🚫 Ignoring chat {}", message.chat.id);
            return;
        }

        let command = BotCommand::parse(text);
        info!("💬 chat {} → {:?}", message.chat.id, command);

        let reply = match self.answer(command).await {
            Ok(r) => r,
            Err(e) => format!("❌ API error:\n{:#}", e),
        };

        if let Err(e) = self.telegram.send_message(message.chat.id, &reply).await {
            warn!("❌ Reply to chat {} failed: {:#}", message.chat.id, e);
        }
    }

    pub async fn answer(&self, command: BotCommand) -> Result<String> {
        let cfg = &self.funding;

        let reply = match command {
            BotCommand::Start => format_start(),
            BotCommand::Help => HELP_TEXT.to_string(),
            BotCommand::Balance => {
                let wallets = self.api.get_wallets().await?;
                format_balance(&cfg.currency, &extract_funding_balance(&wallets, &cfg.currency))
            }
            BotCommand::Rates => {
                let raw = self
                    .api
                    .get_order_book(&cfg.symbol, cfg.precision, cfg.book_len)
                    .await?;
                format_rates(&cfg.symbol, &top_n(&normalize(&raw), cfg.top_n))
            }
            BotCommand::Credits => {
                let credits = self.api.get_funding_credits(&cfg.symbol).await?;
                format_credits("credits", &credits, Utc::now())
            }
            BotCommand::Loans => {
                let loans = self.api.get_funding_loans(&cfg.symbol).await?;
                format_credits("loans", &loans, Utc::now())
            }
            BotCommand::Offers => format_offers(&self.api.get_funding_offers(&cfg.symbol).await?),
            BotCommand::Frr => {
                let stats = self.api.get_frr_stats(&cfg.symbol).await?;
                format_frr(&cfg.symbol, stats.as_ref())
            }
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BitfinexConfig, TelegramConfig, TelegramCredentials};

    fn listener(chat_id: Option<i64>) -> BotListener {
        let api = Arc::new(BitfinexClient::public(&BitfinexConfig::default()).unwrap());
        let telegram = TelegramClient::new(
            &TelegramConfig::default(),
            &TelegramCredentials {
                bot_token: "123:abc".into(),
                chat_id,
            },
        )
        .unwrap();
        BotListener::new(api, telegram, FundingConfig::default())
    }

    #[test]
    fn restricted_to_configured_chat() {
        let bot = listener(Some(42));
        assert!(bot.accepts(42));
        assert!(!bot.accepts(7));
    }

    #[test]
    fn open_when_no_chat_configured() {
        assert!(listener(None).accepts(7));
    }

    #[tokio::test]
    async fn offline_commands_need_no_exchange() {
        let bot = listener(None);
        assert_eq!(bot.answer(BotCommand::Help).await.unwrap(), HELP_TEXT);
        assert!(bot.answer(BotCommand::Start).await.unwrap().contains("/balance"));
    }

    #[tokio::test]
    async fn account_commands_fail_without_credentials() {
        let bot = listener(None);
        assert!(bot.answer(BotCommand::Balance).await.is_err());
    }
}
