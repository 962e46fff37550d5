use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::{TelegramConfig, TelegramCredentials};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
    /// Alert destination; also the only chat the bot answers when set.
    pub chat_id: Option<i64>,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, credentials: &TelegramCredentials) -> Result<Self> {
        // long polling holds the request open for poll_timeout_secs
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .context("HTTP client")?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                credentials.bot_token
            ),
            poll_timeout_secs: config.poll_timeout_secs,
            chat_id: credentials.chat_id,
        })
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/sendMessage", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("Telegram sendMessage")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage failed: {} {}", status, body);
        }

        debug!("📨 sent {} chars to chat {}", text.len(), chat_id);
        Ok(())
    }

    /// Send to the configured alert chat.
    pub async fn notify(&self, text: &str) -> Result<()> {
        let chat_id = self
            .chat_id
            .context("TG_CHAT_ID missing in .env, cannot send alerts")?;
        self.send_message(chat_id, text).await
    }

    /// Long-poll for updates newer than `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!("{}/getUpdates", self.base_url);
        let response: ApiResponse<Vec<Update>> = self
            .client
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout_secs.to_string()),
            ])
            .send()
            .await
            .context("Telegram getUpdates")?
            .json()
            .await
            .context("Telegram getUpdates JSON")?;

        if !response.ok {
            anyhow::bail!(
                "Telegram getUpdates failed: {}",
                response.description.unwrap_or_default()
            );
        }

        Ok(response.result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_updates_payload() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {"message_id": 1, "chat": {"id": 42, "type": "private"}, "text": "/balance"}},
                {"update_id": 11, "edited_message": {"message_id": 1}}
            ]
        }"#;

        let parsed: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = parsed.result.unwrap();

        assert_eq!(updates.len(), 2);
        let msg = updates[0].message.as_ref().unwrap();
        assert_eq!(msg.chat.id, 42);
        assert_eq!(msg.text.as_deref(), Some("/balance"));
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn notify_without_chat_id_fails_fast() {
        let client = TelegramClient::new(
            &TelegramConfig::default(),
            &TelegramCredentials {
                bot_token: "123:abc".into(),
                chat_id: None,
            },
        )
        .unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        assert!(rt.block_on(client.notify("hi")).is_err());
    }
}
