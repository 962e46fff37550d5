use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub mod funding;

pub use funding::FundingConfig;

/* =======================
CLI ARGS
======================= */

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Keep running, one pipeline pass every `check_interval_secs`
    #[arg(short, long)]
    pub watch: bool,
}

/* =======================
MAIN CONFIG
======================= */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bitfinex: BitfinexConfig,
    #[serde(default)]
    pub funding: FundingConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub alert: AlertConfig,
}

/* =======================
BITFINEX CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitfinexConfig {
    /// Authenticated REST root.
    pub api_url: String,
    /// Public REST root (book, funding stats).
    pub public_api_url: String,
    pub timeout_secs: u64,
}

impl Default for BitfinexConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.bitfinex.com/v2".to_string(),
            public_api_url: "https://api-pub.bitfinex.com/v2".to_string(),
            timeout_secs: 10,
        }
    }
}

/* =======================
TELEGRAM CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub api_url: String,
    /// Long-poll timeout for getUpdates.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

/* =======================
BALANCE ALERT CONFIG
======================= */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Notify when an idle funding balance is strictly above this.
    pub threshold: f64,
    /// `0` runs a single check and exits.
    pub check_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            check_interval_secs: 0,
        }
    }
}

/* =======================
LOAD / CREATE CONFIG
======================= */

impl Config {
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            let cfg = Config::default();
            let content = serde_json::to_string_pretty(&cfg)?;
            std::fs::write(path, content)?;
            Ok(cfg)
        }
    }
}

/* =======================
SECRETS (.env)
======================= */

#[derive(Clone)]
pub struct BitfinexCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl BitfinexCredentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_key: env::var("BFX_API_KEY").context("BFX_API_KEY missing in .env")?,
            api_secret: env::var("BFX_API_SECRET").context("BFX_API_SECRET missing in .env")?,
        })
    }
}

// never print the secret
impl std::fmt::Debug for BitfinexCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitfinexCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub bot_token: String,
    /// Only this chat gets alerts and bot answers when set.
    pub chat_id: Option<i64>,
}

impl TelegramCredentials {
    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token = env::var("TG_BOT_TOKEN").context("TG_BOT_TOKEN missing in .env")?;
        let chat_id = match env::var("TG_CHAT_ID") {
            Ok(v) => Some(
                v.trim()
                    .parse::<i64>()
                    .with_context(|| format!("TG_CHAT_ID is not a chat id: {}", v))?,
            ),
            Err(_) => None,
        };

        Ok(Self { bot_token, chat_id })
    }
}

// ==================================================
// ENVIRONMENT HELPERS
// ==================================================

/// Dry-run offer submission unless `READ_ONLY=false`.
pub fn is_read_only() -> bool {
    env::var("READ_ONLY")
        .unwrap_or_else(|_| "true".to_string())
        .parse()
        .unwrap_or(true)
}
