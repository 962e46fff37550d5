use anyhow::{anyhow, Context, Result};
use hmac::{Hmac, Mac};
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};
use sha2::Sha384;
use std::time::Duration;

use crate::config::{BitfinexConfig, BitfinexCredentials};
use crate::domain::time::nonce_ms;
use crate::domain::*;
use crate::execution::FundingVenue;

pub mod decode;

type HmacSha384 = Hmac<Sha384>;

/// Ledger category for margin funding interest payments.
pub const LEDGER_FUNDING_PAYMENT: u32 = 28;

#[derive(Clone)]
pub struct BitfinexClient {
    client: Client,

    pub api_url: String,
    pub public_api_url: String,

    credentials: Option<BitfinexCredentials>,

    pub read_only: bool,
}

// ==================================================
// CONSTRUCTOR
// ==================================================
impl BitfinexClient {
    pub fn new(
        config: &BitfinexConfig,
        credentials: Option<BitfinexCredentials>,
        read_only: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            public_api_url: config.public_api_url.trim_end_matches('/').to_string(),
            credentials,
            read_only,
        })
    }

    /// Client for public endpoints only.
    pub fn public(config: &BitfinexConfig) -> Result<Self> {
        Self::new(config, None, true)
    }

    // ==================================================
    // REQUEST SIGNING (HMAC-SHA384)
    // ==================================================
    fn credentials(&self) -> Result<&BitfinexCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| anyhow!("authenticated endpoint called without BFX credentials"))
    }

    async fn auth_post(&self, endpoint: &str, payload: Option<&Value>) -> Result<Value> {
        let creds = self.credentials()?;
        let body = match payload {
            Some(p) => serde_json::to_string(p)?,
            None => String::new(),
        };
        let nonce = nonce_ms();
        let signature = sign_request(&creds.api_secret, endpoint, &nonce, &body)?;

        let url = format!("{}/{}", self.api_url, endpoint);
        debug!("POST {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("bfx-apikey", &creds.api_key)
            .header("bfx-nonce", &nonce)
            .header("bfx-signature", signature);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.with_context(|| format!("POST {}", endpoint))?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            anyhow::bail!("API error {} on {}: {}", status, endpoint, text);
        }

        serde_json::from_str(&text).with_context(|| format!("invalid JSON from {}", endpoint))
    }

    async fn public_get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.public_api_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {}", path))?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            anyhow::bail!("API error {} on {}: {}", status, path, text);
        }

        serde_json::from_str(&text).with_context(|| format!("invalid JSON from {}", path))
    }

    // ==================================================
    // PUBLIC MARKET DATA
    // ==================================================
    pub async fn get_order_book(
        &self,
        symbol: &str,
        precision: BookPrecision,
        len: u32,
    ) -> Result<Vec<OrderBookRow>> {
        let path = format!("book/{}/{}", symbol, precision);
        let data = self.public_get(&path, &[("len", len.to_string())]).await?;
        Ok(decode::order_book(&data, precision))
    }

    pub async fn get_frr_stats(&self, symbol: &str) -> Result<Option<FrrStats>> {
        let path = format!("funding/stats/{}/hist", symbol);
        let data = self.public_get(&path, &[("limit", "1".to_string())]).await?;
        Ok(decode::frr_stats(&data))
    }

    // ==================================================
    // ACCOUNT READS
    // ==================================================
    pub async fn get_wallets(&self) -> Result<Vec<WalletEntry>> {
        let data = self.auth_post("auth/r/wallets", None).await?;
        Ok(decode::wallets(&data))
    }

    /// Active variable-rate credits currently lent out.
    pub async fn get_funding_credits(&self, symbol: &str) -> Result<Vec<FundingCredit>> {
        let endpoint = format!("auth/r/funding/credits/{}", symbol);
        let data = self.auth_post(&endpoint, None).await?;
        Ok(decode::funding_credits(&data))
    }

    /// Lending history, newest first.
    pub async fn get_funding_credits_history(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<FundingCredit>> {
        let endpoint = format!("auth/r/funding/credits/{}/hist", symbol);
        let payload = json!({ "limit": limit });
        let data = self.auth_post(&endpoint, Some(&payload)).await?;
        Ok(decode::funding_credits(&data))
    }

    /// Fixed-rate loans taken by borrowers.
    pub async fn get_funding_loans(&self, symbol: &str) -> Result<Vec<FundingCredit>> {
        let endpoint = format!("auth/r/funding/loans/{}", symbol);
        let data = self.auth_post(&endpoint, None).await?;
        Ok(decode::funding_credits(&data))
    }

    /// Offers still waiting in the book.
    pub async fn get_funding_offers(&self, symbol: &str) -> Result<Vec<FundingOffer>> {
        let endpoint = format!("auth/r/funding/offers/{}", symbol);
        let data = self.auth_post(&endpoint, None).await?;
        Ok(decode::funding_offers(&data))
    }

    /// Interest paid into the funding wallet.
    pub async fn get_interest_payments(
        &self,
        currency: &str,
        limit: u32,
    ) -> Result<Vec<LedgerEntry>> {
        let endpoint = format!("auth/r/ledgers/{}/hist", currency);
        let payload = json!({
            "category": LEDGER_FUNDING_PAYMENT,
            "wallet": "funding",
            "limit": limit,
        });
        let data = self.auth_post(&endpoint, Some(&payload)).await?;
        Ok(decode::ledger_entries(&data))
    }

    // ==================================================
    // OFFER SUBMISSION
    // ==================================================
    pub async fn submit_funding_offer(&self, request: &OfferRequest) -> Result<OfferResult> {
        let payload = request.payload();

        if self.read_only {
            info!(
                "📝 [READ-ONLY] Would submit {} {} {} @ {} for {}d",
                payload.offer_type, payload.symbol, payload.amount, payload.rate, payload.period
            );
            return Ok(OfferResult::dry_run(request));
        }

        let body = serde_json::to_value(&payload)?;
        let data = self
            .auth_post("auth/w/funding/offer/submit", Some(&body))
            .await?;

        Ok(decode::offer_notification(&data, request))
    }
}

impl FundingVenue for BitfinexClient {
    async fn wallets(&self) -> Result<Vec<WalletEntry>> {
        self.get_wallets().await
    }

    async fn order_book(
        &self,
        symbol: &str,
        precision: BookPrecision,
        len: u32,
    ) -> Result<Vec<OrderBookRow>> {
        self.get_order_book(symbol, precision, len).await
    }

    async fn submit_offer(&self, request: &OfferRequest) -> Result<OfferResult> {
        self.submit_funding_offer(request).await
    }
}

/// hex(HMAC-SHA384(secret, "/api/v2/{endpoint}{nonce}{body}"))
pub fn sign_request(secret: &str, endpoint: &str, nonce: &str, body: &str) -> Result<String> {
    let message = format!("/api/v2/{}{}{}", endpoint, nonce, body);

    let mut mac = HmacSha384::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow!("HMAC init failed: {}", e))?;
    mac.update(message.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
