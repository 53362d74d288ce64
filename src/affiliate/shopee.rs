use crate::error::{BotError, Result};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_BASE_URL: &str = "https://open-api.affiliate.shopee.com.br";
const SHORT_LINK_PATH: &str = "/v2/affiliate/link/generate";

/// Client for the Shopee affiliate short-link endpoint. Requests carry an
/// HMAC-SHA256 signature over `partner_id + timestamp + path`, keyed by the
/// partner key.
pub struct ShopeeShortLinkClient {
    client: reqwest::Client,
    partner_id: String,
    partner_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ShortLinkResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<ShortLinkData>,
}

#[derive(Debug, Deserialize)]
struct ShortLinkData {
    short_link: String,
}

impl ShopeeShortLinkClient {
    pub fn new(client: reqwest::Client, partner_id: String, partner_key: String) -> Self {
        Self {
            client,
            partner_id,
            partner_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API host. Tests point this at a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn authorization_header(&self, timestamp: i64) -> Result<String> {
        let message = format!("{}{}{}", self.partner_id, timestamp, SHORT_LINK_PATH);
        let mut mac = HmacSha256::new_from_slice(self.partner_key.as_bytes())
            .map_err(|e| BotError::Config(format!("invalid Shopee partner key: {e}")))?;
        mac.update(message.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!(
            "SHA256 Credential={}, Timestamp={}, Signature={}",
            self.partner_id, timestamp, signature
        ))
    }

    /// Requests a short affiliate link for a product URL.
    pub async fn short_link(&self, product_url: &str) -> Result<String> {
        let timestamp = Utc::now().timestamp();
        let authorization = self.authorization_header(timestamp)?;
        let url = format!("{}{}", self.base_url, SHORT_LINK_PATH);

        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .json(&serde_json::json!({ "origin_url": product_url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Parse(format!(
                "Shopee short-link API returned HTTP {status}: {body}"
            )));
        }

        let parsed: ShortLinkResponse = response.json().await?;
        if parsed.code != 0 {
            return Err(BotError::Parse(format!(
                "Shopee short-link API error code {}: {}",
                parsed.code,
                parsed.message.unwrap_or_default()
            )));
        }
        let data = parsed.data.ok_or_else(|| {
            BotError::MissingField("short_link missing from Shopee response".to_string())
        })?;
        debug!(short_link = %data.short_link, "Shopee short link generated");
        Ok(data.short_link)
    }
}
