use crate::config::Config;
use crate::error::{BotError, Result};
use crate::offer::{Offer, Store};
use tracing::warn;
use url::Url;

pub mod shopee;

pub use shopee::ShopeeShortLinkClient;

/// Rewrites outbound product URLs into affiliate links.
///
/// Conversion must never lose an offer: any failure logs a warning and the
/// original URL is posted instead.
pub struct AffiliateLinker {
    amazon_tag: String,
    ml_word: Option<String>,
    shopee_af_id: Option<String>,
    shopee_client: Option<ShopeeShortLinkClient>,
}

impl AffiliateLinker {
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let shopee_client = match (&config.shopee_partner_id, &config.shopee_partner_key) {
            (Some(id), Some(key)) => Some(ShopeeShortLinkClient::new(
                client,
                id.clone(),
                key.clone(),
            )),
            _ => None,
        };
        Self {
            amazon_tag: config.amazon_affiliate_id.clone(),
            ml_word: config.ml_affiliate_id.clone(),
            shopee_af_id: config.shopee_affiliate_id.clone(),
            shopee_client,
        }
    }

    /// Replaces the Shopee API client. Tests use this to aim the client at
    /// a mock server.
    pub fn with_shopee_client(mut self, client: ShopeeShortLinkClient) -> Self {
        self.shopee_client = Some(client);
        self
    }

    /// Returns the affiliate URL for an offer, falling back to the scraped
    /// URL when rewriting is not possible.
    pub async fn convert(&self, offer: &Offer) -> String {
        match self.try_convert(offer).await {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %offer.url, error = %e, "affiliate conversion failed, posting original link");
                offer.url.clone()
            }
        }
    }

    async fn try_convert(&self, offer: &Offer) -> Result<String> {
        match offer.store {
            Store::Amazon => set_query_param(&offer.url, "tag", &self.amazon_tag),
            Store::MercadoLivre => match &self.ml_word {
                Some(word) => set_query_param(&offer.url, "matt_word", word),
                None => Ok(offer.url.clone()),
            },
            Store::Shopee => self.convert_shopee(&offer.url).await,
        }
    }

    async fn convert_shopee(&self, url: &str) -> Result<String> {
        // Already a short link, nothing to do.
        if url.contains("s.shopee.com.br") {
            return Ok(url.to_string());
        }
        if let Some(client) = &self.shopee_client {
            match client.short_link(url).await {
                Ok(short) => return Ok(short),
                Err(e) => {
                    warn!(error = %e, "Shopee short-link API failed, falling back to af_id");
                }
            }
        }
        match &self.shopee_af_id {
            Some(af_id) => set_query_param(url, "af_id", af_id),
            None => Ok(url.to_string()),
        }
    }
}

/// Sets (or replaces) one query parameter, keeping the rest of the URL as-is.
fn set_query_param(url: &str, key: &str, value: &str) -> Result<String> {
    let mut parsed =
        Url::parse(url).map_err(|e| BotError::Parse(format!("invalid product URL '{url}': {e}")))?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(key, value);
    }
    Ok(parsed.to_string())
}
