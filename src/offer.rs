use serde::{Deserialize, Serialize};
use std::fmt;

/// Store an offer links out to, detected from the product URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Store {
    Amazon,
    Shopee,
    MercadoLivre,
}

impl Store {
    /// Detects the store from an outbound product URL. Returns `None` for
    /// links pointing anywhere else.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.contains("amazon") {
            Some(Store::Amazon)
        } else if url.contains("shopee") {
            Some(Store::Shopee)
        } else if url.contains("mercadolivre") {
            Some(Store::MercadoLivre)
        } else {
            None
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Store::Amazon => "Amazon",
            Store::Shopee => "Shopee",
            Store::MercadoLivre => "Mercado Livre",
        };
        write!(f, "{name}")
    }
}

/// A single product offer scraped from a deal-aggregator page.
///
/// Prices are kept as display strings: the source pages render them as
/// free-form text ("R$ 1.234,56", "12x de R$ 10") and the bot only ever
/// shows them back to users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub title: String,
    /// Outbound product URL as scraped, before affiliate rewriting.
    pub url: String,
    pub store: Store,
    pub image_url: Option<String>,
    pub original_price: Option<String>,
    pub price: String,
}

/// Placeholder shown when a card carries no readable price.
pub const MISSING_PRICE: &str = "R$ ???";

/// Fallback title for cards without any readable product name.
pub const MISSING_TITLE: &str = "Produto sem nome";

impl Offer {
    /// Key used by the sent-offers cache. The untransformed URL identifies
    /// the offer, so changing an affiliate id never causes a re-post.
    pub fn dedupe_key(&self) -> &str {
        &self.url
    }
}
