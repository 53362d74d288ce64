use super::{resolve_image, SourceParser, PROMOHUB};
use crate::error::Result;
use crate::offer::{Offer, Store, MISSING_PRICE, MISSING_TITLE};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::info;

const PAGE_URL: &str = "https://promohub.com.br";

static OFFER_CARDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.card, article.shadow-sm").unwrap());
static CARD_LINK: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href*='shopee.com.br'], a[href*='mercadolivre.com.br']").unwrap()
});
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3, p.title, p.font-semibold").unwrap());
static PRICE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.price, div.price").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Parser for promohub.com.br. Offers are card elements; cards without an
/// outbound store link (editorial blocks, banners) are skipped.
pub struct PromohubParser;

impl PromohubParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PromohubParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for PromohubParser {
    fn source_name(&self) -> &'static str {
        PROMOHUB
    }

    fn page_url(&self) -> &'static str {
        PAGE_URL
    }

    fn parse_offers(&self, html: &str) -> Result<Vec<Offer>> {
        let document = Html::parse_document(html);
        let cards: Vec<_> = document.select(&OFFER_CARDS).collect();
        info!("[{}] found {} candidate offer cards", PROMOHUB, cards.len());

        let mut seen = HashSet::new();
        let mut offers = Vec::new();

        for card in cards {
            let Some(link) = card
                .select(&CARD_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                continue;
            };
            let link = link.trim();
            if link.is_empty() || !seen.insert(link.to_string()) {
                continue;
            }
            let Some(store) = Store::from_url(link) else {
                continue;
            };

            let title = card
                .select(&TITLE)
                .next()
                .map(|el| {
                    el.text()
                        .collect::<String>()
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| MISSING_TITLE.to_string());

            let price = card
                .select(&PRICE)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| MISSING_PRICE.to_string());

            let image_url = card.select(&IMAGE).next().and_then(|img| {
                resolve_image(
                    PAGE_URL,
                    img.value().attr("src").or_else(|| img.value().attr("data-src")),
                )
            });

            offers.push(Offer {
                title,
                url: link.to_string(),
                store,
                image_url,
                original_price: None,
                price,
            });
        }

        Ok(offers)
    }
}
