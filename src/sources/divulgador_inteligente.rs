use super::{resolve_image, SourceParser, DIVULGADOR_INTELIGENTE};
use crate::error::Result;
use crate::offer::{Offer, Store, MISSING_PRICE, MISSING_TITLE};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::info;

const PAGE_URL: &str = "https://www.divulgadorinteligente.com/pachecoofertas";

static OFFER_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "a[href*='amazon.com.br'], a[href*='shopee.com.br'], a[href*='mercadolivre.com.br']",
    )
    .unwrap()
});
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h4").unwrap());
static PRICE: Lazy<Selector> = Lazy::new(|| Selector::parse("h4 > span").unwrap());
static ANY_SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Parser for the divulgadorinteligente.com offers page. The page is a flat
/// list of anchors straight to the store product pages, with the product
/// name in an `h4` and the price in a nested `span`.
pub struct DivulgadorInteligenteParser;

impl DivulgadorInteligenteParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DivulgadorInteligenteParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for DivulgadorInteligenteParser {
    fn source_name(&self) -> &'static str {
        DIVULGADOR_INTELIGENTE
    }

    fn page_url(&self) -> &'static str {
        PAGE_URL
    }

    fn parse_offers(&self, html: &str) -> Result<Vec<Offer>> {
        let document = Html::parse_document(html);
        let anchors: Vec<_> = document.select(&OFFER_LINKS).collect();
        info!(
            "[{}] found {} candidate offer links",
            DIVULGADOR_INTELIGENTE,
            anchors.len()
        );

        let mut seen = HashSet::new();
        let mut offers = Vec::new();

        for anchor in anchors {
            let Some(link) = anchor.value().attr("href") else {
                continue;
            };
            let link = link.trim();
            if link.is_empty() || !seen.insert(link.to_string()) {
                continue;
            }
            let Some(store) = Store::from_url(link) else {
                continue;
            };

            let title = anchor
                .select(&TITLE)
                .next()
                .map(|h4| h4.text().collect::<String>())
                .unwrap_or_else(|| anchor.text().collect::<String>());
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            let title = if title.is_empty() {
                MISSING_TITLE.to_string()
            } else {
                title
            };

            let price = anchor
                .select(&PRICE)
                .next()
                .or_else(|| anchor.select(&ANY_SPAN).next())
                .map(|span| span.text().collect::<String>().trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| MISSING_PRICE.to_string());

            let image_url = anchor.select(&IMAGE).next().and_then(|img| {
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
