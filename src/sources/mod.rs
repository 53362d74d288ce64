use crate::error::Result;
use crate::offer::Offer;
use url::Url;

pub mod base;
pub mod divulgador_inteligente;
pub mod promohub;

pub use base::SourceScraper;

pub const DIVULGADOR_INTELIGENTE: &str = "divulgadorinteligente";
pub const PROMOHUB: &str = "promohub";

/// Site-specific extraction logic. Each deal aggregator gets one parser;
/// selectors live here and nowhere else, since the page layouts shift often.
pub trait SourceParser: Send + Sync {
    /// Unique identifier for this source.
    fn source_name(&self) -> &'static str;

    /// Page the offers are scraped from.
    fn page_url(&self) -> &'static str;

    /// Extract offers from a fetched page.
    fn parse_offers(&self, html: &str) -> Result<Vec<Offer>>;
}

/// Factory mapping a source name to its scraper.
pub fn create_source(name: &str, client: reqwest::Client) -> Option<SourceScraper> {
    match name {
        DIVULGADOR_INTELIGENTE => Some(SourceScraper::new(
            client,
            Box::new(divulgador_inteligente::DivulgadorInteligenteParser::new()),
        )),
        PROMOHUB => Some(SourceScraper::new(
            client,
            Box::new(promohub::PromohubParser::new()),
        )),
        _ => None,
    }
}

pub fn all_source_names() -> Vec<&'static str> {
    vec![DIVULGADOR_INTELIGENTE, PROMOHUB]
}

/// Resolves an image reference against the page URL, dropping values that
/// are not usable URLs.
pub(crate) fn resolve_image(page_url: &str, src: Option<&str>) -> Option<String> {
    let src = src?.trim();
    if src.is_empty() {
        return None;
    }
    let base = Url::parse(page_url).ok()?;
    base.join(src).ok().map(|u| u.to_string())
}
