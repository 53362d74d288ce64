use super::SourceParser;
use crate::error::{BotError, Result};
use crate::offer::Offer;
use tracing::{info, instrument};

/// Fetches a source page and hands it to the site-specific parser.
pub struct SourceScraper {
    client: reqwest::Client,
    parser: Box<dyn SourceParser>,
}

impl SourceScraper {
    pub fn new(client: reqwest::Client, parser: Box<dyn SourceParser>) -> Self {
        Self { client, parser }
    }

    pub fn source_name(&self) -> &'static str {
        self.parser.source_name()
    }

    #[instrument(skip(self), fields(source = %self.parser.source_name()))]
    pub async fn fetch_offers(&self) -> Result<Vec<Offer>> {
        let url = self.parser.page_url();
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(BotError::Parse(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }
        let html = response.text().await?;
        let offers = self.parser.parse_offers(&html)?;

        info!(
            "Successfully fetched {} offers from {}",
            offers.len(),
            self.parser.source_name()
        );

        Ok(offers)
    }

    /// Parse already-fetched HTML. Used by tests and by anything that wants
    /// to replay a saved page through the live selectors.
    pub fn parse_offers(&self, html: &str) -> Result<Vec<Offer>> {
        self.parser.parse_offers(html)
    }
}
