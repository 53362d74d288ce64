use crate::affiliate::AffiliateLinker;
use crate::cache::SentCache;
use crate::config::{Config, SEND_WINDOW_END_HOUR, SEND_WINDOW_START_HOUR};
use crate::offer::Offer;
use crate::rate_limiter::RateLimiter;
use crate::sources;
use crate::telegram::TelegramClient;
use chrono::{Timelike, Utc};
use tracing::{info, warn};

/// Outcome of one scrape→rewrite→dedupe→post cycle.
#[derive(Debug, Default)]
pub struct CycleResult {
    pub total_offers: usize,
    pub posted: usize,
    pub skipped_cached: usize,
    pub errors: Vec<String>,
}

/// True when the given local hour falls inside the posting window.
pub fn send_window_allows(hour: u32) -> bool {
    (SEND_WINDOW_START_HOUR..SEND_WINDOW_END_HOUR).contains(&hour)
}

/// One fetch-and-post pass over the configured sources.
pub struct OfferPipeline<'a> {
    pub config: &'a Config,
    pub linker: &'a AffiliateLinker,
    pub telegram: &'a TelegramClient,
    pub limiter: &'a RateLimiter,
}

impl OfferPipeline<'_> {
    /// Runs one cycle over `source_names`. A failing source is recorded and
    /// skipped; the cycle always completes for the remaining sources.
    pub async fn run_cycle(
        &self,
        client: &reqwest::Client,
        cache: &mut SentCache,
        source_names: &[String],
        dry_run: bool,
    ) -> CycleResult {
        let mut result = CycleResult::default();

        let local_hour = Utc::now().with_timezone(&self.config.timezone).hour();
        let within_window = send_window_allows(local_hour);
        if !within_window {
            info!(
                hour = local_hour,
                "outside posting window ({SEND_WINDOW_START_HOUR}h-{SEND_WINDOW_END_HOUR}h), scraping only"
            );
        }

        for name in source_names {
            let Some(scraper) = sources::create_source(name, client.clone()) else {
                warn!(source = %name, "unknown source");
                result.errors.push(format!("unknown source: {name}"));
                continue;
            };

            let offers = match scraper.fetch_offers().await {
                Ok(offers) => offers,
                Err(e) => {
                    warn!(source = %name, error = %e, "source fetch failed");
                    result.errors.push(format!("{name}: {e}"));
                    continue;
                }
            };

            result.total_offers += offers.len();
            self.deliver(name, offers, cache, &mut result, within_window, dry_run)
                .await;
        }

        result
    }

    /// Applies dedupe, pacing and the posting window to a batch of offers
    /// from one source, sending the survivors.
    pub async fn deliver(
        &self,
        source_name: &str,
        offers: Vec<Offer>,
        cache: &mut SentCache,
        result: &mut CycleResult,
        within_window: bool,
        dry_run: bool,
    ) {
        for offer in offers {
            if cache.contains(offer.dedupe_key()) {
                result.skipped_cached += 1;
                continue;
            }

            // Fresh offers seen outside the window (or in a dry run) stay
            // uncached so they are still candidates next cycle.
            if !within_window || dry_run {
                info!(source = %source_name, title = %offer.title, "new offer (not sent)");
                continue;
            }

            if result.posted >= self.config.max_posts_per_cycle {
                info!(
                    source = %source_name,
                    cap = self.config.max_posts_per_cycle,
                    "per-cycle post cap reached, deferring remaining offers"
                );
                break;
            }

            let final_url = self.linker.convert(&offer).await;

            self.limiter.acquire().await;
            match self.telegram.send_offer(&offer, &final_url).await {
                Ok(()) => {
                    // Cache only after a successful send so a Telegram
                    // failure retries on the next cycle.
                    cache.insert(offer.dedupe_key().to_string());
                    result.posted += 1;
                }
                Err(e) => {
                    warn!(source = %source_name, title = %offer.title, error = %e, "send failed");
                    result.errors.push(format!("{source_name}: {e}"));
                }
            }
        }
    }
}
