use crate::cache::SentCache;
use crate::pipeline::OfferPipeline;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Runs cycles forever on the configured interval.
///
/// A failed cycle (or a failed snapshot write) never aborts the loop; the
/// bot logs and sleeps until the next tick.
pub async fn run_loop(
    pipeline: &OfferPipeline<'_>,
    client: &reqwest::Client,
    cache: &mut SentCache,
    source_names: &[String],
) {
    let interval = Duration::from_secs(pipeline.config.interval_minutes * 60);
    info!(
        interval_minutes = pipeline.config.interval_minutes,
        sources = ?source_names,
        "scheduler started"
    );

    loop {
        let cycle_start = Instant::now();
        let result = pipeline.run_cycle(client, cache, source_names, false).await;

        info!(
            total = result.total_offers,
            posted = result.posted,
            skipped_cached = result.skipped_cached,
            errors = result.errors.len(),
            elapsed = ?cycle_start.elapsed(),
            "cycle finished"
        );
        for e in &result.errors {
            error!("cycle error: {e}");
        }

        if let Err(e) = cache.persist(&pipeline.config.cache_file) {
            error!(
                path = %pipeline.config.cache_file.display(),
                error = %e,
                "failed to persist sent-offers cache"
            );
        }

        tokio::time::sleep(interval).await;
    }
}
