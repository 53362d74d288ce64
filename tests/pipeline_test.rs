use ofertas_bot::affiliate::AffiliateLinker;
use ofertas_bot::cache::SentCache;
use ofertas_bot::config::Config;
use ofertas_bot::offer::{Offer, Store};
use ofertas_bot::pipeline::{CycleResult, OfferPipeline};
use ofertas_bot::rate_limiter::RateLimiter;
use ofertas_bot::telegram::TelegramClient;
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> Config {
    Config {
        telegram_token: "testtoken".into(),
        group_id: -1000123,
        amazon_affiliate_id: "maxx0448-20".into(),
        ml_affiliate_id: None,
        shopee_affiliate_id: None,
        shopee_partner_id: None,
        shopee_partner_key: None,
        interval_minutes: 10,
        max_cache_size: 200,
        timezone: chrono_tz::America::Sao_Paulo,
        cache_file: PathBuf::from("enviados_cache.json"),
        max_posts_per_cycle: 2,
    }
}

fn offer(id: u32) -> Offer {
    Offer {
        title: format!("Produto {id}"),
        url: format!("https://www.amazon.com.br/dp/B{id:07}"),
        store: Store::Amazon,
        image_url: None,
        original_price: None,
        price: "R$ 10,00".into(),
    }
}

async fn mock_telegram(server: &MockServer, status: u16, expected_sends: u64) {
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendMessage"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(serde_json::json!({"ok": status < 300})),
        )
        .expect(expected_sends)
        .mount(server)
        .await;
}

async fn run_deliver(
    cfg: &Config,
    server: &MockServer,
    offers: Vec<Offer>,
    cache: &mut SentCache,
    within_window: bool,
    dry_run: bool,
) -> CycleResult {
    let linker = AffiliateLinker::from_config(cfg, reqwest::Client::new());
    let telegram = TelegramClient::new(reqwest::Client::new(), "testtoken", cfg.group_id)
        .with_base_url(server.uri());
    let limiter = RateLimiter::new(0); // no pacing in tests
    let pipeline = OfferPipeline {
        config: cfg,
        linker: &linker,
        telegram: &telegram,
        limiter: &limiter,
    };

    let mut result = CycleResult::default();
    pipeline
        .deliver("test-source", offers, cache, &mut result, within_window, dry_run)
        .await;
    result
}

#[tokio::test]
async fn test_cached_offers_are_never_reposted() {
    let server = MockServer::start().await;
    mock_telegram(&server, 200, 1).await;

    let cfg = config();
    let mut cache = SentCache::new(cfg.max_cache_size);
    cache.insert(offer(1).url);

    let result = run_deliver(&cfg, &server, vec![offer(1), offer(2)], &mut cache, true, false).await;
    assert_eq!(result.skipped_cached, 1);
    assert_eq!(result.posted, 1);
}

#[tokio::test]
async fn test_successful_send_caches_the_offer() {
    let server = MockServer::start().await;
    mock_telegram(&server, 200, 1).await;

    let cfg = config();
    let mut cache = SentCache::new(cfg.max_cache_size);
    let result = run_deliver(&cfg, &server, vec![offer(1)], &mut cache, true, false).await;

    assert_eq!(result.posted, 1);
    assert!(cache.contains(&offer(1).url));
}

#[tokio::test]
async fn test_failed_send_leaves_offer_uncached_for_retry() {
    let server = MockServer::start().await;
    mock_telegram(&server, 502, 1).await;

    let cfg = config();
    let mut cache = SentCache::new(cfg.max_cache_size);
    let result = run_deliver(&cfg, &server, vec![offer(1)], &mut cache, true, false).await;

    assert_eq!(result.posted, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(!cache.contains(&offer(1).url));
}

#[tokio::test]
async fn test_outside_window_nothing_is_sent_or_cached() {
    let server = MockServer::start().await;
    mock_telegram(&server, 200, 0).await;

    let cfg = config();
    let mut cache = SentCache::new(cfg.max_cache_size);
    let result = run_deliver(&cfg, &server, vec![offer(1), offer(2)], &mut cache, false, false).await;

    assert_eq!(result.posted, 0);
    assert!(cache.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_dry_run_never_sends_or_caches() {
    let server = MockServer::start().await;
    mock_telegram(&server, 200, 0).await;

    let cfg = config();
    let mut cache = SentCache::new(cfg.max_cache_size);
    let result = run_deliver(&cfg, &server, vec![offer(1)], &mut cache, true, true).await;

    assert_eq!(result.posted, 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_per_cycle_cap_defers_surplus_offers() {
    let server = MockServer::start().await;
    mock_telegram(&server, 200, 2).await;

    let cfg = config(); // max_posts_per_cycle = 2
    let mut cache = SentCache::new(cfg.max_cache_size);
    let result = run_deliver(
        &cfg,
        &server,
        vec![offer(1), offer(2), offer(3), offer(4)],
        &mut cache,
        true,
        false,
    )
    .await;

    assert_eq!(result.posted, 2);
    // Deferred offers stay uncached so the next cycle picks them up.
    assert!(!cache.contains(&offer(3).url));
    assert!(!cache.contains(&offer(4).url));
}
