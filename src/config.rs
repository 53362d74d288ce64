use crate::error::{BotError, Result};
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;

/// Browser User-Agent sent to the deal-aggregator pages.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Timeout for scraping the source pages, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Posting window, evaluated in the configured timezone.
/// Offers are only delivered from SEND_WINDOW_START (inclusive)
/// to SEND_WINDOW_END (exclusive).
pub const SEND_WINDOW_START_HOUR: u32 = 7;
pub const SEND_WINDOW_END_HOUR: u32 = 23;

/// Telegram sends per minute allowed by the pacing bucket.
pub const TELEGRAM_SENDS_PER_MINUTE: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub group_id: i64,
    pub amazon_affiliate_id: String,
    pub ml_affiliate_id: Option<String>,
    pub shopee_affiliate_id: Option<String>,
    pub shopee_partner_id: Option<String>,
    pub shopee_partner_key: Option<String>,
    pub interval_minutes: u64,
    pub max_cache_size: usize,
    pub timezone: Tz,
    pub cache_file: PathBuf,
    pub max_posts_per_cycle: usize,
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        BotError::Config(format!("required environment variable '{name}' is not set"))
    })
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match optional(name) {
        Some(raw) => raw.parse().map_err(|_| {
            BotError::Config(format!("environment variable '{name}' has invalid value '{raw}'"))
        }),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from the environment. Call `dotenv::dotenv().ok()`
    /// first so a local `.env` file is honored.
    pub fn from_env() -> Result<Self> {
        let telegram_token = required("TELEGRAM_TOKEN")?;

        let group_id_raw = required("GROUP_ID")?;
        let group_id: i64 = group_id_raw.parse().map_err(|_| {
            BotError::Config(format!("GROUP_ID must be an integer chat id, got '{group_id_raw}'"))
        })?;

        let timezone_name =
            optional("FUSO_HORARIO").unwrap_or_else(|| "America/Sao_Paulo".to_string());
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|_| BotError::Config(format!("unknown timezone '{timezone_name}'")))?;

        let config = Self {
            telegram_token,
            group_id,
            amazon_affiliate_id: optional("AMAZON_AFILIADO_ID")
                .unwrap_or_else(|| "maxx0448-20".to_string()),
            ml_affiliate_id: optional("ML_AFILIADO_ID"),
            shopee_affiliate_id: optional("SHOPEE_AFILIADO_ID"),
            shopee_partner_id: optional("SHOPEE_PARTNER_ID"),
            shopee_partner_key: optional("SHOPEE_PARTNER_KEY"),
            interval_minutes: parsed_or("SCHEDULE_INTERVAL_MINUTES", 10)?,
            max_cache_size: parsed_or("MAX_CACHE_SIZE", 200)?,
            timezone,
            cache_file: PathBuf::from(
                optional("CACHE_FILE").unwrap_or_else(|| "enviados_cache.json".to_string()),
            ),
            max_posts_per_cycle: parsed_or("MAX_POSTS_PER_CYCLE", 10)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_minutes < 1 {
            return Err(BotError::Config(
                "SCHEDULE_INTERVAL_MINUTES must be at least 1".to_string(),
            ));
        }
        if self.max_cache_size < 1 {
            return Err(BotError::Config(
                "MAX_CACHE_SIZE must be at least 1".to_string(),
            ));
        }
        if self.max_posts_per_cycle < 1 {
            return Err(BotError::Config(
                "MAX_POSTS_PER_CYCLE must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// True when Shopee short links can be requested through the partner API.
    pub fn has_shopee_partner_credentials(&self) -> bool {
        self.shopee_partner_id.is_some() && self.shopee_partner_key.is_some()
    }
}
