use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

use ofertas_bot::affiliate::AffiliateLinker;
use ofertas_bot::cache::SentCache;
use ofertas_bot::config::{Config, REQUEST_TIMEOUT_SECS, TELEGRAM_SENDS_PER_MINUTE, USER_AGENT};
use ofertas_bot::pipeline::OfferPipeline;
use ofertas_bot::rate_limiter::RateLimiter;
use ofertas_bot::scheduler;
use ofertas_bot::sources;
use ofertas_bot::telegram::TelegramClient;

#[derive(Parser)]
#[command(name = "ofertas-bot")]
#[command(about = "Telegram deal-offers bot for Brazilian deal aggregators")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic scrape-and-post loop
    Run {
        /// Specific sources to scrape (comma-separated). Available: divulgadorinteligente, promohub
        #[arg(long)]
        sources: Option<String>,
    },
    /// Run a single scrape-and-post cycle
    Scrape {
        /// Specific sources to scrape (comma-separated)
        #[arg(long)]
        sources: Option<String>,
        /// Parse and log offers without posting or caching them
        #[arg(long)]
        dry_run: bool,
    },
    /// Check that the required environment variables are set
    CheckEnv,
}

fn resolve_sources(arg: Option<String>) -> Vec<String> {
    match arg {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => sources::all_source_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

fn check_env() -> bool {
    let required = ["TELEGRAM_TOKEN", "GROUP_ID"];
    let optional = [
        "AMAZON_AFILIADO_ID",
        "ML_AFILIADO_ID",
        "SHOPEE_AFILIADO_ID",
        "SHOPEE_PARTNER_ID",
        "SHOPEE_PARTNER_KEY",
        "SCHEDULE_INTERVAL_MINUTES",
        "MAX_CACHE_SIZE",
        "FUSO_HORARIO",
        "CACHE_FILE",
        "MAX_POSTS_PER_CYCLE",
    ];

    println!("Verificando variáveis de ambiente:\n");
    let mut ok = true;
    for var in required {
        match std::env::var(var) {
            Ok(_) => println!("✅ {var}: OK"),
            Err(_) => {
                println!("❌ {var}: NÃO DEFINIDA");
                ok = false;
            }
        }
    }
    for var in optional {
        match std::env::var(var) {
            Ok(_) => println!("✅ {var}: OK"),
            Err(_) => println!("ℹ️  {var}: não definida (usará o padrão)"),
        }
    }

    if ok {
        println!("\nTodas as variáveis obrigatórias estão definidas. Pronto para rodar o bot! 🚀");
    } else {
        println!("\nCorrija as variáveis acima antes de continuar.");
    }
    ok
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::CheckEnv = cli.command {
        if !check_env() {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Initialize logging
    ofertas_bot::logging::init_logging();

    let config = Config::from_env()?;
    info!(
        interval_minutes = config.interval_minutes,
        max_cache_size = config.max_cache_size,
        timezone = %config.timezone,
        "configuration loaded"
    );

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let linker = AffiliateLinker::from_config(&config, client.clone());
    let telegram = TelegramClient::new(client.clone(), &config.telegram_token, config.group_id);
    let limiter = RateLimiter::new(TELEGRAM_SENDS_PER_MINUTE);
    let pipeline = OfferPipeline {
        config: &config,
        linker: &linker,
        telegram: &telegram,
        limiter: &limiter,
    };

    let mut cache =
        SentCache::load(&config.cache_file, config.max_cache_size).unwrap_or_else(|e| {
            tracing::error!(error = %e, "cache snapshot unreadable, starting empty");
            SentCache::new(config.max_cache_size)
        });

    match cli.command {
        Commands::Run { sources } => {
            let source_names = resolve_sources(sources);
            println!("🕷️  Starting offer scraper loop for sources: {source_names:?}");
            scheduler::run_loop(&pipeline, &client, &mut cache, &source_names).await;
        }
        Commands::Scrape { sources, dry_run } => {
            let source_names = resolve_sources(sources);
            let result = pipeline
                .run_cycle(&client, &mut cache, &source_names, dry_run)
                .await;

            println!("\n📊 Cycle results:");
            println!("   Total offers: {}", result.total_offers);
            println!("   Posted: {}", result.posted);
            println!("   Skipped (already sent): {}", result.skipped_cached);
            println!("   Errors: {}", result.errors.len());
            if !result.errors.is_empty() {
                println!("\n⚠️  Errors encountered:");
                for error in &result.errors {
                    println!("   - {error}");
                }
            }

            if !dry_run {
                cache.persist(&config.cache_file)?;
            }
        }
        Commands::CheckEnv => unreachable!(),
    }

    Ok(())
}
