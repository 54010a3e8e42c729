use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use price_tracker::config::Config;
use price_tracker::discord::DiscordNotifier;
use price_tracker::fetcher::HttpFetcher;
use price_tracker::health;
use price_tracker::notifier::{LogNotifier, Notifier};
use price_tracker::parsers::HtmlPriceExtractor;
use price_tracker::storage::{FileItemSource, JsonFileStore};
use price_tracker::tracker::{run_forever, BatchOrchestrator, BatchSettings, Collaborators};
use price_tracker::utils;

fn init_logging() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("price_tracker=info".parse()?);

    if std::env::var("PRICE_TRACKER_LOG_JSON").is_ok_and(|v| v == "1") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    info!("Starting Price Tracker");

    // Load configuration
    let config = Config::load()?;

    let notifier: Arc<dyn Notifier> = match &config.discord.webhook {
        Some(webhook) => Arc::new(DiscordNotifier::new(
            utils::http::create_webhook_client()?,
            webhook.clone(),
            config.discord.clone(),
        )),
        None => {
            info!("No Discord webhook configured, price drops will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let collaborators = Collaborators {
        items: Arc::new(FileItemSource::new(&config.items_path)),
        state: Arc::new(JsonFileStore::new(&config.prices_path, &config.cursor_path)),
        fetcher: Arc::new(HttpFetcher::new(&config.http)?),
        extractor: Arc::new(HtmlPriceExtractor::new(&config.extractor)?),
        notifier,
    };

    let orchestrator = Arc::new(
        BatchOrchestrator::restore(collaborators, BatchSettings::from_config(&config)).await,
    );

    if config.health.enabled {
        let status = orchestrator.subscribe();
        let bind = config.health.bind.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(&bind, status).await {
                error!("Liveness endpoint failed: {:#}", e);
            }
        });
    }

    info!(
        "Checking {} items per batch from {}, pausing {}s between batches",
        config.batch_size, config.items_path, config.batch_pause_seconds
    );

    tokio::select! {
        _ = run_forever(orchestrator, config.batch_pause()) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
