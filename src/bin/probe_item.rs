use anyhow::{bail, Result};
use std::fs;

use price_tracker::config::Config;
use price_tracker::fetcher::{HttpFetcher, PageFetcher};
use price_tracker::models::TrackedItem;
use price_tracker::parsers::{HtmlPriceExtractor, PriceExtractor};
use price_tracker::utils::user_agent::UserAgentRotation;

/// Fetch one page once and show what the extractor makes of it.
///
/// Usage: probe_item <url> [save.html]
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        bail!("usage: probe_item <url> [save.html]");
    };
    let save_path = args.next();

    let config = Config::load()?;
    let fetcher = HttpFetcher::new(&config.http)?;
    let extractor = HtmlPriceExtractor::new(&config.extractor)?;
    let agents = UserAgentRotation::new(config.http.user_agents.clone());

    let item = TrackedItem::new(url);
    let identity = agents.identity(agents.random_offset(), 0);
    println!("Fetching {} as {}", item, identity.user_agent);

    let html = fetcher.fetch(&item, &identity).await?;
    println!("Received {} bytes", html.len());

    if let Some(path) = save_path {
        fs::write(&path, &html)?;
        println!("Saved page to {}", path);
    }

    match extractor.extract(&html) {
        Ok(extraction) => {
            println!("Title:    {}", extraction.title);
            println!("Price:    {}", extraction.price);
            println!("Currency: {}", extraction.currency);
        }
        Err(e) => println!("No reading: {}", e),
    }

    Ok(())
}
