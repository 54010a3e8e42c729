use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, ClientBuilder, Proxy};
use std::time::Duration;

use crate::config::HttpConfig;

/// Shared client for page fetches. The user agent is set per request so
/// retries can rotate it.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).context("Invalid accept_language header")?,
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );

    let mut builder = ClientBuilder::new()
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .pool_max_idle_per_host(6);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(Proxy::all(proxy).context("Invalid proxy URL")?);
    }

    Ok(builder.build()?)
}

/// Client for outbound notifications; no identity spoofing needed.
pub fn create_webhook_client() -> Result<Client> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(15))
        .build()?;

    Ok(client)
}
