use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

use super::{FetchError, Identity, PageFetcher};
use crate::config::HttpConfig;
use crate::models::TrackedItem;
use crate::utils::http::create_client;

/// Plain HTTP fetcher sharing one pooled client across all items.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, item: &TrackedItem, identity: &Identity) -> Result<String, FetchError> {
        debug!("GET {}", item);

        let response = self
            .client
            .get(item.url())
            .header(USER_AGENT, identity.user_agent.as_str())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        response.text().await.map_err(classify)
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error.to_string())
    }
}
