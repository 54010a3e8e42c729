pub mod embed;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

use crate::config::DiscordConfig;
use crate::models::PriceDrop;
use crate::notifier::Notifier;
use embed::create_embed;

/// Posts price drops to a Discord webhook.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    config: DiscordConfig,
}

impl DiscordNotifier {
    pub fn new(client: Client, webhook_url: impl Into<String>, config: DiscordConfig) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, drop: &PriceDrop) -> Result<()> {
        let embed = create_embed(drop, &self.config);

        let payload = json!({
            "embeds": [embed]
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send Discord webhook")?;

        if response.status().is_success() {
            info!("Successfully sent Discord notification for {}", drop.title);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("Discord webhook failed with status {}: {}", status, error_text);
            Err(anyhow::anyhow!("Discord webhook failed: {} - {}", status, error_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackedItem;
    use rust_decimal::Decimal;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_drop() -> PriceDrop {
        PriceDrop {
            item: TrackedItem::from("https://shop.example/p/1"),
            title: "Kaffeemühle".to_string(),
            currency: "EUR".to_string(),
            old_price: Decimal::new(10000, 2),
            new_price: Decimal::new(7500, 2),
        }
    }

    #[tokio::test]
    async fn posts_embed_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(
            Client::new(),
            format!("{}/hook", server.uri()),
            DiscordConfig::default(),
        );

        tokio_test::assert_ok!(notifier.notify(&sample_drop()).await);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["embeds"][0]["title"], "Kaffeemühle");
    }

    #[tokio::test]
    async fn webhook_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad embed"))
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(
            Client::new(),
            format!("{}/hook", server.uri()),
            DiscordConfig::default(),
        );

        tokio_test::assert_err!(notifier.notify(&sample_drop()).await);
    }
}
