use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::PriceDrop;

/// Delivers price-drop messages. Errors are reported to the caller, which
/// only logs them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, drop: &PriceDrop) -> Result<()>;
}

/// Used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, drop: &PriceDrop) -> Result<()> {
        info!("Price drop for {}: {}", drop.item, drop);
        Ok(())
    }
}
