use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "price_tracker";
const ENV_PREFIX: &str = "PRICE_TRACKER";

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub items_path: String,
    pub prices_path: String,
    pub cursor_path: String,
    pub batch_size: usize,
    pub batch_pause_seconds: u64,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub extractor: ExtractorConfig,
    pub discord: DiscordConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_seconds: u64,
    pub accept_language: String,
    pub proxy: Option<String>,
    pub user_agents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_base_seconds: u64,
    /// Whether a page that loads but shows no price is retried like a
    /// network failure.
    pub retry_not_found: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    Simple,
    EvenSpread,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub mode: PacingMode,
    pub base_seconds: u64,
    pub jitter_seconds: u64,
    pub min_seconds: u64,
    pub spread_window_seconds: u64,
    pub spread_jitter: f64,
    pub spread_min_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub price_selectors: Vec<String>,
    pub title_selectors: Vec<String>,
    pub unavailable_markers: Vec<String>,
    pub default_currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub webhook: Option<String>,
    pub name: String,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            items_path: "tracked_items.txt".to_string(),
            prices_path: "state/prices.json".to_string(),
            cursor_path: "state/cursor.json".to_string(),
            batch_size: 10,
            batch_pause_seconds: 3600,
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            extractor: ExtractorConfig::default(),
            discord: DiscordConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 25,
            accept_language: "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            proxy: None,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_seconds: 5,
            retry_not_found: true,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            mode: PacingMode::Simple,
            base_seconds: 8,
            jitter_seconds: 5,
            min_seconds: 1,
            spread_window_seconds: 24 * 60 * 60,
            spread_jitter: 0.4,
            spread_min_seconds: 60,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            price_selectors: [
                "#corePrice_feature_div .a-offscreen",
                "#priceblock_ourprice",
                "#priceblock_dealprice",
                ".a-price .a-offscreen",
                "[data-price]",
                ".product-price",
                ".price",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            title_selectors: ["#productTitle", "h1", "title"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unavailable_markers: [
                "Currently unavailable",
                "Derzeit nicht verfügbar",
                "Dieser Artikel ist nicht mehr verfügbar",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            default_currency: "EUR".to_string(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook: None,
            name: "Price Tracker".to_string(),
            color: 0x2E8B57,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `price_tracker.{toml,yaml,json}` (or the file named by
    /// `PRICE_TRACKER_CONFIG`), then `PRICE_TRACKER_*` environment variables.
    pub fn load() -> Result<Self> {
        let path = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(
            !self.http.user_agents.is_empty(),
            "http.user_agents must contain at least one entry"
        );
        ensure!(
            self.pacing.spread_jitter >= 0.0 && self.pacing.spread_jitter < 1.0,
            "pacing.spread_jitter must be in [0, 1)"
        );
        ensure!(
            self.pacing.spread_window_seconds > 0,
            "pacing.spread_window_seconds must be positive"
        );
        Ok(())
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_secs(self.batch_pause_seconds)
    }
}
