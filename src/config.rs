//! Service configuration
//!
//! Loaded from the environment (with .env support) under the `SCREENER_`
//! prefix, e.g. SCREENER_PORT, SCREENER_TOP_N, SCREENER_REDIS_URL.

use serde::Deserialize;
use std::time::Duration;

use crate::screener::ScreenerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the price-history provider (override for tests/proxies)
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
    /// Redis connection string; caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Pattern scoring strategy: "curve_fit" or "stride"
    #[serde(default = "default_pattern_strategy")]
    pub pattern_strategy: String,
    #[serde(default = "default_min_final_score")]
    pub min_final_score: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("SCREENER"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn screener_config(&self) -> ScreenerConfig {
        ScreenerConfig {
            min_final_score: self.min_final_score,
            top_n: self.top_n,
            max_concurrent_fetches: self.max_concurrent_fetches,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            ..ScreenerConfig::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            provider_base_url: default_provider_base_url(),
            redis_url: None,
            pattern_strategy: default_pattern_strategy(),
            min_final_score: default_min_final_score(),
            top_n: default_top_n(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_pattern_strategy() -> String {
    "curve_fit".to_string()
}

fn default_min_final_score() -> f64 {
    20.0
}

fn default_top_n() -> usize {
    50
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
