// Redis cache for screener reports and price history
use crate::types::*;
use redis::AsyncCommands;

/// Screener reports are cached for an hour, history for five minutes
const REPORT_TTL_SECS: u64 = 3600;
const HISTORY_TTL_SECS: u64 = 300;

const REPORT_KEY: &str = "screener:momentum";

pub struct RedisCache {
    client: redis::aio::MultiplexedConnection,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;

        Ok(Self { client: conn })
    }

    /// Get the cached screener report
    pub async fn get_report(&self) -> anyhow::Result<Option<ScreenerReport>> {
        let value: Option<String> = self.client.clone().get(REPORT_KEY).await?;

        match value {
            Some(json) => {
                let report: ScreenerReport = serde_json::from_str(&json)?;
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }

    /// Cache a screener report with TTL
    pub async fn set_report(&self, report: &ScreenerReport) -> anyhow::Result<()> {
        let json = serde_json::to_string(report)?;

        // Explicit type annotation to avoid never type fallback
        let _: () = self
            .client
            .clone()
            .set_ex(REPORT_KEY, json, REPORT_TTL_SECS)
            .await?;

        Ok(())
    }

    /// Get cached price history
    pub async fn get_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> anyhow::Result<Option<Vec<Bar>>> {
        let key = history_key(symbol, range, interval);
        let value: Option<String> = self.client.clone().get(key).await?;

        match value {
            Some(json) => {
                let bars: Vec<Bar> = serde_json::from_str(&json)?;
                Ok(Some(bars))
            }
            None => Ok(None),
        }
    }

    /// Cache price history with TTL
    pub async fn set_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
        bars: &[Bar],
    ) -> anyhow::Result<()> {
        let key = history_key(symbol, range, interval);
        let json = serde_json::to_string(bars)?;
        let _: () = self
            .client
            .clone()
            .set_ex(key, json, HISTORY_TTL_SECS)
            .await?;
        Ok(())
    }

    /// Invalidate the cached screener report
    pub async fn invalidate_report(&self) -> anyhow::Result<()> {
        let _: () = self.client.clone().del(REPORT_KEY).await?;
        Ok(())
    }
}

fn history_key(symbol: &str, range: &str, interval: &str) -> String {
    format!("history:{}:{}:{}", symbol.to_uppercase(), range, interval)
}
