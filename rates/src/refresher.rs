// rates/src/refresher.rs
use crate::{RateCache, RateError, RatesSource};
use metrics::{counter, histogram};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_REFRESH_SECS: u64 = 60;
pub const DEFAULT_BASE_CURRENCY: &str = "DASH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefresherConfig {
    /// Currency the fetched prices are quoted for.
    pub base_currency: String,
    pub refresh_secs: u64,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            refresh_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl RefresherConfig {
    /// Defaults overridden by `RATES_BASE_CURRENCY` and `RATES_REFRESH_SECS`.
    /// Unparsable or zero intervals fall back to the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("RATES_BASE_CURRENCY") {
            if !base.trim().is_empty() {
                config.base_currency = base.trim().to_uppercase();
            }
        }

        if let Ok(secs) = std::env::var("RATES_REFRESH_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.refresh_secs = secs,
                _ => warn!(value = %secs, "ignoring invalid RATES_REFRESH_SECS"),
            }
        }

        config
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}

/// Pulls rates from a [`RatesSource`] into a [`RateCache`] on a fixed interval.
pub struct RateRefresher {
    source: Arc<dyn RatesSource>,
    cache: RateCache,
    config: RefresherConfig,
}

impl RateRefresher {
    pub fn new(source: Arc<dyn RatesSource>, cache: RateCache, config: RefresherConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Fetch once and replace the cache contents.
    ///
    /// On failure, or when the source answers with no rates at all, the
    /// previous rates stay in place.
    pub async fn refresh_once(&self) -> Result<usize, RateError> {
        let result = self.source.fetch_rates(&self.config.base_currency).await;

        let result = match result {
            Ok(rates) if rates.is_empty() => Err(RateError::Source(format!(
                "{} returned no rates",
                self.source.name()
            ))),
            Ok(rates) => Ok(self.cache.replace_all(rates, self.source.name())),
            Err(e) => Err(e),
        };

        counter!("rates.refresh.total",
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);

        match &result {
            Ok(count) => {
                histogram!("rates.refresh.count").record(*count as f64);
                debug!(source = self.source.name(), count, "exchange rates refreshed");
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "exchange rate refresh failed");
            }
        }

        result
    }

    /// Refresh immediately, then every `refresh_interval` until the handle is
    /// aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.refresh_interval());
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                // Errors are already logged; the next tick retries.
                let _ = self.refresh_once().await;
            }
        })
    }
}
