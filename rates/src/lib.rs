// rates/src/lib.rs
//! Exchange rates for dual-currency amounts.
//!
//! A [`RateCache`] holds the latest resolved price of the native coin in every
//! quoted fiat currency. Amount conversion only ever reads it through the
//! synchronous [`RateProvider`] lookup; keeping it fresh is the job of a
//! [`RateRefresher`] pulling from some [`RatesSource`].
//!
//! ```rust,ignore
//! let cache = RateCache::new();
//! let refresher = RateRefresher::new(source, cache.clone(), RefresherConfig::from_env());
//! let handle = refresher.spawn();
//!
//! if let Some(rate) = cache.rate("USD") {
//!     println!("1 DASH = {} USD", rate.price());
//! }
//! ```
pub mod cache;
pub mod error;
pub mod rate;
pub mod refresher;
pub mod snapshot;
pub mod sources;

pub use cache::RateCache;
pub use error::RateError;
pub use rate::ExchangeRate;
pub use refresher::{RateRefresher, RefresherConfig};
pub use snapshot::decode_rates;

use async_trait::async_trait;

/// Read-only rate lookup consumed by amount conversion.
pub trait RateProvider: Send + Sync {
    /// Latest known rate for `code`, if any.
    fn rate(&self, code: &str) -> Option<ExchangeRate>;

    fn has_rate(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }
}

/// Where fresh rates come from (an HTTP client, a file, a fixture).
#[async_trait]
pub trait RatesSource: Send + Sync {
    /// Human-readable source name, recorded alongside cached rates.
    fn name(&self) -> &str;

    /// Fetch current prices of one `base` coin in every quoted currency.
    async fn fetch_rates(&self, base: &str) -> Result<Vec<ExchangeRate>, RateError>;
}

impl<P: RateProvider + ?Sized> RateProvider for std::sync::Arc<P> {
    fn rate(&self, code: &str) -> Option<ExchangeRate> {
        (**self).rate(code)
    }
}
