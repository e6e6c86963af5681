// rates/src/cache.rs
use crate::{ExchangeRate, RateProvider};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Codes pinned to the top of [`RateCache::sorted_prices`], in order.
const PINNED_CODES: [&str; 2] = ["USD", "EUR"];

#[derive(Default)]
struct CacheState {
    rates: HashMap<String, ExchangeRate>,
    source: Option<String>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Latest resolved exchange rates, keyed by currency code.
///
/// Cloning is cheap and every clone observes the same rates, so one clone can
/// live in a [`RateRefresher`](crate::RateRefresher) task while others serve
/// lookups.
#[derive(Clone, Default)]
pub struct RateCache {
    state: Arc<RwLock<CacheState>>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every cached rate with `rates`, recording where they came from.
    /// Returns the number of rates now cached.
    pub fn replace_all(&self, rates: Vec<ExchangeRate>, source: impl Into<String>) -> usize {
        let by_code: HashMap<String, ExchangeRate> = rates
            .into_iter()
            .map(|rate| (rate.code().to_string(), rate))
            .collect();

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.rates = by_code;
        state.source = Some(source.into());
        state.refreshed_at = Some(Utc::now());
        state.rates.len()
    }

    /// Insert or overwrite a single rate.
    pub fn insert(&self, rate: ExchangeRate) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.rates.insert(rate.code().to_string(), rate);
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .rates
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the source behind the last full refresh.
    pub fn last_source(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .source
            .clone()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .refreshed_at
    }

    /// All cached rates for a currency picker: USD, then EUR, then the rest
    /// ordered by code.
    pub fn sorted_prices(&self) -> Vec<ExchangeRate> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        let mut rest: Vec<ExchangeRate> = state
            .rates
            .values()
            .filter(|rate| !PINNED_CODES.contains(&rate.code()))
            .cloned()
            .collect();
        rest.sort_by(|a, b| a.code().cmp(b.code()));

        let mut sorted: Vec<ExchangeRate> = PINNED_CODES
            .iter()
            .filter_map(|code| state.rates.get(*code).cloned())
            .collect();
        sorted.extend(rest);
        sorted
    }
}

impl RateProvider for RateCache {
    fn rate(&self, code: &str) -> Option<ExchangeRate> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.rates.get(&code.to_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(code: &str) -> ExchangeRate {
        ExchangeRate::new(code, dec!(10)).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let cache = RateCache::new();
        cache.insert(rate("USD"));

        assert!(cache.has_rate("usd"));
        assert_eq!(cache.rate("Usd").unwrap().code(), "USD");
        assert!(cache.rate("EUR").is_none());
    }

    #[test]
    fn test_replace_all_drops_previous_rates() {
        let cache = RateCache::new();
        cache.insert(rate("GBP"));

        let count = cache.replace_all(vec![rate("USD"), rate("EUR")], "test");

        assert_eq!(count, 2);
        assert!(!cache.has_rate("GBP"));
        assert_eq!(cache.last_source().as_deref(), Some("test"));
        assert!(cache.last_refreshed().is_some());
    }

    #[test]
    fn test_sorted_prices_pins_usd_and_eur() {
        let cache = RateCache::new();
        cache.replace_all(
            vec![rate("RUB"), rate("EUR"), rate("AUD"), rate("USD"), rate("CHF")],
            "test",
        );

        let codes: Vec<String> = cache
            .sorted_prices()
            .iter()
            .map(|r| r.code().to_string())
            .collect();

        assert_eq!(codes, vec!["USD", "EUR", "AUD", "CHF", "RUB"]);
    }

    #[test]
    fn test_sorted_prices_without_pinned_codes() {
        let cache = RateCache::new();
        cache.replace_all(vec![rate("JPY"), rate("AUD")], "test");

        let codes: Vec<String> = cache
            .sorted_prices()
            .iter()
            .map(|r| r.code().to_string())
            .collect();

        assert_eq!(codes, vec!["AUD", "JPY"]);
    }

    #[test]
    fn test_clones_share_state() {
        let cache = RateCache::new();
        let reader = cache.clone();

        cache.insert(rate("USD"));

        assert_eq!(reader.len(), 1);
        assert!(!reader.is_empty());
    }
}
