// rates/src/sources/fixed.rs
use crate::{ExchangeRate, RateError, RatesSource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A [`RatesSource`] that answers with whatever it was last given.
///
/// Useful for wiring a [`RateRefresher`](crate::RateRefresher) without a
/// network client, and for replaying a failure.
#[derive(Clone)]
pub struct FixedSource {
    name: String,
    response: Arc<Mutex<Result<Vec<ExchangeRate>, RateError>>>,
    fetches: Arc<AtomicUsize>,
}

impl FixedSource {
    pub fn new(name: impl Into<String>, rates: Vec<ExchangeRate>) -> Self {
        Self {
            name: name.into(),
            response: Arc::new(Mutex::new(Ok(rates))),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_rates(&self, rates: Vec<ExchangeRate>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = Ok(rates);
    }

    pub fn fail_with(&self, error: RateError) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = Err(error);
    }

    /// How many times `fetch_rates` has been called.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RatesSource for FixedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self, _base: &str) -> Result<Vec<ExchangeRate>, RateError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
