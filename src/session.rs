// src/session.rs
use crate::input::{self, InputKey};
use crate::policy::{AmountPolicy, NonZeroPolicy, PolicyVerdict};
use crate::{ActiveSide, AmountConverter, MonetaryAmount, ParseError};
use rates::{ExchangeRate, RateProvider};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

/// Which side an amount-entry session is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    EditingNative,
    EditingFiat,
}

impl From<ActiveSide> for SessionState {
    fn from(side: ActiveSide) -> Self {
        match side {
            ActiveSide::Native => SessionState::EditingNative,
            ActiveSide::Fiat => SessionState::EditingFiat,
        }
    }
}

/// Everything a screen needs to render the current amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountSnapshot {
    pub amount: MonetaryAmount,
    pub side: ActiveSide,
    /// Text in the input field for the active side.
    pub input: String,
    pub native_formatted: String,
    pub fiat_formatted: Option<String>,
    pub verdict: PolicyVerdict,
}

/// One amount-entry session, owned by the screen that presents it.
///
/// Every transition builds a new [`MonetaryAmount`] and publishes a fresh
/// [`AmountSnapshot`] to subscribers. A rejected transition changes nothing.
pub struct AmountSession {
    id: Uuid,
    converter: AmountConverter,
    rates: Arc<dyn RateProvider>,
    policy: Box<dyn AmountPolicy>,
    fiat_currency_code: String,
    side: ActiveSide,
    input: String,
    amount: MonetaryAmount,
    updates: watch::Sender<AmountSnapshot>,
}

impl AmountSession {
    /// Start at zero on the configured default side. A fiat default with no
    /// rate for `fiat_currency_code` falls back to native.
    pub fn new(
        converter: AmountConverter,
        rates: Arc<dyn RateProvider>,
        fiat_currency_code: &str,
    ) -> Self {
        let fiat_currency_code = fiat_currency_code.to_uppercase();
        let rate = rates.rate(&fiat_currency_code);

        let mut side = converter.config().default_side;
        if side == ActiveSide::Fiat && rate.is_none() {
            warn!(code = %fiat_currency_code, "no rate, starting on the native side");
            side = ActiveSide::Native;
        }

        let amount = converter.from_native_units(0, rate.as_ref(), &fiat_currency_code);
        let input = converter
            .input_string(&amount, side)
            .unwrap_or_else(|| "0".to_string());
        let policy: Box<dyn AmountPolicy> = Box::new(NonZeroPolicy);

        let initial = build_snapshot(&converter, policy.as_ref(), &amount, side, &input);
        let (updates, _) = watch::channel(initial);

        let id = Uuid::now_v7();
        debug!(session = %id, side = %side, code = %fiat_currency_code, "amount session started");

        Self {
            id,
            converter,
            rates,
            policy,
            fiat_currency_code,
            side,
            input,
            amount,
            updates,
        }
    }

    /// Replace the flow policy, e.g. after the balance changed.
    pub fn with_policy(mut self, policy: Box<dyn AmountPolicy>) -> Self {
        self.set_policy(policy);
        self
    }

    pub fn set_policy(&mut self, policy: Box<dyn AmountPolicy>) {
        self.policy = policy;
        self.publish();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn side(&self) -> ActiveSide {
        self.side
    }

    pub fn state(&self) -> SessionState {
        self.side.into()
    }

    pub fn amount(&self) -> &MonetaryAmount {
        &self.amount
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn fiat_currency_code(&self) -> &str {
        &self.fiat_currency_code
    }

    pub fn is_allowed_to_continue(&self) -> bool {
        self.policy.check(&self.amount).is_allowed_to_continue()
    }

    /// Whether swapping to the fiat side is currently possible.
    pub fn can_edit_fiat(&self) -> bool {
        self.rates.has_rate(&self.fiat_currency_code)
    }

    pub fn snapshot(&self) -> AmountSnapshot {
        build_snapshot(
            &self.converter,
            self.policy.as_ref(),
            &self.amount,
            self.side,
            &self.input,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<AmountSnapshot> {
        self.updates.subscribe()
    }

    /// Replace the input on the active side.
    pub fn edit(&mut self, input: &str) -> Result<&MonetaryAmount, ParseError> {
        let rate = self.rate();
        let amount = match self.side {
            ActiveSide::Native => {
                self.converter
                    .from_native_string(input, rate.as_ref(), &self.fiat_currency_code)?
            }
            ActiveSide::Fiat => {
                self.converter
                    .from_fiat_string(input, rate.as_ref(), &self.fiat_currency_code)?
            }
        };

        self.amount = amount;
        self.input = input.trim().to_string();
        self.publish();
        Ok(&self.amount)
    }

    /// Apply one keypad press. A rejected key leaves everything unchanged.
    pub fn apply_key(&mut self, key: InputKey) -> Result<&MonetaryAmount, ParseError> {
        let precision = self
            .converter
            .input_precision(self.side, &self.fiat_currency_code);

        match input::apply_key(&self.input, key, precision, self.converter.number_format()) {
            Some(next) => self.edit(&next),
            None => {
                debug!(session = %self.id, ?key, "key rejected");
                Ok(&self.amount)
            }
        }
    }

    pub fn paste(&mut self, text: &str) -> Result<&MonetaryAmount, ParseError> {
        let precision = self
            .converter
            .input_precision(self.side, &self.fiat_currency_code);

        let normalized = input::normalize_paste(text, precision, self.converter.number_format())
            .ok_or_else(|| ParseError::Malformed("clipboard does not hold a number".to_string()))?;
        self.edit(&normalized)
    }

    /// Switch to the other side (the swap control).
    pub fn swap(&mut self) -> Result<&MonetaryAmount, ParseError> {
        self.select_side(self.side.other())
    }

    /// Edit `side` from now on. The other side is re-derived from native units.
    pub fn select_side(&mut self, side: ActiveSide) -> Result<&MonetaryAmount, ParseError> {
        if side == self.side {
            return Ok(&self.amount);
        }

        let rate = self.rate();
        if side == ActiveSide::Fiat && rate.is_none() {
            return Err(ParseError::NoRate(self.fiat_currency_code.clone()));
        }

        let amount = self
            .converter
            .swap_active_side(&self.amount, side, rate.as_ref());
        self.side = side;
        self.adopt(amount);
        Ok(&self.amount)
    }

    /// Set the amount to everything available.
    pub fn select_all(&mut self, max_native_units: u64) -> &MonetaryAmount {
        let rate = self.rate();
        let amount = self.converter.select_all_available(
            max_native_units,
            rate.as_ref(),
            &self.fiat_currency_code,
        );
        self.adopt(amount);
        &self.amount
    }

    /// Switch the fiat currency; refused when there is no rate for `code`.
    /// Native units are kept and the fiat side re-derived.
    pub fn set_fiat_currency(&mut self, code: &str) -> Result<&MonetaryAmount, ParseError> {
        let code = code.to_uppercase();
        let Some(rate) = self.rates.rate(&code) else {
            return Err(ParseError::NoRate(code));
        };

        self.fiat_currency_code = code;
        let amount = self.converter.from_native_units(
            self.amount.native_units(),
            Some(&rate),
            &self.fiat_currency_code,
        );
        self.adopt(amount);
        Ok(&self.amount)
    }

    /// Re-derive the fiat side after the rate provider's rate changed.
    pub fn refresh_rate(&mut self) -> &MonetaryAmount {
        let rate = self.rate();
        let amount = self.converter.from_native_units(
            self.amount.native_units(),
            rate.as_ref(),
            &self.fiat_currency_code,
        );
        self.adopt(amount);
        &self.amount
    }

    fn rate(&self) -> Option<ExchangeRate> {
        self.rates.rate(&self.fiat_currency_code)
    }

    /// Take `amount` as current and rewrite the input for the active side.
    /// Falls back to the native side if the fiat side became unavailable.
    fn adopt(&mut self, amount: MonetaryAmount) {
        let input = match self.converter.input_string(&amount, self.side) {
            Some(input) => input,
            None => {
                warn!(session = %self.id, "fiat side unavailable, editing native");
                self.side = ActiveSide::Native;
                self.converter.to_native_string(&amount)
            }
        };

        self.amount = amount;
        self.input = input;
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        debug!(
            session = %self.id,
            side = %snapshot.side,
            native_units = snapshot.amount.native_units(),
            "amount updated"
        );
        self.updates.send_replace(snapshot);
    }
}

fn build_snapshot(
    converter: &AmountConverter,
    policy: &dyn AmountPolicy,
    amount: &MonetaryAmount,
    side: ActiveSide,
    input: &str,
) -> AmountSnapshot {
    AmountSnapshot {
        amount: amount.clone(),
        side,
        input: input.to_string(),
        native_formatted: converter.format_native(amount, true),
        fiat_formatted: converter.format_fiat(amount),
        verdict: policy.check(amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AmountIssue, SendPolicy};
    use rates::RateCache;
    use rust_decimal_macros::dec;

    fn session_with_usd(price: rust_decimal::Decimal) -> (AmountSession, RateCache) {
        let cache = RateCache::new();
        cache.insert(ExchangeRate::new("USD", price).unwrap());
        let session = AmountSession::new(AmountConverter::default(), Arc::new(cache.clone()), "usd");
        (session, cache)
    }

    #[test]
    fn test_starts_native_at_zero() {
        let (session, _) = session_with_usd(dec!(50));

        assert_eq!(session.state(), SessionState::EditingNative);
        assert_eq!(session.input(), "0");
        assert!(session.amount().is_zero());
        assert!(!session.is_allowed_to_continue());
    }

    #[test]
    fn test_swap_shows_fiat_from_native_truth() {
        let (mut session, _) = session_with_usd(dec!(50));

        session.edit("2.5").unwrap();
        session.swap().unwrap();

        assert_eq!(session.state(), SessionState::EditingFiat);
        assert_eq!(session.input(), "125");
        assert_eq!(session.snapshot().fiat_formatted.as_deref(), Some("$125.00"));
        assert_eq!(session.amount().native_units(), 250_000_000);

        session.swap().unwrap();
        assert_eq!(session.input(), "2.5");
    }

    #[test]
    fn test_swap_without_rate_is_refused() {
        let cache = RateCache::new();
        let mut session = AmountSession::new(AmountConverter::default(), Arc::new(cache), "USD");

        assert_eq!(
            session.swap().err(),
            Some(ParseError::NoRate("USD".to_string()))
        );
        assert_eq!(session.state(), SessionState::EditingNative);
        assert!(!session.can_edit_fiat());
    }

    #[test]
    fn test_failed_edit_keeps_state() {
        let (mut session, _) = session_with_usd(dec!(50));
        session.edit("1").unwrap();

        assert!(session.edit("1.234567890").is_err());

        assert_eq!(session.input(), "1");
        assert_eq!(session.amount().native_units(), 100_000_000);
    }

    #[test]
    fn test_keypad_on_fiat_side() {
        let (mut session, _) = session_with_usd(dec!(50));
        session.swap().unwrap();

        for key in [
            InputKey::Digit(2),
            InputKey::Digit(5),
            InputKey::Separator,
            InputKey::Digit(5),
            InputKey::Digit(0),
            InputKey::Digit(9),
        ] {
            session.apply_key(key).unwrap();
        }

        assert_eq!(session.input(), "25.50");
        assert_eq!(session.amount().native_units(), 51_000_000);
    }

    #[test]
    fn test_typing_continues_after_swap_to_fiat() {
        let (mut session, _) = session_with_usd(dec!(50));
        session.edit("2.5").unwrap();
        session.swap().unwrap();

        for key in [InputKey::Digit(5), InputKey::Separator, InputKey::Digit(5)] {
            session.apply_key(key).unwrap();
        }

        assert_eq!(session.input(), "1255.5");
        assert_eq!(session.amount().native_units(), 2_511_000_000);
    }

    #[test]
    fn test_typing_after_select_all_on_fiat() {
        let (mut session, _) = session_with_usd(dec!(40));
        session.swap().unwrap();

        session.select_all(30_000_000);
        assert_eq!(session.input(), "12");

        session.apply_key(InputKey::Backspace).unwrap();
        session.apply_key(InputKey::Digit(5)).unwrap();

        assert_eq!(session.input(), "15");
        assert_eq!(session.amount().native_units(), 37_500_000);
    }

    #[test]
    fn test_policy_verdict_in_snapshot() {
        let (session, _) = session_with_usd(dec!(50));
        let mut session = session.with_policy(Box::new(SendPolicy::new(1_000, 100_000_000)));

        session.edit("2").unwrap();

        let snapshot = session.snapshot();
        assert_eq!(
            snapshot.verdict.issue,
            Some(AmountIssue::InsufficientFunds {
                available: 100_000_000
            })
        );
        assert_eq!(snapshot.native_formatted, "DASH 2");
        assert_eq!(snapshot.fiat_formatted.as_deref(), Some("$100.00"));
    }
}
