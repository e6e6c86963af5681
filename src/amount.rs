// src/amount.rs
use crate::Currency;
use rates::ExchangeRate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Which of the two representations the user is typing into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveSide {
    #[default]
    Native,
    Fiat,
}

impl ActiveSide {
    pub fn other(self) -> Self {
        match self {
            ActiveSide::Native => ActiveSide::Fiat,
            ActiveSide::Fiat => ActiveSide::Native,
        }
    }

    pub fn is_native(self) -> bool {
        matches!(self, ActiveSide::Native)
    }
}

impl fmt::Display for ActiveSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveSide::Native => write!(f, "native"),
            ActiveSide::Fiat => write!(f, "fiat"),
        }
    }
}

impl FromStr for ActiveSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(ActiveSide::Native),
            "fiat" => Ok(ActiveSide::Fiat),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

/// An amount held as native units with its fiat value derived alongside.
///
/// Invariants:
/// - `native_units` is the source of truth
/// - `fiat` is computed from `native_units` and the rate at construction and
///   is never set on its own
/// - values are immutable; every edit builds a new one
///
/// Serialize-only: a stored fiat value could disagree with `native_units`, so
/// amounts are rebuilt from native units rather than read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonetaryAmount {
    native_units: u64,
    fiat_currency_code: String,
    fiat: Option<Decimal>,
}

impl MonetaryAmount {
    /// Derive the fiat side from `native_units`.
    ///
    /// The fiat side is absent when there is no rate, the rate is for another
    /// currency, or the product does not fit in a `Decimal`.
    pub(crate) fn derive(
        native_units: u64,
        native: &Currency,
        rate: Option<&ExchangeRate>,
        fiat_currency_code: &str,
    ) -> Self {
        let fiat_currency_code = fiat_currency_code.to_uppercase();

        let fiat = rate.filter(|r| r.is_for(&fiat_currency_code)).and_then(|r| {
            let fiat = native.to_display(native_units).checked_mul(r.price());
            if fiat.is_none() {
                warn!(native_units, code = %fiat_currency_code, "fiat value overflowed");
            }
            fiat
        });

        Self {
            native_units,
            fiat_currency_code,
            fiat,
        }
    }

    pub fn native_units(&self) -> u64 {
        self.native_units
    }

    pub fn fiat_currency_code(&self) -> &str {
        &self.fiat_currency_code
    }

    /// Unrounded fiat value, if a rate was available.
    pub fn fiat(&self) -> Option<Decimal> {
        self.fiat
    }

    pub fn has_fiat(&self) -> bool {
        self.fiat.is_some()
    }

    pub fn is_zero(&self) -> bool {
        self.native_units == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_derive_with_rate() {
        let rate = ExchangeRate::new("USD", dec!(100)).unwrap();
        let amount = MonetaryAmount::derive(150_000_000, &Currency::native(), Some(&rate), "usd");

        assert_eq!(amount.native_units(), 150_000_000);
        assert_eq!(amount.fiat_currency_code(), "USD");
        assert_eq!(amount.fiat(), Some(dec!(150)));
    }

    #[test]
    fn test_derive_without_rate() {
        let amount = MonetaryAmount::derive(1, &Currency::native(), None, "USD");
        assert!(!amount.has_fiat());
        assert!(!amount.is_zero());
    }

    #[test]
    fn test_derive_ignores_rate_for_other_currency() {
        let rate = ExchangeRate::new("EUR", dec!(90)).unwrap();
        let amount = MonetaryAmount::derive(100, &Currency::native(), Some(&rate), "USD");
        assert_eq!(amount.fiat(), None);
    }

    #[test]
    fn test_serialized_fiat_matches_native_units() {
        let rate = ExchangeRate::new("USD", dec!(50)).unwrap();
        let amount = MonetaryAmount::derive(250_000_000, &Currency::native(), Some(&rate), "USD");

        let json = serde_json::to_value(&amount).unwrap();

        assert_eq!(json["native_units"], 250_000_000);
        assert_eq!(json["fiat_currency_code"], "USD");
        let fiat: Decimal = json["fiat"].as_str().unwrap().parse().unwrap();
        assert_eq!(fiat, dec!(125));
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("Fiat".parse::<ActiveSide>(), Ok(ActiveSide::Fiat));
        assert_eq!(" native ".parse::<ActiveSide>(), Ok(ActiveSide::Native));
        assert!("both".parse::<ActiveSide>().is_err());
        assert_eq!(ActiveSide::Native.other(), ActiveSide::Fiat);
        assert_eq!(ActiveSide::default(), ActiveSide::Native);
    }
}
