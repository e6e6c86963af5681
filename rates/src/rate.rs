// rates/src/rate.rs
use crate::RateError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of one whole native coin expressed in a fiat currency.
///
/// Invariant: `price` is strictly positive. Every way to build one, including
/// deserialization, goes through [`ExchangeRate::at`], which enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExchangeRate")]
pub struct ExchangeRate {
    code: String,
    price: Decimal,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawExchangeRate {
    code: String,
    price: Decimal,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RawExchangeRate> for ExchangeRate {
    type Error = RateError;

    fn try_from(raw: RawExchangeRate) -> Result<Self, Self::Error> {
        ExchangeRate::at(&raw.code, raw.price, raw.updated_at)
    }
}

impl ExchangeRate {
    pub fn new(code: &str, price: Decimal) -> Result<Self, RateError> {
        Self::at(code, price, Utc::now())
    }

    pub fn at(code: &str, price: Decimal, updated_at: DateTime<Utc>) -> Result<Self, RateError> {
        if price <= Decimal::ZERO {
            return Err(RateError::InvalidPrice(code.to_string()));
        }

        Ok(Self {
            code: code.to_uppercase(),
            price,
            updated_at,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether this rate prices `code`. Comparison ignores ASCII case.
    pub fn is_for(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }

    /// Age of this rate relative to now.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_rejects_non_positive_price() {
        assert_eq!(
            ExchangeRate::new("USD", Decimal::ZERO),
            Err(RateError::InvalidPrice("USD".to_string()))
        );
        assert!(ExchangeRate::new("USD", dec!(-1)).is_err());
    }

    #[test]
    fn test_rate_normalizes_code() {
        let rate = ExchangeRate::new("usd", dec!(30.5)).unwrap();
        assert_eq!(rate.code(), "USD");
        assert!(rate.is_for("usd"));
        assert!(rate.is_for("USD"));
        assert!(!rate.is_for("EUR"));
        assert_eq!(rate.price(), dec!(30.5));
    }

    #[test]
    fn test_age() {
        let rate = ExchangeRate::new("EUR", dec!(27)).unwrap();
        assert!(rate.age().num_milliseconds() < 100);
    }

    #[test]
    fn test_deserialize_enforces_positive_price() {
        let json = r#"{"code":"usd","price":"30.5","updated_at":"2026-01-01T00:00:00Z"}"#;
        let rate: ExchangeRate = serde_json::from_str(json).unwrap();
        assert_eq!(rate.code(), "USD");
        assert_eq!(rate.price(), dec!(30.5));

        for price in ["0", "-2"] {
            let json = format!(
                r#"{{"code":"USD","price":"{}","updated_at":"2026-01-01T00:00:00Z"}}"#,
                price
            );
            let err = serde_json::from_str::<ExchangeRate>(&json).unwrap_err();
            assert!(err.to_string().contains("USD"), "{}", err);
        }
    }

    #[test]
    fn test_serialized_rate_reads_back() {
        let rate = ExchangeRate::new("EUR", dec!(27.4)).unwrap();
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(serde_json::from_str::<ExchangeRate>(&json).unwrap(), rate);
    }
}
