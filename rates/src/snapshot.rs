// rates/src/snapshot.rs
use crate::{ExchangeRate, RateError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct Envelope {
    data: RatesPayload,
}

/// Body of an exchange-rates response: prices of one `currency` unit in each
/// quoted currency, as decimal strings.
#[derive(Debug, Deserialize)]
pub struct RatesPayload {
    pub currency: String,
    #[serde(default)]
    pub rates: Option<HashMap<String, String>>,
}

/// Decode a `{"data": {"currency": ..., "rates": {...}}}` document quoted
/// for `base`.
///
/// Entries whose price is not a positive decimal are skipped. A payload
/// without a `rates` object, or quoted for another currency, is an error.
pub fn decode_rates(json: &str, base: &str) -> Result<Vec<ExchangeRate>, RateError> {
    let envelope: Envelope =
        serde_json::from_str(json).map_err(|e| RateError::Decode(e.to_string()))?;
    rates_from_payload(envelope.data, base)
}

pub fn rates_from_payload(payload: RatesPayload, base: &str) -> Result<Vec<ExchangeRate>, RateError> {
    if !payload.currency.eq_ignore_ascii_case(base) {
        return Err(RateError::Decode(format!(
            "rates quoted for {}, expected {}",
            payload.currency, base
        )));
    }

    let Some(raw) = payload.rates else {
        return Err(RateError::Decode(format!(
            "no rates quoted for {}",
            payload.currency
        )));
    };

    let mut rates = Vec::with_capacity(raw.len());
    for (code, value) in raw {
        let price = match Decimal::from_str(value.trim()) {
            Ok(price) => price,
            Err(e) => {
                warn!(code = %code, value = %value, error = %e, "skipping unparsable rate");
                continue;
            }
        };

        match ExchangeRate::new(&code, price) {
            Ok(rate) => rates.push(rate),
            Err(e) => warn!(code = %code, error = %e, "skipping rate"),
        }
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_rates() {
        let json = r#"{"data":{"currency":"DASH","rates":{"USD":"30.12","EUR":"27.5"}}}"#;

        let mut rates = decode_rates(json, "DASH").unwrap();
        rates.sort_by(|a, b| a.code().cmp(b.code()));

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].code(), "EUR");
        assert_eq!(rates[0].price(), dec!(27.5));
        assert_eq!(rates[1].code(), "USD");
        assert_eq!(rates[1].price(), dec!(30.12));
    }

    #[test]
    fn test_decode_skips_bad_prices() {
        let json = r#"{"data":{"currency":"DASH","rates":{"USD":"abc","EUR":"0","GBP":"22.1"}}}"#;

        let rates = decode_rates(json, "DASH").unwrap();

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].code(), "GBP");
    }

    #[test]
    fn test_decode_without_rates_fails() {
        let json = r#"{"data":{"currency":"DASH"}}"#;
        assert!(matches!(decode_rates(json, "DASH"), Err(RateError::Decode(_))));
    }

    #[test]
    fn test_decode_malformed_json() {
        assert!(matches!(decode_rates("{", "DASH"), Err(RateError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_other_base_currency() {
        let json = r#"{"data":{"currency":"BTC","rates":{"USD":"65000"}}}"#;

        assert_eq!(
            decode_rates(json, "DASH"),
            Err(RateError::Decode("rates quoted for BTC, expected DASH".to_string()))
        );
        assert_eq!(decode_rates(json, "btc").unwrap().len(), 1);
    }
}
