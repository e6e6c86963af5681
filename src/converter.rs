// src/converter.rs
use crate::format::{self, NumberFormat, ParsedDecimal};
use crate::{
    ActiveSide, Currency, MAX_MONEY, MonetaryAmount, ParseError, ValidationBounds,
    ValidationResult, validation,
};
use metrics::counter;
use rates::ExchangeRate;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with more fractional digits than a currency supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcessPrecision {
    /// Fail with [`ParseError::TooPrecise`].
    #[default]
    Reject,
    /// Round half up to the supported precision.
    Round,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub native: Currency,
    pub max_native_units: u64,
    pub number_format: NumberFormat,
    pub excess_precision: ExcessPrecision,
    /// Side a new amount-entry session starts on.
    pub default_side: ActiveSide,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            native: Currency::native(),
            max_native_units: MAX_MONEY,
            number_format: NumberFormat::default(),
            excess_precision: ExcessPrecision::Reject,
            default_side: ActiveSide::Native,
        }
    }
}

impl ConverterConfig {
    /// Defaults overridden by `AMOUNT_DEFAULT_SIDE` (`native`/`fiat`),
    /// `AMOUNT_DECIMAL_SEPARATOR` (`.` or `,`) and `AMOUNT_EXCESS_PRECISION`
    /// (`reject`/`round`). Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(side) = std::env::var("AMOUNT_DEFAULT_SIDE") {
            match side.parse() {
                Ok(side) => config.default_side = side,
                Err(e) => warn!(error = %e, "ignoring AMOUNT_DEFAULT_SIDE"),
            }
        }

        if let Ok(separator) = std::env::var("AMOUNT_DECIMAL_SEPARATOR") {
            match separator.trim() {
                "." => config.number_format = NumberFormat::default(),
                "," => config.number_format = NumberFormat::comma_decimal(),
                other => warn!(value = %other, "ignoring AMOUNT_DECIMAL_SEPARATOR"),
            }
        }

        if let Ok(policy) = std::env::var("AMOUNT_EXCESS_PRECISION") {
            match policy.trim().to_ascii_lowercase().as_str() {
                "reject" => config.excess_precision = ExcessPrecision::Reject,
                "round" => config.excess_precision = ExcessPrecision::Round,
                other => warn!(value = %other, "ignoring AMOUNT_EXCESS_PRECISION"),
            }
        }

        config
    }
}

/// Converts between native units and fiat.
///
/// Holds configuration only. Every operation takes its context as arguments
/// and returns a fresh value, so one converter can be shared freely across
/// threads and sessions.
#[derive(Debug, Clone, Default)]
pub struct AmountConverter {
    config: ConverterConfig,
}

impl AmountConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn native_currency(&self) -> &Currency {
        &self.config.native
    }

    pub fn number_format(&self) -> &NumberFormat {
        &self.config.number_format
    }

    /// Maximum fractional digits accepted while typing on `side`.
    pub fn input_precision(&self, side: ActiveSide, fiat_currency_code: &str) -> u32 {
        match side {
            ActiveSide::Native => self.config.native.decimals(),
            ActiveSide::Fiat => Currency::fiat(fiat_currency_code).decimals(),
        }
    }

    pub fn from_native_units(
        &self,
        native_units: u64,
        rate: Option<&ExchangeRate>,
        fiat_currency_code: &str,
    ) -> MonetaryAmount {
        MonetaryAmount::derive(native_units, &self.config.native, rate, fiat_currency_code)
    }

    /// Parse a native-currency amount such as `"1.2345678"`.
    pub fn from_native_string(
        &self,
        input: &str,
        rate: Option<&ExchangeRate>,
        fiat_currency_code: &str,
    ) -> Result<MonetaryAmount, ParseError> {
        let result = self.native_units_from_str(input);
        record_parse(ActiveSide::Native, &result);

        let native_units = result?;
        debug!(input, native_units, "parsed native amount");
        Ok(self.from_native_units(native_units, rate, fiat_currency_code))
    }

    /// Parse a fiat amount such as `"125.00"` and convert it to native units.
    ///
    /// Fails with [`ParseError::NoRate`] whenever `rate` is absent or prices a
    /// different currency, whatever the input.
    pub fn from_fiat_string(
        &self,
        input: &str,
        rate: Option<&ExchangeRate>,
        fiat_currency_code: &str,
    ) -> Result<MonetaryAmount, ParseError> {
        let result = self.native_units_from_fiat_str(input, rate, fiat_currency_code);
        record_parse(ActiveSide::Fiat, &result);

        let native_units = result?;
        debug!(input, native_units, code = fiat_currency_code, "parsed fiat amount");
        Ok(self.from_native_units(native_units, rate, fiat_currency_code))
    }

    /// The whole of `max_native_units`, fee handling left to the caller.
    pub fn select_all_available(
        &self,
        max_native_units: u64,
        rate: Option<&ExchangeRate>,
        fiat_currency_code: &str,
    ) -> MonetaryAmount {
        self.from_native_units(max_native_units, rate, fiat_currency_code)
    }

    pub fn validate(&self, amount: &MonetaryAmount, bounds: &ValidationBounds) -> ValidationResult {
        validation::validate(amount, bounds)
    }

    /// Re-express `current` for editing on `new_side`.
    ///
    /// The fiat side is always recomputed from `current.native_units()`; the
    /// fiat value stored in `current` is never reused.
    pub fn swap_active_side(
        &self,
        current: &MonetaryAmount,
        new_side: ActiveSide,
        rate: Option<&ExchangeRate>,
    ) -> MonetaryAmount {
        debug!(side = %new_side, native_units = current.native_units(), "swapping active side");
        self.from_native_units(current.native_units(), rate, current.fiat_currency_code())
    }

    /// Native amount as typed input: `"2.5"`, no grouping, no symbol.
    pub fn to_native_string(&self, amount: &MonetaryAmount) -> String {
        let value = self.config.native.to_display(amount.native_units());
        format::format_plain(value, &self.config.number_format)
    }

    /// Fiat amount rounded to the currency's minor units: `"125.00"`.
    pub fn to_fiat_string(&self, amount: &MonetaryAmount) -> Option<String> {
        let currency = Currency::fiat(amount.fiat_currency_code());
        amount
            .fiat()
            .map(|fiat| format::format_fixed(fiat, currency.decimals(), &self.config.number_format))
    }

    /// Fiat amount as editable input: rounded to minor units, trailing zeros
    /// dropped (`"125"`, `"0.5"`), so the keypad can keep typing.
    pub fn to_fiat_input(&self, amount: &MonetaryAmount) -> Option<String> {
        let currency = Currency::fiat(amount.fiat_currency_code());
        amount.fiat().map(|fiat| {
            let rounded = fiat
                .round_dp_with_strategy(currency.decimals(), RoundingStrategy::MidpointAwayFromZero);
            format::format_plain(rounded, &self.config.number_format)
        })
    }

    /// Text to place in the input field when editing `side`.
    pub fn input_string(&self, amount: &MonetaryAmount, side: ActiveSide) -> Option<String> {
        match side {
            ActiveSide::Native => Some(self.to_native_string(amount)),
            ActiveSide::Fiat => self.to_fiat_input(amount),
        }
    }

    /// `"DASH 2.5"` with the symbol, `"2.5"` without.
    pub fn format_native(&self, amount: &MonetaryAmount, with_symbol: bool) -> String {
        format::format_native(
            amount.native_units(),
            &self.config.native,
            &self.config.number_format,
            with_symbol,
        )
    }

    /// `"$125.00"`, or `None` when the amount has no fiat side.
    pub fn format_fiat(&self, amount: &MonetaryAmount) -> Option<String> {
        let currency = Currency::fiat(amount.fiat_currency_code());
        amount
            .fiat()
            .map(|fiat| format::format_fiat(fiat, &currency, &self.config.number_format))
    }

    fn native_units_from_str(&self, input: &str) -> Result<u64, ParseError> {
        let native = &self.config.native;
        let parsed = format::parse_decimal(input, &self.config.number_format)?;
        self.check_precision(&parsed, native.decimals())?;

        let native_units = native.to_units(parsed.value).ok_or(ParseError::Overflow)?;
        self.check_max(native_units)
    }

    fn native_units_from_fiat_str(
        &self,
        input: &str,
        rate: Option<&ExchangeRate>,
        fiat_currency_code: &str,
    ) -> Result<u64, ParseError> {
        let rate = rate
            .filter(|r| r.is_for(fiat_currency_code))
            .ok_or_else(|| ParseError::NoRate(fiat_currency_code.to_uppercase()))?;

        let fiat = Currency::fiat(fiat_currency_code);
        let parsed = format::parse_decimal(input, &self.config.number_format)?;
        self.check_precision(&parsed, fiat.decimals())?;

        let coins = parsed
            .value
            .checked_div(rate.price())
            .ok_or(ParseError::Overflow)?;
        let native_units = self
            .config
            .native
            .to_units(coins)
            .ok_or(ParseError::Overflow)?;
        self.check_max(native_units)
    }

    fn check_precision(&self, parsed: &ParsedDecimal, allowed: u32) -> Result<(), ParseError> {
        if parsed.fraction_digits > allowed
            && self.config.excess_precision == ExcessPrecision::Reject
        {
            return Err(ParseError::TooPrecise { allowed });
        }
        Ok(())
    }

    fn check_max(&self, native_units: u64) -> Result<u64, ParseError> {
        if native_units > self.config.max_native_units {
            return Err(ParseError::Overflow);
        }
        Ok(native_units)
    }
}

fn record_parse<T>(side: ActiveSide, result: &Result<T, ParseError>) {
    let side = match side {
        ActiveSide::Native => "native",
        ActiveSide::Fiat => "fiat",
    };
    let status = match result {
        Ok(_) => "ok",
        Err(ParseError::Malformed(_)) => "malformed",
        Err(ParseError::TooPrecise { .. }) => "too_precise",
        Err(ParseError::NoRate(_)) => "no_rate",
        Err(ParseError::Overflow) => "overflow",
    };
    counter!("amount.parse.total", "side" => side, "status" => status).increment(1);
}
