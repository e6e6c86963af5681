// src/currency.rs
use once_cell::sync::Lazy;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NATIVE_CODE: &str = "DASH";
pub const NATIVE_DECIMALS: u32 = 8;

/// Native units (duffs) in one whole coin.
pub const DUFFS: u64 = 100_000_000;

/// No native amount larger than this is valid.
pub const MAX_MONEY: u64 = 21_000_000 * DUFFS;

const DEFAULT_FIAT_DECIMALS: u32 = 2;

/// ISO 4217 minor units for currencies that do not use two.
static FIAT_MINOR_UNITS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("BIF", 0),
        ("CLP", 0),
        ("DJF", 0),
        ("GNF", 0),
        ("ISK", 0),
        ("JPY", 0),
        ("KMF", 0),
        ("KRW", 0),
        ("PYG", 0),
        ("RWF", 0),
        ("UGX", 0),
        ("VND", 0),
        ("VUV", 0),
        ("XAF", 0),
        ("XOF", 0),
        ("XPF", 0),
        ("BHD", 3),
        ("IQD", 3),
        ("JOD", 3),
        ("KWD", 3),
        ("LYD", 3),
        ("OMR", 3),
        ("TND", 3),
    ])
});

static CURRENCY_SYMBOLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USD", "$"),
        ("EUR", "€"),
        ("GBP", "£"),
        ("JPY", "¥"),
        ("CNY", "¥"),
        ("INR", "₹"),
        ("KRW", "₩"),
        ("RUB", "₽"),
        ("UAH", "₴"),
        ("NGN", "₦"),
        ("PHP", "₱"),
        ("TRY", "₺"),
        ("ILS", "₪"),
        ("VND", "₫"),
        ("BRL", "R$"),
        ("AUD", "A$"),
        ("CAD", "CA$"),
        ("MXN", "MX$"),
    ])
});

/// Most decimal places a `Decimal` can scale to.
pub const MAX_DECIMALS: u32 = 28;

/// A currency and how many decimal places its smallest unit represents.
///
/// `decimals` never exceeds [`MAX_DECIMALS`], including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCurrency")]
pub struct Currency {
    code: String,
    decimals: u32,
}

#[derive(Deserialize)]
struct RawCurrency {
    code: String,
    decimals: u32,
}

impl TryFrom<RawCurrency> for Currency {
    type Error = String;

    fn try_from(raw: RawCurrency) -> Result<Self, Self::Error> {
        Currency::new(&raw.code, raw.decimals).ok_or_else(|| {
            format!(
                "{} has {} decimals, at most {} are supported",
                raw.code, raw.decimals, MAX_DECIMALS
            )
        })
    }
}

impl Currency {
    /// `None` when `decimals` is above [`MAX_DECIMALS`].
    pub fn new(code: &str, decimals: u32) -> Option<Self> {
        (decimals <= MAX_DECIMALS).then(|| Self {
            code: code.to_uppercase(),
            decimals,
        })
    }

    pub fn native() -> Self {
        Self {
            code: NATIVE_CODE.to_string(),
            decimals: NATIVE_DECIMALS,
        }
    }

    /// Fiat currency with its ISO 4217 minor units (two unless listed otherwise).
    pub fn fiat(code: &str) -> Self {
        let code = code.to_uppercase();
        let decimals = FIAT_MINOR_UNITS
            .get(code.as_str())
            .copied()
            .unwrap_or(DEFAULT_FIAT_DECIMALS);
        Self { code, decimals }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn symbol(&self) -> Option<&'static str> {
        CURRENCY_SYMBOLS.get(self.code.as_str()).copied()
    }

    /// Whole-currency value to smallest units, rounding half up.
    /// `None` if the value is negative or does not fit in a `u64`.
    pub fn to_units(&self, display_amount: Decimal) -> Option<u64> {
        if display_amount.is_sign_negative() && !display_amount.is_zero() {
            return None;
        }

        let factor = Decimal::from(10u64.checked_pow(self.decimals)?);
        display_amount
            .checked_mul(factor)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
    }

    /// Smallest units to an exact whole-currency value.
    pub fn to_display(&self, units: u64) -> Decimal {
        // A u64 fits the 96-bit mantissa and decimals are capped at MAX_DECIMALS.
        Decimal::from_i128_with_scale(units as i128, self.decimals)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::native()
    }
}
