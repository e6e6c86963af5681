// src/error.rs
use serde::Serialize;
use std::fmt;

/// Why an input string could not become a [`MonetaryAmount`](crate::MonetaryAmount).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    /// Not a non-negative decimal in the configured number format.
    Malformed(String),
    /// More fractional digits than the currency supports.
    TooPrecise { allowed: u32 },
    /// Fiat entry attempted without a rate for this currency code.
    NoRate(String),
    /// Larger than the maximum representable native amount.
    Overflow,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "Malformed amount: {}", reason),
            Self::TooPrecise { allowed } => {
                write!(f, "Too precise: at most {} fractional digits", allowed)
            }
            Self::NoRate(code) => write!(f, "No exchange rate for {}", code),
            Self::Overflow => write!(f, "Amount exceeds the maximum supply"),
        }
    }
}

impl std::error::Error for ParseError {}
