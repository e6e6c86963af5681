// rates/src/error.rs
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    InvalidPrice(String),
    Source(String),
    Decode(String),
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrice(code) => write!(f, "Invalid price for {}", code),
            Self::Source(msg) => write!(f, "Rate source error: {}", msg),
            Self::Decode(msg) => write!(f, "Rate decode error: {}", msg),
        }
    }
}

impl std::error::Error for RateError {}
