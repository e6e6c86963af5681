// src/validation.rs
use crate::MonetaryAmount;
use metrics::counter;
use serde::{Deserialize, Serialize};

/// Inclusive native-unit range an amount must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationBounds {
    /// Network dust / minimum output floor.
    pub minimum_native_units: u64,
    /// Spendable balance or account limit.
    pub maximum_native_units: u64,
}

impl ValidationBounds {
    pub fn new(minimum_native_units: u64, maximum_native_units: u64) -> Self {
        Self {
            minimum_native_units,
            maximum_native_units,
        }
    }

    /// Anything from zero to `maximum_native_units`.
    pub fn up_to(maximum_native_units: u64) -> Self {
        Self::new(0, maximum_native_units)
    }

    /// Below-minimum is reported before above-maximum, so inverted bounds
    /// reject everything with `BelowMinimum` or `AboveMaximum`.
    pub fn check(&self, native_units: u64) -> ValidationResult {
        if native_units < self.minimum_native_units {
            ValidationResult::BelowMinimum(self.minimum_native_units)
        } else if native_units > self.maximum_native_units {
            ValidationResult::AboveMaximum(self.maximum_native_units)
        } else {
            ValidationResult::Ok
        }
    }

    pub fn contains(&self, native_units: u64) -> bool {
        self.check(native_units).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Ok,
    BelowMinimum(u64),
    AboveMaximum(u64),
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    fn label(&self) -> &'static str {
        match self {
            ValidationResult::Ok => "ok",
            ValidationResult::BelowMinimum(_) => "below_minimum",
            ValidationResult::AboveMaximum(_) => "above_maximum",
        }
    }
}

/// Check `amount` against `bounds`. Equality with either bound passes.
pub fn validate(amount: &MonetaryAmount, bounds: &ValidationBounds) -> ValidationResult {
    let result = bounds.check(amount.native_units());
    counter!("amount.validation.total", "result" => result.label()).increment(1);
    result
}
