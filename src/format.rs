// src/format.rs
use crate::{Currency, ParseError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `Decimal` holds at most 28 significant digits.
const MAX_SIGNIFICANT_DIGITS: usize = 28;

/// Locale separators used both to read user input and to render amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: Some(','),
        }
    }
}

impl NumberFormat {
    /// Comma decimals with dot grouping (`1.234,56`).
    pub fn comma_decimal() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: Some('.'),
        }
    }
}

/// A parsed non-negative decimal and how many fractional digits were typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDecimal {
    pub value: Decimal,
    /// Literal count, trailing zeros included.
    pub fraction_digits: u32,
}

/// Parse a locale-formatted, non-negative decimal.
///
/// Grouping separators are accepted in the integer part only, and must split
/// it into groups of three (`"1,234"`, not `"1,2,3"` or `"1,"`). A trailing
/// decimal separator (`"1."`) or a missing integer part (`".5"`) is fine; a
/// lone separator, signs and any other character are not.
pub fn parse_decimal(input: &str, format: &NumberFormat) -> Result<ParsedDecimal, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Malformed("empty input".to_string()));
    }

    let mut integer = String::new();
    let mut fraction = String::new();
    let mut seen_separator = false;
    // Digits since the last grouping separator, and whether one was seen.
    let mut group_len = 0usize;
    let mut grouped = false;

    for ch in input.chars() {
        if ch == format.decimal_separator {
            if seen_separator {
                return Err(ParseError::Malformed(
                    "more than one decimal separator".to_string(),
                ));
            }
            check_last_group(grouped, group_len)?;
            seen_separator = true;
        } else if Some(ch) == format.grouping_separator {
            let misplaced = seen_separator
                || integer.is_empty()
                || (grouped && group_len != 3)
                || group_len > 3;
            if misplaced {
                return Err(ParseError::Malformed(format!(
                    "misplaced grouping separator '{}'",
                    ch
                )));
            }
            grouped = true;
            group_len = 0;
        } else if ch.is_ascii_digit() {
            if seen_separator {
                fraction.push(ch);
            } else {
                integer.push(ch);
                group_len += 1;
            }
        } else {
            return Err(ParseError::Malformed(format!(
                "unexpected character '{}'",
                ch
            )));
        }
    }

    if !seen_separator {
        check_last_group(grouped, group_len)?;
    }

    if integer.is_empty() && fraction.is_empty() {
        return Err(ParseError::Malformed("no digits".to_string()));
    }

    let fraction_digits = fraction.len() as u32;

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    if integer.len() > MAX_SIGNIFICANT_DIGITS - 8 {
        return Err(ParseError::Overflow);
    }

    // Digits past what Decimal can hold only matter for rounding, and the
    // callers round far above that position.
    fraction.truncate(MAX_SIGNIFICANT_DIGITS - integer.len());

    let normalized = if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fraction)
    };

    let value =
        Decimal::from_str(&normalized).map_err(|e| ParseError::Malformed(e.to_string()))?;

    Ok(ParsedDecimal {
        value,
        fraction_digits,
    })
}

fn check_last_group(grouped: bool, group_len: usize) -> Result<(), ParseError> {
    if grouped && group_len != 3 {
        return Err(ParseError::Malformed(
            "digit groups must have three digits".to_string(),
        ));
    }
    Ok(())
}

/// Shortest plain rendering, no grouping: `2.50` becomes `"2.5"`.
pub fn format_plain(value: Decimal, format: &NumberFormat) -> String {
    localize(&value.normalize().to_string(), format, false)
}

/// Rounded half up to `scale` places and always shown with exactly that many.
pub fn format_fixed(value: Decimal, scale: u32, format: &NumberFormat) -> String {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    localize(&rounded.to_string(), format, false)
}

/// `"DASH 1.2345678"`, or just `"1.2345678"` without the symbol.
pub fn format_native(
    units: u64,
    currency: &Currency,
    format: &NumberFormat,
    with_symbol: bool,
) -> String {
    let value = currency.to_display(units).normalize();
    let body = localize(&value.to_string(), format, true);

    if with_symbol {
        format!("{} {}", currency.code(), body)
    } else {
        body
    }
}

/// `"$1,234.50"` for known symbols, `"CHF 1,234.50"` otherwise.
pub fn format_fiat(value: Decimal, currency: &Currency, format: &NumberFormat) -> String {
    let mut rounded =
        value.round_dp_with_strategy(currency.decimals(), RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(currency.decimals());
    let body = localize(&rounded.to_string(), format, true);

    match currency.symbol() {
        Some(symbol) => format!("{}{}", symbol, body),
        None => format!("{} {}", currency.code(), body),
    }
}

/// Swap in the locale decimal separator and optionally group the integer part.
fn localize(plain: &str, format: &NumberFormat, grouped: bool) -> String {
    let (integer, fraction) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };

    let mut out = match (grouped, format.grouping_separator) {
        (true, Some(sep)) => group_thousands(integer, sep),
        _ => integer.to_string(),
    };

    if let Some(fraction) = fraction {
        out.push(format.decimal_separator);
        out.push_str(fraction);
    }

    out
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }

    out
}
