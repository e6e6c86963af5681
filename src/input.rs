// src/input.rs
use crate::format::{self, NumberFormat};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// One key press on the amount keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKey {
    Digit(u8),
    Separator,
    Backspace,
    Clear,
}

/// Apply `key` to the input string `current`.
///
/// Returns `None` when the key is rejected: a non-decimal digit, a second
/// separator, a separator where no fraction is allowed, or a digit past
/// `max_fraction_digits`. Deleting the last character leaves `"0"`.
pub fn apply_key(
    current: &str,
    key: InputKey,
    max_fraction_digits: u32,
    format: &NumberFormat,
) -> Option<String> {
    let separator = format.decimal_separator;

    match key {
        InputKey::Digit(d) if d > 9 => None,
        InputKey::Digit(d) => {
            let digit = char::from(b'0' + d);
            match current.split_once(separator) {
                Some((_, fraction)) => {
                    if fraction.chars().count() >= max_fraction_digits as usize {
                        return None;
                    }
                    Some(format!("{}{}", current, digit))
                }
                None if current.is_empty() || current == "0" => Some(digit.to_string()),
                None => Some(format!("{}{}", current, digit)),
            }
        }
        InputKey::Separator => {
            if max_fraction_digits == 0 || current.contains(separator) {
                return None;
            }
            let integer = if current.is_empty() { "0" } else { current };
            Some(format!("{}{}", integer, separator))
        }
        InputKey::Backspace => {
            let mut next = current.to_string();
            next.pop();
            if next.is_empty() {
                next.push('0');
            }
            Some(next)
        }
        InputKey::Clear => Some("0".to_string()),
    }
}

/// Turn clipboard text into an input string.
///
/// Grouping separators and surrounding whitespace are dropped and extra
/// fractional digits are rounded half up. `None` if the text is not a number.
pub fn normalize_paste(text: &str, max_fraction_digits: u32, format: &NumberFormat) -> Option<String> {
    let parsed = format::parse_decimal(text, format).ok()?;
    let value = parsed
        .value
        .round_dp_with_strategy(max_fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    Some(format::format_plain(value, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(current: &str, key: InputKey, max: u32) -> Option<String> {
        apply_key(current, key, max, &NumberFormat::default())
    }

    fn type_keys(keys: &[InputKey], max: u32) -> String {
        keys.iter().fold("0".to_string(), |current, key| {
            press(&current, *key, max).unwrap_or(current)
        })
    }

    #[test]
    fn test_leading_zero_is_replaced() {
        assert_eq!(press("0", InputKey::Digit(5), 8).as_deref(), Some("5"));
        assert_eq!(press("0", InputKey::Digit(0), 8).as_deref(), Some("0"));
        assert_eq!(press("5", InputKey::Digit(0), 8).as_deref(), Some("50"));
    }

    #[test]
    fn test_separator_rules() {
        assert_eq!(press("0", InputKey::Separator, 8).as_deref(), Some("0."));
        assert_eq!(press("", InputKey::Separator, 8).as_deref(), Some("0."));
        assert_eq!(press("1.5", InputKey::Separator, 8), None);
        assert_eq!(press("15", InputKey::Separator, 0), None);
    }

    #[test]
    fn test_fraction_digit_limit() {
        assert_eq!(press("1.2", InputKey::Digit(3), 2).as_deref(), Some("1.23"));
        assert_eq!(press("1.23", InputKey::Digit(4), 2), None);
        assert_eq!(press("0.0", InputKey::Digit(0), 8).as_deref(), Some("0.00"));
    }

    #[test]
    fn test_backspace_and_clear() {
        assert_eq!(press("1.2", InputKey::Backspace, 8).as_deref(), Some("1."));
        assert_eq!(press("7", InputKey::Backspace, 8).as_deref(), Some("0"));
        assert_eq!(press("123.45", InputKey::Clear, 8).as_deref(), Some("0"));
    }

    #[test]
    fn test_invalid_digit() {
        assert_eq!(press("1", InputKey::Digit(10), 8), None);
    }

    #[test]
    fn test_typing_sequence() {
        let keys = [
            InputKey::Digit(1),
            InputKey::Digit(2),
            InputKey::Separator,
            InputKey::Separator,
            InputKey::Digit(3),
            InputKey::Digit(4),
            InputKey::Digit(5),
        ];
        assert_eq!(type_keys(&keys, 2), "12.34");
    }

    #[test]
    fn test_comma_separator() {
        let format = NumberFormat::comma_decimal();
        assert_eq!(
            apply_key("3", InputKey::Separator, 2, &format).as_deref(),
            Some("3,")
        );
        assert_eq!(apply_key("3,5", InputKey::Separator, 2, &format), None);
    }

    #[test]
    fn test_normalize_paste() {
        let format = NumberFormat::default();
        assert_eq!(normalize_paste(" 1,234.50 ", 2, &format).as_deref(), Some("1234.5"));
        assert_eq!(normalize_paste("0.125", 2, &format).as_deref(), Some("0.13"));
        assert_eq!(normalize_paste("12abc", 2, &format), None);
        assert_eq!(normalize_paste("", 2, &format), None);
    }
}
