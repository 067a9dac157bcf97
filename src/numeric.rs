//! 64-bit integer parsing for registration payload fields.
//!
//! Event ids, debug keys, trigger data and deduplication keys are unsigned
//! 64-bit values on the wire, always encoded as decimal strings. Priorities and
//! other signed fields use the full `i64` range.
//!
//! Parsing never panics or errors: an unparseable value is `None`, and the
//! caller decides whether that means "drop the field" (legacy parsing) or
//! "reject the registration" (aligned-v1 parsing).

use std::fmt;

use serde_json::Value;

/// An unsigned 64-bit value as carried in registration payloads.
///
/// Values above `i64::MAX` are legal. Storage layers that only have signed
/// 64-bit columns use [`UnsignedLong::as_signed`], which wraps around
/// (`2^64 - 1` becomes `-1`); comparisons must always go through this type so
/// they stay unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnsignedLong(u64);

impl UnsignedLong {
    /// Zero, the default for absent or coerced fields.
    pub const ZERO: UnsignedLong = UnsignedLong(0);

    /// Wraps a raw unsigned value.
    pub const fn new(value: u64) -> Self {
        UnsignedLong(value)
    }

    /// Rebuilds a value from its signed storage form.
    pub const fn from_signed(bits: i64) -> Self {
        UnsignedLong(bits as u64)
    }

    /// Parses a decimal string of ASCII digits.
    ///
    /// Returns `None` for empty input, any sign character, non-digit content,
    /// or values above `2^64 - 1`. Leading zeros are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        value.parse::<u64>().ok().map(UnsignedLong)
    }

    /// The unsigned value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Two's-complement signed view of the same 64 bits.
    pub const fn as_signed(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for UnsignedLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnsignedLong {
    fn from(value: u64) -> Self {
        UnsignedLong(value)
    }
}

/// Parses a signed decimal string in the `i64` range.
///
/// A single leading `-` is allowed; `+`, whitespace and any other character
/// make the value invalid.
pub fn parse_long_signed(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}

/// Whether a JSON value is an integer that fits a signed 64-bit slot.
///
/// Floats, strings, booleans, null, arrays and objects are all `false`, even
/// when their text looks like a whole number.
pub fn is_64_bit_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_parse_unsigned_max_value() {
        let max = UnsignedLong::parse("18446744073709551615").expect("max u64 should parse");
        assert_eq!(max.value(), u64::MAX);
        assert_eq!(max.as_signed(), -1);
    }

    #[test]
    fn test_parse_unsigned_overflow_rejected() {
        assert_eq!(UnsignedLong::parse("18446744073709551616"), None);
    }

    #[test]
    fn test_parse_unsigned_rejects_signs() {
        assert_eq!(UnsignedLong::parse("-1"), None);
        assert_eq!(UnsignedLong::parse("+1"), None);
        assert_eq!(UnsignedLong::parse("-0"), None);
    }

    #[test]
    fn test_parse_unsigned_rejects_non_digits() {
        assert_eq!(UnsignedLong::parse(""), None);
        assert_eq!(UnsignedLong::parse("12a"), None);
        assert_eq!(UnsignedLong::parse("1.5"), None);
        assert_eq!(UnsignedLong::parse(" 1"), None);
    }

    #[test]
    fn test_parse_unsigned_leading_zeros() {
        assert_eq!(UnsignedLong::parse("007"), Some(UnsignedLong::new(7)));
    }

    #[test]
    fn test_unsigned_ordering_is_unsigned() {
        let big = UnsignedLong::parse("9223372036854775808").unwrap();
        let small = UnsignedLong::new(1);
        assert!(big > small);
        assert!(big.as_signed() < small.as_signed());
        assert_eq!(UnsignedLong::from_signed(big.as_signed()), big);
    }

    #[test]
    fn test_parse_long_signed_bounds() {
        assert_eq!(parse_long_signed("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_long_signed("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_long_signed("9223372036854775808"), None);
        assert_eq!(parse_long_signed("-"), None);
        assert_eq!(parse_long_signed("+5"), None);
        assert_eq!(parse_long_signed("-42"), Some(-42));
    }

    #[test]
    fn test_is_64_bit_integer() {
        assert!(is_64_bit_integer(&json!(12)));
        assert!(is_64_bit_integer(&json!(-12)));
        assert!(is_64_bit_integer(&json!(i64::MAX)));
        assert!(!is_64_bit_integer(&json!(u64::MAX)));
        assert!(!is_64_bit_integer(&json!(1.5)));
        assert!(!is_64_bit_integer(&json!("12")));
        assert!(!is_64_bit_integer(&json!({"a": 1})));
        assert!(!is_64_bit_integer(&Value::Null));
    }

    proptest! {
        #[test]
        fn test_unsigned_round_trip(value in any::<u64>()) {
            let text = value.to_string();
            let parsed = UnsignedLong::parse(&text);
            prop_assert_eq!(parsed.map(|v| v.to_string()), Some(text));
        }

        #[test]
        fn test_unsigned_round_trip_ignores_leading_zeros(value in any::<u64>(), zeros in 0usize..4) {
            let text = format!("{}{}", "0".repeat(zeros), value);
            let parsed = UnsignedLong::parse(&text);
            prop_assert_eq!(parsed, Some(UnsignedLong::new(value)));
        }
    }
}
