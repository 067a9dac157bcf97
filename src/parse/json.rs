//! Lenient JSON reading for registration headers.
//!
//! Registration payloads are read with the permissive grammar ad-tech servers
//! have historically relied on:
//!
//! - bare tokens are literals: `true`, `false` and `null` in any letter case,
//!   numbers, and otherwise plain strings (`"debug_reporting":invalid` reads as
//!   the string `"invalid"`)
//! - object keys may be unquoted
//! - strings may be single-quoted
//!
//! A missing value (`{"a":}`), unbalanced brackets, or trailing content after
//! the top-level object are syntax errors. The result is an ordinary
//! `serde_json::Value`, so everything downstream works on one typed
//! representation.
//!
//! The `field`/`get_*`/`coerce_*` helpers below implement the "extract or
//! absent" contracts the parsers use field by field.

use serde_json::{Map, Number, Value};

use crate::error_handling::JsonError;
use crate::numeric::{parse_long_signed, UnsignedLong};

/// Parses `text` as a JSON object.
///
/// # Errors
///
/// `JsonError::Syntax` for malformed text, and `JsonError::WrongType` when
/// the top-level value is not an object.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, JsonError> {
    let mut reader = Reader::new(text);
    let value = reader.next_value()?;
    reader.skip_whitespace();
    if let Some(offset) = reader.peek_offset() {
        return Err(JsonError::Syntax {
            offset,
            message: "unexpected trailing content".to_string(),
        });
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(JsonError::wrong_type("<root>", "an object")),
    }
}

/// Deepest array/object nesting accepted, matching `serde_json`.
const MAX_NESTING_DEPTH: usize = 128;

struct Reader<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Reader {
            text,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_offset(&self) -> Option<usize> {
        self.peek().map(|_| self.pos)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> JsonError {
        JsonError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn next_value(&mut self) -> Result<Value, JsonError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("end of input")),
            Some(open @ ('{' | '[')) => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.bump();
                self.depth += 1;
                let value = if open == '{' {
                    self.read_object()
                } else {
                    self.read_array()
                };
                self.depth -= 1;
                value
            }
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                Ok(Value::String(self.read_string(quote)?))
            }
            Some(_) => self.read_literal(),
        }
    }

    fn read_object(&mut self) -> Result<Value, JsonError> {
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Value::Object(map));
        }
        loop {
            let key = match self.next_value()? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.skip_whitespace();
            match self.bump() {
                Some(':') => {}
                Some('=') => {
                    if self.peek() == Some('>') {
                        self.bump();
                    }
                }
                _ => return Err(self.error(format!("expected ':' after key `{key}`"))),
            }
            let value = self.next_value()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some('}') => return Ok(Value::Object(map)),
                Some(',') | Some(';') => continue,
                _ => return Err(self.error("unterminated object")),
            }
        }
    }

    fn read_array(&mut self) -> Result<Value, JsonError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.next_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(']') => return Ok(Value::Array(items)),
                Some(',') | Some(';') => continue,
                _ => return Err(self.error("unterminated array")),
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, JsonError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.read_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char, JsonError> {
        match self.bump() {
            Some('u') => {
                let unit = self.read_hex4()?;
                if !(0xD800..0xDC00).contains(&unit) {
                    return Ok(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                // High surrogate: a low surrogate escape must follow
                if !self.text[self.pos..].starts_with("\\u") {
                    return Ok(char::REPLACEMENT_CHARACTER);
                }
                self.pos += 2;
                let low = self.read_hex4()?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(self.error("invalid surrogate pair"));
                }
                let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                char::from_u32(combined).ok_or_else(|| self.error("invalid surrogate pair"))
            }
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some(c) => Ok(c),
            None => Err(self.error("unterminated escape sequence")),
        }
    }

    fn read_hex4(&mut self) -> Result<u32, JsonError> {
        let end = self.pos + 4;
        let digits = self
            .text
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos = end;
        Ok(value)
    }

    fn read_literal(&mut self) -> Result<Value, JsonError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || ",:]}/\\\"[{;=#'".contains(c) {
                break;
            }
            self.bump();
        }
        let literal = &self.text[start..self.pos];
        if literal.is_empty() {
            return Err(self.error("expected a value"));
        }
        Ok(literal_value(literal))
    }
}

fn literal_value(literal: &str) -> Value {
    if literal.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if literal.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if literal.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    let looks_numeric = literal
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '.');
    if looks_numeric {
        if !literal.contains(|c| matches!(c, '.' | 'e' | 'E')) {
            if let Ok(n) = literal.parse::<i64>() {
                return Value::Number(n.into());
            }
            if let Ok(n) = literal.parse::<u64>() {
                return Value::Number(n.into());
            }
        }
        if let Some(n) = literal.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(literal.to_string())
}

/// The value under `key`, treating an explicit `null` as absent.
pub fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// String view of any scalar: strings as-is, numbers and booleans in their
/// JSON text, containers serialized.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The object under `key`, or `None` if absent.
///
/// # Errors
///
/// `JsonError::WrongType` when the value is present but not an object.
pub fn get_object<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, JsonError> {
    match field(object, key) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(JsonError::wrong_type(key, "an object")),
    }
}

/// The array under `key`, or `None` if absent.
///
/// # Errors
///
/// `JsonError::WrongType` when the value is present but not an array.
pub fn get_array<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Vec<Value>>, JsonError> {
    match field(object, key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(JsonError::wrong_type(key, "an array")),
    }
}

/// Strict unsigned extraction: the value must be a JSON string of digits.
pub fn extract_unsigned_long(value: &Value) -> Option<UnsignedLong> {
    match value {
        Value::String(s) => UnsignedLong::parse(s),
        _ => None,
    }
}

/// Strict signed extraction: the value must be a JSON string holding an
/// `i64`.
pub fn extract_long(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_long_signed(s),
        _ => None,
    }
}

/// Lenient unsigned extraction: any scalar whose string form is a valid
/// unsigned long.
pub fn coerce_unsigned_long(value: &Value) -> Option<UnsignedLong> {
    UnsignedLong::parse(&coerce_to_string(value))
}

/// Lenient signed extraction: a JSON integer, or a string holding one.
pub fn coerce_long(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_long_signed(s),
        _ => None,
    }
}

/// `true` for JSON `true` or a string equal to `"true"` ignoring case.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
