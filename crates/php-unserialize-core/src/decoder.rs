//! Recursive-descent decoder for PHP's `serialize()` text format.
//!
//! Every sub-parser works on a slice that starts at its own tag byte and
//! returns the value together with the number of bytes it consumed, so the
//! caller can resume scanning right after it. Offsets in errors are relative
//! to that slice until they cross back into the parent.
//!
//! # Grammar
//!
//! | tag | encoding |
//! |-----|----------|
//! | `N` | `N;` |
//! | `b` | `b:0;` / `b:1;` |
//! | `i` | `i:-42;` |
//! | `d` | `d:3.14;` |
//! | `s` | `s:<len>:"<len bytes>";` |
//! | `a` | `a:<count>:{<key><value>...}` |
//! | `O` | `O:<len>:"<class>":<count>:{<key><value>...}` |
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for decode instrumentation:
//!
//! ```toml
//! php-unserialize-core = { version = "0.1", features = ["tracing"] }
//! ```

use std::borrow::Cow;

use bstr::BString;
use memchr::memchr_iter;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::error::{DecodeError, ErrorKind, Result};
use crate::types::{PhpMap, PhpValue};

/// Maximum nesting depth to prevent stack overflow.
///
/// Each level costs a few KiB of stack in unoptimized builds, so this must
/// stay well inside a 2 MiB thread stack.
const MAX_DEPTH: usize = 128;

/// Smallest possible array element, `i:0;N;`.
const MIN_ARRAY_ENTRY_LEN: usize = 6;

/// Smallest possible object property, `s:0:"";N;`.
const MIN_PROPERTY_LEN: usize = 9;

/// Decoder configuration options.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum nesting depth for arrays and objects.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A stateless PHP unserialize decoder.
///
/// Holds only configuration, so one instance can be shared between threads
/// and reused for any number of buffers.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

/// Key of a single array element, before the list/map decision is made.
enum ArrayKey {
    Int(i64),
    Str(BString),
}

impl ArrayKey {
    fn into_map_key(self) -> BString {
        match self {
            ArrayKey::Int(i) => BString::from(i.to_string()),
            ArrayKey::Str(s) => s,
        }
    }
}

impl Decoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with custom configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The configuration this decoder was built with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one value from the start of `data`.
    ///
    /// Returns the value and the number of bytes it occupied. Trailing bytes
    /// after the value are left for the caller.
    #[cfg_attr(feature = "tracing", instrument(skip(self, data), fields(data_len = data.len())))]
    pub fn decode(&self, data: &[u8]) -> Result<(PhpValue, usize)> {
        let result = self
            .parse_value(data, 0)
            .map_err(|e| {
                let pos = e.position;
                e.with_input_preview(data, pos)
            });

        #[cfg(feature = "tracing")]
        match &result {
            Ok((value, consumed)) => {
                debug!(value_type = value.type_name(), consumed, "Decode completed");
            }
            Err(e) => warn!(error = %e, "Decode failed"),
        }

        result
    }

    /// Decode one value starting at `offset` in `data`.
    ///
    /// The consumed count is relative to `offset`; error positions are
    /// absolute within `data`.
    pub fn decode_at(&self, data: &[u8], offset: usize) -> Result<(PhpValue, usize)> {
        let Some(rest) = data.get(offset..) else {
            return Err(DecodeError::new(ErrorKind::InvalidInput, offset)
                .with_context(format!("offset past end of {}-byte input", data.len())));
        };
        self.parse_value(rest, 0).map_err(|e| {
            let e = e.shifted(offset);
            let pos = e.position;
            e.with_input_preview(data, pos)
        })
    }

    /// Dispatch on the tag byte.
    fn parse_value(&self, src: &[u8], depth: usize) -> Result<(PhpValue, usize)> {
        let Some(&tag) = src.first() else {
            return Err(DecodeError::new(ErrorKind::InvalidInput, 0)
                .with_context("expected a value, found end of input"));
        };

        #[cfg(feature = "tracing")]
        trace!(tag = %char::from(tag), depth, "Parsing value");

        match tag {
            b'N' => parse_null(src).map(|n| (PhpValue::Null, n)),
            b'b' => parse_bool(src).map(|(b, n)| (PhpValue::Bool(b), n)),
            b'i' => parse_int(src).map(|(i, n)| (PhpValue::Int(i), n)),
            b'd' => parse_float(src).map(|(f, n)| (PhpValue::Float(f), n)),
            b's' => parse_string(src).map(|(s, n)| (PhpValue::String(s), n)),
            b'a' => self.parse_array(src, depth),
            b'O' => self.parse_object(src, depth),
            _ => {
                #[cfg(feature = "tracing")]
                warn!(tag = %char::from(tag), "Unknown type marker");
                Err(DecodeError::new(ErrorKind::UnsupportedType(tag as char), 0))
            }
        }
    }

    /// Parse a nested value at `pos` inside `src`, one level deeper.
    fn parse_nested(&self, src: &[u8], pos: usize, depth: usize) -> Result<(PhpValue, usize)> {
        let rest = src.get(pos..).unwrap_or_default();
        self.parse_value(rest, depth).map_err(|e| e.shifted(pos))
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        if depth >= self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth, max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(DecodeError::new(
                ErrorKind::MaxDepthExceeded(self.config.max_depth),
                0,
            ));
        }
        Ok(depth + 1)
    }

    /// Parse an array: `a:<count>:{<key><value>...}`
    ///
    /// Elements are collected once, in source order, while tracking whether
    /// the keys so far are exactly `0, 1, 2, ...`. The result is a list only
    /// if that held for every key.
    fn parse_array(&self, src: &[u8], depth: usize) -> Result<(PhpValue, usize)> {
        const KIND: ErrorKind = ErrorKind::MalformedArray;
        expect_start(src, b'a', 6)?;
        let depth = self.enter(depth)?;

        let (count, mut i) = read_count(src, 2, KIND)?;
        expect_at(src, i, b':', KIND, "expected ':' after array length")?;
        i += 1;
        expect_at(src, i, b'{', KIND, "expected '{' to open array")?;
        i += 1;

        let capacity = count.min(src.len().saturating_sub(i) / MIN_ARRAY_ENTRY_LEN);
        let mut entries: Vec<(ArrayKey, PhpValue)> = Vec::with_capacity(capacity);
        let mut is_list = true;
        let mut last_index: i64 = -1;

        for _ in 0..count {
            let key = match src.get(i).copied() {
                Some(b'i') => {
                    let (key, len) = parse_int(&src[i..]).map_err(|e| e.shifted(i))?;
                    i += len;
                    if is_list && last_index.checked_add(1) == Some(key) {
                        last_index = key;
                    } else {
                        is_list = false;
                    }
                    ArrayKey::Int(key)
                }
                Some(b's') => {
                    let (key, len) = parse_string(&src[i..]).map_err(|e| e.shifted(i))?;
                    i += len;
                    is_list = false;
                    ArrayKey::Str(key)
                }
                Some(other) => {
                    return Err(DecodeError::new(
                        ErrorKind::UnsupportedKeyType(other as char),
                        i,
                    ));
                }
                None => {
                    return Err(DecodeError::new(KIND, i)
                        .with_context(format!("input ended before {} array elements", count)));
                }
            };

            let (value, len) = self.parse_nested(src, i, depth)?;
            i += len;
            entries.push((key, value));
        }

        expect_at(src, i, b'}', KIND, "expected '}' to close array")?;

        let value = if is_list {
            PhpValue::List(entries.into_iter().map(|(_, v)| v).collect())
        } else {
            let mut map = PhpMap::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.into_map_key(), value);
            }
            PhpValue::Map(map)
        };

        Ok((value, i + 1))
    }

    /// Parse an object: `O:<len>:"<class>":<count>:{<key><value>...}`
    ///
    /// The class name is checked and skipped; the result is a map of
    /// property names to values.
    fn parse_object(&self, src: &[u8], depth: usize) -> Result<(PhpValue, usize)> {
        const KIND: ErrorKind = ErrorKind::MalformedObject;
        expect_start(src, b'O', 12)?;
        let depth = self.enter(depth)?;

        let (name_len, mut i) = read_count(src, 2, KIND)?;
        expect_at(src, i, b':', KIND, "expected ':' after class name length")?;
        i += 1;
        expect_at(src, i, b'"', KIND, "expected '\"' before class name")?;

        // `":0:{}` must still fit after the name.
        let name_end = i.checked_add(name_len).filter(|end| end.saturating_add(6) < src.len());
        let Some(name_end) = name_end else {
            return Err(DecodeError::new(KIND, i)
                .with_context(format!("class name length {} exceeds input", name_len)));
        };
        i = name_end + 1;

        expect_at(src, i, b'"', KIND, "expected '\"' after class name")?;
        i += 1;
        expect_at(src, i, b':', KIND, "expected ':' after class name")?;
        i += 1;

        let (count, next) = read_count(src, i, KIND)?;
        i = next;
        expect_at(src, i, b':', KIND, "expected ':' after property count")?;
        i += 1;
        expect_at(src, i, b'{', KIND, "expected '{' to open properties")?;
        i += 1;

        let capacity = count.min(src.len().saturating_sub(i) / MIN_PROPERTY_LEN);
        let mut properties = PhpMap::with_capacity(capacity);

        for _ in 0..count {
            let name = match src.get(i).copied() {
                Some(b's') => {
                    let (name, len) = parse_string(&src[i..]).map_err(|e| e.shifted(i))?;
                    i += len;
                    name
                }
                Some(other) => {
                    return Err(DecodeError::new(
                        ErrorKind::UnsupportedKeyType(other as char),
                        i,
                    ));
                }
                None => {
                    return Err(DecodeError::new(KIND, i)
                        .with_context(format!("input ended before {} properties", count)));
                }
            };

            let (value, len) = self.parse_nested(src, i, depth)?;
            i += len;
            properties.insert(name, value);
        }

        expect_at(src, i, b'}', KIND, "expected '}' to close properties")?;

        Ok((PhpValue::Map(properties), i + 1))
    }
}

/// Parse a null value: `N;`
fn parse_null(src: &[u8]) -> Result<usize> {
    if src.len() < 2 || src[0] != b'N' || src[1] != b';' {
        return Err(DecodeError::new(ErrorKind::InvalidNull, 0).with_context("expected 'N;'"));
    }
    Ok(2)
}

/// Parse a boolean value: `b:0;` or `b:1;`
fn parse_bool(src: &[u8]) -> Result<(bool, usize)> {
    expect_start(src, b'b', 4)?;
    let value = match src[2] {
        b'1' => true,
        b'0' => false,
        other => {
            return Err(DecodeError::new(ErrorKind::MalformedBoolean, 2)
                .with_context(format!("expected '0' or '1', found '{}'", other as char)));
        }
    };
    expect_end(src, b'b', 3)?;
    Ok((value, 4))
}

/// Parse an integer value: `i:<value>;`
///
/// Values outside the `i64` range saturate to `i64::MIN` / `i64::MAX`.
fn parse_int(src: &[u8]) -> Result<(i64, usize)> {
    expect_start(src, b'i', 4)?;
    let end = scan(src, 2, |b| b.is_ascii_digit() || b == b'-');
    expect_end(src, b'i', end)?;

    let digits = &src[2..end];
    if !is_integer_literal(digits) {
        return Err(DecodeError::new(ErrorKind::InvalidInt, 2)
            .with_context(format!("invalid int value: {}", String::from_utf8_lossy(digits))));
    }

    // Validated ASCII, so the only possible parse failure is overflow.
    let text = std::str::from_utf8(digits).unwrap_or_default();
    let value = text.parse::<i64>().unwrap_or(if digits[0] == b'-' {
        i64::MIN
    } else {
        i64::MAX
    });
    Ok((value, end + 1))
}

/// Parse a float/double value: `d:<value>;`
fn parse_float(src: &[u8]) -> Result<(f64, usize)> {
    expect_start(src, b'd', 4)?;
    let end = scan(src, 2, |b| b.is_ascii_digit() || b == b'-' || b == b'.');
    expect_end(src, b'd', end)?;

    let digits = &src[2..end];
    let invalid = || {
        DecodeError::new(ErrorKind::InvalidFloat, 2)
            .with_context(format!("invalid float value: {}", String::from_utf8_lossy(digits)))
    };
    if !is_float_literal(digits) {
        return Err(invalid());
    }

    let value = std::str::from_utf8(digits)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(invalid)?;
    Ok((value, end + 1))
}

/// Parse a string value: `s:<len>:"<data>";`
///
/// The declared length is authoritative: the payload is exactly that many
/// bytes, whatever they contain.
fn parse_string(src: &[u8]) -> Result<(BString, usize)> {
    const KIND: ErrorKind = ErrorKind::MalformedString;
    expect_start(src, b's', 7)?;

    let (len, mut i) = read_count(src, 2, ErrorKind::InvalidStringLength)?;
    expect_at(src, i, b':', KIND, "expected ':' after string length")?;
    i += 1;
    expect_at(src, i, b'"', KIND, "expected '\"' before string data")?;

    // Payload, closing quote and semicolon must all fit.
    let fits = i
        .checked_add(len)
        .map_or(false, |payload_end| payload_end.saturating_add(2) < src.len());
    if !fits {
        return Err(DecodeError::new(ErrorKind::InvalidStringLength, i + 1).with_context(format!(
            "declared {} bytes, {} remaining",
            len,
            src.len() - i - 1
        )));
    }
    i += 1;

    let value = BString::from(&src[i..i + len]);
    i += len;

    expect_at(src, i, b'"', KIND, "expected '\"' after string data")?;
    i += 1;
    expect_end(src, b's', i)?;

    Ok((value, i + 1))
}

/// Check minimum length and the leading `<tag>:` before any offset math.
#[inline]
fn expect_start(src: &[u8], tag: u8, min_len: usize) -> Result<()> {
    let kind = ErrorKind::for_tag(tag);
    if src.len() < min_len {
        return Err(DecodeError::new(kind, src.len()).with_context(format!(
            "need at least {} bytes for '{}', found {}",
            min_len,
            tag as char,
            src.len()
        )));
    }
    if src[0] != tag {
        return Err(DecodeError::new(kind, 0)
            .with_context(format!("expected '{}', found '{}'", tag as char, src[0] as char)));
    }
    if src[1] != b':' {
        return Err(DecodeError::new(kind, 1)
            .with_context(format!("expected ':' after '{}'", tag as char)));
    }
    Ok(())
}

/// Check for the trailing `;` at `index`.
#[inline]
fn expect_end(src: &[u8], tag: u8, index: usize) -> Result<()> {
    if src.get(index) != Some(&b';') {
        return Err(DecodeError::new(ErrorKind::for_tag(tag), index)
            .with_context(format!("not terminated by ';' when parsing '{}'", tag as char)));
    }
    Ok(())
}

/// Check for a framing byte at `index`.
#[inline]
fn expect_at(src: &[u8], index: usize, expected: u8, kind: ErrorKind, context: &str) -> Result<()> {
    if src.get(index) != Some(&expected) {
        return Err(DecodeError::new(kind, index).with_context(context));
    }
    Ok(())
}

/// Index of the first byte at or after `start` that fails `accept`, or the
/// input length.
#[inline]
fn scan(src: &[u8], start: usize, accept: impl Fn(u8) -> bool) -> usize {
    src[start..]
        .iter()
        .position(|&b| !accept(b))
        .map_or(src.len(), |offset| start + offset)
}

/// Read a run of decimal digits at `start` as a length or count.
///
/// Returns the value and the index just past the digits.
fn read_count(src: &[u8], start: usize, kind: ErrorKind) -> Result<(usize, usize)> {
    let end = scan(src, start, |b| b.is_ascii_digit());
    if end == start {
        return Err(DecodeError::new(kind, start).with_context("expected a decimal length"));
    }
    let value = src[start..end]
        .iter()
        .try_fold(0usize, |acc, &d| acc.checked_mul(10)?.checked_add(usize::from(d - b'0')));
    match value {
        Some(value) => Ok((value, end)),
        None => Err(DecodeError::new(kind, start).with_context("length does not fit in usize")),
    }
}

/// Optional `-`, then one or more digits.
fn is_integer_literal(text: &[u8]) -> bool {
    let digits = text.strip_prefix(b"-").unwrap_or(text);
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// Optional `-`, one or more digits, then optionally `.` and zero or more digits.
fn is_float_literal(text: &[u8]) -> bool {
    let unsigned = text.strip_prefix(b"-").unwrap_or(text);
    let (int_part, frac_part) = match unsigned.iter().position(|&b| b == b'.') {
        Some(dot) => (&unsigned[..dot], &unsigned[dot + 1..]),
        None => (unsigned, &[][..]),
    };
    !int_part.is_empty()
        && int_part.iter().all(u8::is_ascii_digit)
        && frac_part.iter().all(u8::is_ascii_digit)
}

/// Undo database CSV-style quoting of a serialized value.
///
/// Detects input wrapped in `"` whose inner quotes are doubled, e.g.
/// `"a:1:{s:3:""key"";i:1;}"`, and returns the unwrapped, unescaped bytes.
/// Anything else is returned borrowed and unchanged.
pub fn preprocess(data: &[u8]) -> Cow<'_, [u8]> {
    if data.len() >= 2 && data[0] == b'"' && data[data.len() - 1] == b'"' {
        let inner = &data[1..data.len() - 1];
        if matches!(
            inner.first().copied(),
            Some(b'N' | b'b' | b'i' | b'd' | b's' | b'a' | b'O')
        ) {
            return Cow::Owned(unescape_double_quotes(inner));
        }
    }

    Cow::Borrowed(data)
}

/// Unescape double quotes (`""` -> `"`).
fn unescape_double_quotes(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut copied = 0;
    let mut quotes = memchr_iter(b'"', data).peekable();

    while let Some(pos) = quotes.next() {
        if quotes.peek() == Some(&(pos + 1)) {
            result.extend_from_slice(&data[copied..=pos]);
            copied = pos + 2;
            quotes.next();
        }
    }
    result.extend_from_slice(&data[copied..]);

    result
}

/// Decode one value from the start of `data`, returning it with the number
/// of bytes consumed.
///
/// # Example
///
/// ```rust
/// use php_unserialize_core::decode;
///
/// let (value, consumed) = decode(b"i:123;").unwrap();
/// assert_eq!(value.as_int(), Some(123));
/// assert_eq!(consumed, 6);
/// ```
#[inline]
pub fn decode(data: &[u8]) -> Result<(PhpValue, usize)> {
    Decoder::new().decode(data)
}

/// Decode one value starting at `offset` in `data`.
///
/// Callers reading back-to-back values advance their offset by the returned
/// consumed count.
///
/// # Example
///
/// ```rust
/// use php_unserialize_core::decode_at;
///
/// let data = b"i:1;b:0;N;";
/// let mut offset = 0;
/// let mut values = Vec::new();
/// while offset < data.len() {
///     let (value, consumed) = decode_at(data, offset).unwrap();
///     values.push(value);
///     offset += consumed;
/// }
/// assert_eq!(values.len(), 3);
/// ```
#[inline]
pub fn decode_at(data: &[u8], offset: usize) -> Result<(PhpValue, usize)> {
    Decoder::new().decode_at(data, offset)
}

/// Decode one value with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_unserialize_core::{decode_with_config, DecoderConfig};
///
/// let config = DecoderConfig { max_depth: 64 };
/// let (value, _) = decode_with_config(b"a:0:{}", &config).unwrap();
/// assert!(value.is_list());
/// ```
#[inline]
pub fn decode_with_config(data: &[u8], config: &DecoderConfig) -> Result<(PhpValue, usize)> {
    Decoder::with_config(config.clone()).decode(data)
}

/// Decode one value and drop the consumed count.
///
/// # Example
///
/// ```rust
/// use php_unserialize_core::from_bytes;
///
/// let value = from_bytes(br#"a:1:{s:3:"key";s:5:"value";}"#).unwrap();
/// assert_eq!(value.get("key").and_then(|v| v.as_str()), Some("value"));
/// ```
#[inline]
pub fn from_bytes(data: &[u8]) -> Result<PhpValue> {
    decode(data).map(|(value, _)| value)
}
