//! Error types for PHP unserialization.
//!
//! Every failure carries an [`ErrorKind`] and the byte offset where it was
//! detected. Sub-parsers report offsets relative to their own slice; the
//! caller shifts them at each recursive boundary so the top-level error
//! always points into the buffer the user passed in.

use std::fmt;
use thiserror::Error;

/// The main error type for PHP unserialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// The byte position where the error occurred.
    pub position: usize,
    /// Optional detail about which delimiter or value was wrong.
    pub context: Option<String>,
    /// Preview of input around error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)?;
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// Specific kinds of decode errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Leading tag byte is not one of `b`, `i`, `d`, `s`, `a`, `N`, `O`.
    #[error("unsupported type marker '{0}'")]
    UnsupportedType(char),

    /// Empty input where a value was expected.
    #[error("invalid input")]
    InvalidInput,

    /// Boolean framing or payload is wrong.
    #[error("malformed boolean")]
    MalformedBoolean,

    /// Integer framing is wrong or its digits fail validation.
    #[error("invalid int")]
    InvalidInt,

    /// Float framing is wrong or its digits fail validation.
    #[error("invalid float")]
    InvalidFloat,

    /// A string delimiter is missing.
    #[error("malformed string")]
    MalformedString,

    /// Declared string length does not fit in the remaining input.
    #[error("invalid string length")]
    InvalidStringLength,

    /// An array delimiter or count is missing.
    #[error("malformed array")]
    MalformedArray,

    /// Anything other than exactly `N;`.
    #[error("invalid null")]
    InvalidNull,

    /// An object delimiter, class name or count is wrong.
    #[error("malformed object")]
    MalformedObject,

    /// Array key tag other than `i`/`s`, or object key tag other than `s`.
    #[error("unsupported key type '{0}'")]
    UnsupportedKeyType(char),

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),
}

impl ErrorKind {
    /// The framing error kind reported for a given type tag.
    pub(crate) fn for_tag(tag: u8) -> Self {
        match tag {
            b'b' => ErrorKind::MalformedBoolean,
            b'i' => ErrorKind::InvalidInt,
            b'd' => ErrorKind::InvalidFloat,
            b's' => ErrorKind::MalformedString,
            b'a' => ErrorKind::MalformedArray,
            b'N' => ErrorKind::InvalidNull,
            b'O' => ErrorKind::MalformedObject,
            other => ErrorKind::UnsupportedType(other as char),
        }
    }
}

impl DecodeError {
    /// Create a new error with the given kind and position.
    #[inline]
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            context: None,
            input_preview: None,
        }
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Move the error position forward by `offset` bytes.
    ///
    /// Called when an error from a nested slice crosses back into the
    /// parent's coordinate space.
    #[inline]
    pub fn shifted(mut self, offset: usize) -> Self {
        self.position = self.position.saturating_add(offset);
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// Shows up to 20 bytes before and after the error position.
    #[cold]
    pub fn with_input_preview(mut self, data: &[u8], error_pos: usize) -> Self {
        let start = error_pos.saturating_sub(20);
        let end = error_pos.saturating_add(20).min(data.len());

        if start < end {
            let preview = String::from_utf8_lossy(&data[start..end]);

            let relative_pos = error_pos - start;
            let mut result = String::with_capacity(preview.len() + relative_pos + 2);
            result.push_str(&preview);
            result.push('\n');
            result.push_str(&" ".repeat(relative_pos));
            result.push('^');

            self.input_preview = Some(result);
        }
        self
    }
}

/// Result type alias for PHP unserialization.
pub type Result<T> = std::result::Result<T, DecodeError>;
