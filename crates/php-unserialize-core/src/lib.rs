//! Strict decoder for PHP's `serialize()` format.
//!
//! This crate turns the text produced by PHP's `serialize()` into a small
//! dynamic value model: scalars, byte-exact strings, lists and ordered maps.
//!
//! # Features
//!
//! - **Strict framing** - every `:`, `;`, `"`, `{` and `}` is checked
//! - **Byte-exact strings** - declared lengths are authoritative, so payloads
//!   may contain `"`, `;` or non-UTF-8 bytes
//! - **List or map** - arrays keyed `0, 1, 2, ...` in order become
//!   [`PhpValue::List`], everything else [`PhpValue::Map`]
//! - **Offset reporting** - every decode returns the bytes it consumed, and
//!   every error the absolute position where it was detected
//!
//! # Quick Start
//!
//! ```rust
//! use php_unserialize_core::{decode, PhpValue};
//!
//! let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
//! let (value, consumed) = decode(data).unwrap();
//! assert_eq!(consumed, data.len());
//!
//! if let PhpValue::Map(items) = value {
//!     for (key, val) in items {
//!         println!("{} => {}", key, val);
//!     }
//! }
//! ```
//!
//! # Supported Types
//!
//! | PHP Type | Rust Type |
//! |----------|-----------|
//! | `null` | `PhpValue::Null` |
//! | `bool` | `PhpValue::Bool(bool)` |
//! | `int` | `PhpValue::Int(i64)` |
//! | `float` | `PhpValue::Float(f64)` |
//! | `string` | `PhpValue::String(BString)` |
//! | `array` (keys `0..n` in order) | `PhpValue::List(Vec<PhpValue>)` |
//! | `array` (anything else) | `PhpValue::Map(PhpMap)` |
//! | `object` | `PhpValue::Map(PhpMap)` of its properties |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)]

pub mod decoder;
pub mod error;
pub mod types;

#[cfg(feature = "serde")]
pub mod json;

pub use decoder::{
    decode, decode_at, decode_with_config, from_bytes, preprocess, Decoder, DecoderConfig,
};
pub use error::{DecodeError, ErrorKind, Result};
pub use types::{PhpMap, PhpValue};

#[cfg(feature = "serde")]
pub use json::to_json;
