//! Python bindings for php-unserialize-core.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList, PyTuple};

use php_unserialize_core::{json::to_json_string, Decoder, DecoderConfig, PhpValue};

pyo3::create_exception!(php_unserialize, PhpUnserializeError, pyo3::exceptions::PyException);

/// Convert raw PHP string bytes to a Python object according to `errors`.
fn bytes_to_python(py: Python<'_>, bytes: &[u8], errors: &str) -> PyResult<PyObject> {
    match std::str::from_utf8(bytes) {
        Ok(string) => Ok(string.to_object(py)),
        Err(_) => match errors {
            "strict" => Err(PyValueError::new_err("Invalid UTF-8 in string")),
            "bytes" => Ok(PyBytes::new_bound(py, bytes).to_object(py)),
            // "replace" and any other value: replace invalid bytes with replacement character
            _ => Ok(String::from_utf8_lossy(bytes).to_object(py)),
        },
    }
}

/// Convert a PhpValue to a Python object.
fn php_value_to_python(py: Python<'_>, value: &PhpValue, errors: &str) -> PyResult<PyObject> {
    match value {
        PhpValue::Null => Ok(py.None()),
        PhpValue::Bool(b) => Ok(b.to_object(py)),
        PhpValue::Int(i) => Ok(i.to_object(py)),
        PhpValue::Float(f) => Ok(f.to_object(py)),
        PhpValue::String(s) => bytes_to_python(py, s, errors),
        PhpValue::List(items) => {
            let list = PyList::empty_bound(py);
            for item in items {
                list.append(php_value_to_python(py, item, errors)?)?;
            }
            Ok(list.to_object(py))
        }
        PhpValue::Map(entries) => {
            let dict = PyDict::new_bound(py);
            for (k, v) in entries {
                // Keys always come back as text so dict lookups are uniform.
                let key = String::from_utf8_lossy(k);
                dict.set_item(key.as_ref(), php_value_to_python(py, v, errors)?)?;
            }
            Ok(dict.to_object(py))
        }
    }
}

/// Decode one value from `data[offset:]`, mapping errors to the module exception.
fn decode_from(data: &[u8], offset: usize, max_depth: usize) -> PyResult<(PhpValue, usize)> {
    let decoder = Decoder::with_config(DecoderConfig { max_depth });
    decoder
        .decode_at(data, offset)
        .map_err(|e| PhpUnserializeError::new_err(format!("{}", e)))
}

/// Deserialize PHP serialized data to a Python object.
///
/// Args:
///     data: Bytes containing PHP serialized data
///     offset: Byte offset of the value to decode (default: 0)
///     errors: Error handling mode for invalid UTF-8 in string values:
///         - "strict": Raise an exception
///         - "replace": Replace invalid bytes with replacement character (default)
///         - "bytes": Return bytes instead of string for binary data
///     max_depth: Maximum nesting of arrays and objects (default: 128)
///
/// Returns:
///     The deserialized Python object (dict, list, str, int, float, bool, or None).
///     Arrays keyed 0, 1, 2, ... in order become lists; all other arrays and
///     all objects become dicts with string keys.
///
/// Raises:
///     PhpUnserializeError: If the data cannot be parsed
///
/// Example:
///     >>> from php_unserialize import loads
///     >>> loads(b'a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}')
///     {'name': 'Alice', 'age': 30}
///     >>> loads(b'a:2:{i:0;s:1:"a";i:5;s:1:"b";}')
///     {'0': 'a', '5': 'b'}
#[pyfunction]
#[pyo3(signature = (data, *, offset=0, errors="replace", max_depth=128))]
fn loads(
    py: Python<'_>,
    data: &[u8],
    offset: usize,
    errors: &str,
    max_depth: usize,
) -> PyResult<PyObject> {
    let (value, _) = decode_from(data, offset, max_depth)?;
    php_value_to_python(py, &value, errors)
}

/// Deserialize one value and report how many bytes it occupied.
///
/// Useful for reading several serialized values stored back to back: advance
/// `offset` by the returned length after each call.
///
/// Args:
///     data: Bytes containing PHP serialized data
///     offset: Byte offset of the value to decode (default: 0)
///     errors: Error handling mode for invalid UTF-8, as for `loads`
///     max_depth: Maximum nesting of arrays and objects (default: 128)
///
/// Returns:
///     A `(value, consumed)` tuple
///
/// Example:
///     >>> from php_unserialize import decode
///     >>> decode(b'i:1;b:0;', offset=4)
///     (False, 4)
#[pyfunction]
#[pyo3(signature = (data, *, offset=0, errors="replace", max_depth=128))]
fn decode(
    py: Python<'_>,
    data: &[u8],
    offset: usize,
    errors: &str,
    max_depth: usize,
) -> PyResult<Py<PyTuple>> {
    let (value, consumed) = decode_from(data, offset, max_depth)?;
    let object = php_value_to_python(py, &value, errors)?;
    Ok(PyTuple::new_bound(py, [object, consumed.to_object(py)]).unbind())
}

/// Deserialize PHP serialized data directly to a JSON string.
///
/// It avoids the overhead of creating intermediate Python objects.
///
/// Args:
///     data: Bytes containing PHP serialized data
///     offset: Byte offset of the value to decode (default: 0)
///
/// Returns:
///     A JSON string representation of the deserialized data
///
/// Raises:
///     PhpUnserializeError: If the data cannot be parsed
///
/// Example:
///     >>> from php_unserialize import loads_json
///     >>> loads_json(b'a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}')
///     '{"name":"Alice","age":30}'
#[pyfunction]
#[pyo3(signature = (data, *, offset=0))]
fn loads_json(data: &[u8], offset: usize) -> PyResult<String> {
    let (value, _) = decode_from(data, offset, DecoderConfig::default().max_depth)?;
    to_json_string(&value).map_err(|e| PhpUnserializeError::new_err(format!("{}", e)))
}

/// Check if data looks like PHP serialized format.
///
/// This is a quick check of the leading type marker; it doesn't validate
/// the rest of the data.
///
/// Example:
///     >>> from php_unserialize import is_serialized
///     >>> is_serialized(b'a:1:{i:0;s:3:"foo";}')
///     True
///     >>> is_serialized(b'not serialized')
///     False
#[pyfunction]
fn is_serialized(data: &[u8]) -> bool {
    matches!(
        data.first().copied(),
        Some(b'N' | b'b' | b'i' | b'd' | b's' | b'a' | b'O')
    )
}

/// Unescape DB-exported serialized data.
///
/// Handles values wrapped in quotes with inner quotes doubled, as produced by
/// CSV exports of database columns.
///
/// Example:
///     >>> from php_unserialize import preprocess
///     >>> preprocess(b'"a:1:{s:3:""key"";s:5:""value"";}"')
///     b'a:1:{s:3:"key";s:5:"value";}'
#[pyfunction]
fn preprocess<'py>(py: Python<'py>, data: &[u8]) -> Bound<'py, PyBytes> {
    PyBytes::new_bound(py, &php_unserialize_core::preprocess(data))
}

/// Get the version of the library.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// PHP unserialize module for Python.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("PhpUnserializeError", m.py().get_type_bound::<PhpUnserializeError>())?;
    m.add_function(wrap_pyfunction!(loads, m)?)?;
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add_function(wrap_pyfunction!(loads_json, m)?)?;
    m.add_function(wrap_pyfunction!(is_serialized, m)?)?;
    m.add_function(wrap_pyfunction!(preprocess, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}
