//! Canonical JSON encoding
//!
//! Object keys sorted ascending by byte value, no insignificant whitespace,
//! UTF-8 output. String escaping follows the chain's encoder: `<`, `>`,
//! `&`, U+2028 and U+2029 are written as `\uXXXX`, and backspace / form
//! feed use their `\u` forms instead of the short escapes.

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;
use serde_json::ser::{CharEscape, CompactFormatter, Formatter};
use serde_json::{Map, Value};

use super::TransactionError;

/// Compact formatter with the chain's string escaping rules
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match char_escape {
            CharEscape::Backspace => writer.write_all(b"\\u0008"),
            CharEscape::FormFeed => writer.write_all(b"\\u000c"),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }
}

/// Rebuild every object with its keys in ascending byte order
///
/// The result is independent of how the input maps were populated.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Serialize with [`CanonicalFormatter`]
///
/// Struct fields are emitted in declaration order, so callers declare them
/// sorted; dynamic values should pass through [`sort_keys`] first.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TransactionError> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| TransactionError::Encoding(e.to_string()))?;
    Ok(out)
}

/// Canonical bytes of a dynamic JSON value
pub fn value_to_vec(value: Value) -> Result<Vec<u8>, TransactionError> {
    to_vec(&sort_keys(value))
}
