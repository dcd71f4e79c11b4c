//! JSON value types.
//!
//! This module defines the [`Value`] enum, which represents any valid JSON
//! value, the insertion-ordered [`Map`] used for objects, and helpers for
//! escaping JSON strings.

use std::sync::Arc;

/// An ordered sequence of JSON values.
pub type Array = Vec<Value>;

/// A JSON value as defined by [RFC 8259].
///
/// String content and object keys are held as `Arc<str>` so that trees
/// produced through a [`StringPool`](crate::StringPool) share one allocation
/// per distinct string; equal keys from independent parses compare equal by
/// pointer (`Arc::ptr_eq`), not just by content.
///
/// # Examples
///
/// ```
/// use jsonmill::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".into(), Value::String("value".into()));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The `null` literal.
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// Any JSON number; always double precision.
    Number(f64),
    /// A string, shared with the pool that interned it.
    String(Arc<str>),
    /// An ordered sequence of values.
    Array(Array),
    /// An insertion-ordered set of key/value pairs.
    Object(Map),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Boolean`].
    ///
    /// [`Boolean`]: Value::Boolean
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Boolean(..))
    }

    /// Returns `true` if the value is [`Number`].
    ///
    /// [`Number`]: Value::Number
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(..))
    }

    /// Returns `true` if the value is [`String`].
    ///
    /// [`String`]: Value::String
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is [`Array`].
    ///
    /// [`Array`]: Value::Array
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is [`Object`].
    ///
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }
}

/// An insertion-ordered JSON object.
///
/// Keys are unique; inserting an existing key replaces its value in place, so
/// the key keeps the position of its first insertion while the last value
/// wins. Iteration yields entries in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    entries: Vec<(Arc<str>, Value)>,
}

impl Map {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Creates an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts a key/value pair, replacing the value of an existing key in
    /// place. Returns the previous value if the key was present.
    pub fn insert(&mut self, key: Arc<str>, value: Value) -> Option<Value> {
        for (k, v) in &mut self.entries {
            if **k == *key {
                return Some(std::mem::replace(v, value));
            }
        }
        self.entries.push((key, value));
        None
    }

    /// Looks a value up by key content.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| **k == *key).map(|(_, v)| v)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Arc<str>> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl<'m> IntoIterator for &'m Map {
    type Item = (&'m Arc<str>, &'m Value);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'m, (Arc<str>, Value)>,
        fn(&'m (Arc<str>, Value)) -> (&'m Arc<str>, &'m Value),
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn pair<'m>(entry: &'m (Arc<str>, Value)) -> (&'m Arc<str>, &'m Value) {
            (&entry.0, &entry.1)
        }
        self.entries.iter().map(pair as fn(&'m (Arc<str>, Value)) -> (&'m Arc<str>, &'m Value))
    }
}

impl FromIterator<(Arc<str>, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Arc<str>, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Escapes control characters in a string for inclusion in a JSON string
/// literal.
///
/// Writes to the provided formatter, replacing quotes, backslashes, control
/// characters (<= U+001F), and Unicode line separators with their JSON escape
/// sequences.
pub(crate) fn write_escaped_string<W: std::fmt::Write>(src: &str, f: &mut W) -> std::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            // Escape Unicode line separators which pre-2019 JSON parsers may
            // not handle correctly
            '\u{2028}' | '\u{2029}' => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            c if c.is_ascii_control() || c.is_control() && c as u32 <= 0xFFFF => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            // The parser rejects literals that overflow to non-finite values,
            // but a hand-built tree can still hold NaN or an infinity; JSON
            // has no spelling for those, so render them as `null` the way
            // `JSON.stringify` does.
            Value::Number(n) if n.is_finite() => write!(f, "{n}"),
            Value::Number(_) => f.write_str("null"),
            Value::String(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")
            }
            Value::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in map {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    f.write_str("\"")?;
                    write_escaped_string(k, f)?;
                    f.write_str("\":")?;
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut ser = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    ser.serialize_entry(&**k, v)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_preserves_insertion_order() {
        let mut map = Map::new();
        map.insert("b".into(), Value::Number(1.0));
        map.insert("a".into(), Value::Number(2.0));
        let keys: Vec<&str> = map.keys().map(|k| &**k).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn map_duplicate_key_keeps_position_last_value_wins() {
        let mut map = Map::new();
        map.insert("a".into(), Value::Number(1.0));
        map.insert("b".into(), Value::Number(2.0));
        let old = map.insert("a".into(), Value::Number(3.0));
        assert_eq!(old, Some(Value::Number(1.0)));
        let entries: Vec<(&str, &Value)> = map.iter().map(|(k, v)| (&**k, v)).collect();
        assert_eq!(
            entries,
            [("a", &Value::Number(3.0)), ("b", &Value::Number(2.0))]
        );
    }

    #[test]
    fn display_escapes_strings() {
        let v = Value::String("a\"b\\c\n".into());
        assert_eq!(v.to_string(), "\"a\\\"b\\\\c\\u000A\"");
    }

    #[test]
    fn display_integral_numbers_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn display_non_finite_numbers_as_null() {
        assert_eq!(Value::Number(f64::NAN).to_string(), "null");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "null");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "null");
        let v = Value::Array(vec![Value::Number(f64::INFINITY)]);
        assert_eq!(v.to_string(), "[null]");
    }
}
