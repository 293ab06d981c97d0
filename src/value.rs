use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Numeric cell payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Integral value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
}

/// A single cell value as returned by the driver.
///
/// `Null` and an empty `Text` are distinct states and must stay distinct
/// all the way to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Character data, in whatever charset the connection produced.
    Text(Vec<u8>),
    /// Integer or floating point data.
    Numeric(Numeric),
    /// Opaque binary data; never charset-converted.
    Binary(Vec<u8>),
    /// Collection values (array columns); text elements are normalized too.
    Array(Vec<Value>),
}

impl Value {
    /// Build a text value.
    pub fn text(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(bytes.into())
    }

    /// True for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as a non-negative count (numeric or numeric text).
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Numeric(Numeric::Integer(n)) => u64::try_from(*n).ok(),
            Value::Numeric(Numeric::Real(f)) if *f >= 0.0 => Some(*f as u64),
            Value::Text(bytes) => std::str::from_utf8(bytes).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Apply `f` to every text leaf, descending into arrays.
    pub fn for_each_text_mut(&mut self, f: &mut impl FnMut(&mut Vec<u8>)) {
        match self {
            Value::Text(bytes) => f(bytes),
            Value::Array(items) => {
                for item in items {
                    item.for_each_text_mut(f);
                }
            }
            Value::Null | Value::Numeric(_) | Value::Binary(_) => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Text(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Value::Numeric(Numeric::Integer(n)) => write!(f, "{n}"),
            Value::Numeric(Numeric::Real(x)) => write!(f, "{x}"),
            Value::Binary(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Value::Numeric(Numeric::Integer(n)) => serializer.serialize_i64(*n),
            Value::Numeric(Numeric::Real(x)) => serializer.serialize_f64(*x),
            Value::Binary(_) => serializer.serialize_str(&self.to_string()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// One result row: an ordered column -> value mapping.
///
/// Insertion order is column order. Setting an existing column replaces
/// the value in place, so the row behaves like a map while keeping the
/// position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Builder-style [`Row::set`].
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.set(column, value);
        self
    }

    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value at position `idx`.
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.entries.get(idx).map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn columns(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Mutable access to the values in column order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.iter_mut().map(|(_, value)| value)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
