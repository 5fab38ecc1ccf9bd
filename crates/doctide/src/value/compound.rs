//! Compound value types: structs, ranges and type definitions

use indexmap::IndexMap;

use super::Value;

/// A struct instance with named fields.
///
/// Uses IndexMap to preserve field order (important for tuple structs
/// and for predictable printing).
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    /// The struct's type name (e.g., "Point", "Person")
    pub type_name: String,

    /// The struct's fields in definition order
    /// For tuple structs, keys are "0", "1", "2", etc.
    pub fields: IndexMap<String, Value>,

    /// Whether this is a tuple struct (fields accessed by index)
    pub is_tuple_struct: bool,
}

impl StructValue {
    /// Create a new named struct
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
            is_tuple_struct: false,
        }
    }

    /// Create a new tuple struct
    pub fn tuple(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
            is_tuple_struct: true,
        }
    }

    /// Add a field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A struct definition registered by a `struct` item.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Type name
    pub name: String,

    /// Field names; `0`, `1`, ... for tuple structs
    pub fields: Vec<String>,

    /// Whether the struct uses tuple syntax
    pub is_tuple_struct: bool,
}

/// An integer range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValue {
    /// Inclusive lower bound, if any
    pub start: Option<i64>,

    /// Upper bound, if any
    pub end: Option<i64>,

    /// `..=` rather than `..`
    pub inclusive: bool,
}

impl RangeValue {
    /// Materialize a bounded range into its elements.
    ///
    /// Returns `None` when the range has no upper bound.
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        let start = self.start.unwrap_or(0);
        let end = self.end?;
        let items = if self.inclusive {
            (start..=end).map(Value::Int).collect()
        } else {
            (start..end).map(Value::Int).collect()
        };
        Some(items)
    }

    /// Resolve this range against a sequence length, for slicing.
    pub fn bounds(&self, len: usize) -> Option<(usize, usize)> {
        let start = usize::try_from(self.start.unwrap_or(0)).ok()?;
        let end = match self.end {
            Some(end) if self.inclusive => usize::try_from(end).ok()?.checked_add(1)?,
            Some(end) => usize::try_from(end).ok()?,
            None => len,
        };
        (start <= end && end <= len).then_some((start, end))
    }
}
