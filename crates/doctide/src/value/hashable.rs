//! Hashable wrapper for Value to enable use as map keys

use std::hash::{Hash, Hasher};

use super::Value;

/// A wrapper for Value that implements Hash and Eq.
///
/// Only primitives, strings and tuples of those are valid keys; callers
/// check [`HashableValue::is_hashable`] before inserting.
#[derive(Debug, Clone)]
pub struct HashableValue(pub Value);

impl HashableValue {
    /// Check if a value can be hashed
    pub fn is_hashable(value: &Value) -> bool {
        match value {
            Value::Unit | Value::Bool(_) | Value::Char(_) | Value::Int(_) | Value::String(_) => {
                true
            }
            Value::Tuple(items) => items.iter().all(Self::is_hashable),
            _ => false,
        }
    }

    /// Wrap a value if it can be used as a key.
    pub fn new(value: Value) -> Option<Self> {
        Self::is_hashable(&value).then_some(Self(value))
    }
}

impl Hash for HashableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Bool(b) => b.hash(state),
        Value::Char(c) => c.hash(state),
        Value::Int(n) => n.hash(state),
        Value::String(s) => s.hash(state),
        Value::Tuple(items) => {
            for item in items.iter() {
                hash_value(item, state);
            }
        }
        // Unhashable values are rejected before insertion; the discriminant
        // alone keeps Hash consistent with Eq for them.
        _ => {}
    }
}

impl PartialEq for HashableValue {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for HashableValue {}
