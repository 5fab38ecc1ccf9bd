//! Value trait implementations: constructors, extractors, From traits, PartialEq

use std::cmp::Ordering;
use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a vec value
    pub fn vec(items: Vec<Value>) -> Self {
        Value::Vec(Arc::new(items))
    }

    /// Create a tuple value
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Arc::new(items))
    }

    /// Create a struct value
    pub fn structure(s: StructValue) -> Self {
        Value::Struct(Arc::new(s))
    }

    /// Create an empty map
    pub fn map() -> Self {
        Value::Map(Arc::new(IndexMap::new()))
    }

    /// Create Some(value)
    pub fn some(value: Value) -> Self {
        Value::Option(Arc::new(Some(value)))
    }

    /// Create None
    pub fn none() -> Self {
        Value::Option(Arc::new(None))
    }

    /// Create Ok(value)
    pub fn ok(value: Value) -> Self {
        Value::Result(Arc::new(Ok(value)))
    }

    /// Create Err(value)
    pub fn err(value: Value) -> Self {
        Value::Result(Arc::new(Err(value)))
    }

    /// `Ordering::Less`, `Ordering::Equal` or `Ordering::Greater`.
    ///
    /// Orderings are unit structs named after the variant, which is how
    /// they print and how `Ordering::Less` patterns match them.
    pub fn ordering(ord: Ordering) -> Self {
        let name = match ord {
            Ordering::Less => "Less",
            Ordering::Equal => "Equal",
            Ordering::Greater => "Greater",
        };
        Value::structure(StructValue::new(name))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Predicates and Extractors
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is unit type
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Check if value can be called
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Closure(_) | Value::BuiltinFn(_) | Value::Type(_)
        )
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a non-negative integer as an index
    pub fn as_usize(&self) -> Option<usize> {
        self.as_i64().and_then(|n| usize::try_from(n).ok())
    }

    /// Extract a float, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract an ordering produced by `cmp`
    pub fn as_ordering(&self) -> Option<Ordering> {
        match self {
            Value::Struct(s) if s.fields.is_empty() => match s.type_name.as_str() {
                "Less" => Some(Ordering::Less),
                "Equal" => Some(Ordering::Equal),
                "Greater" => Some(Ordering::Greater),
                _ => None,
            },
            _ => None,
        }
    }

    /// Extract the elements of a sequence (vec, tuple, or bounded range)
    pub fn to_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::Vec(items) | Value::Tuple(items) => Some(items.as_ref().clone()),
            Value::Range(range) => range.to_vec(),
            Value::Map(map) => Some(
                map.iter()
                    .map(|(k, v)| Value::tuple(vec![k.0.clone(), v.clone()]))
                    .collect(),
            ),
            Value::String(s) => Some(s.chars().map(Value::Char).collect()),
            _ => None,
        }
    }

    /// Ordering between two values of the same kind.
    ///
    /// Returns `None` for values that have no ordering (maps, callables,
    /// mixed kinds, NaN).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Unit, Value::Unit) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Char(a), Value::Char(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Vec(a), Value::Vec(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                a.len().partial_cmp(&b.len())
            }
            (Value::Option(a), Value::Option(b)) => match (a.as_ref(), b.as_ref()) {
                (None, None) => Some(Ordering::Equal),
                (None, Some(_)) => Some(Ordering::Less),
                (Some(_), None) => Some(Ordering::Greater),
                (Some(x), Some(y)) => x.compare(y),
            },
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Vec(a), Value::Vec(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Option(a), Value::Option(b)) => a == b,
            (Value::Result(a), Value::Result(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            (Value::BuiltinFn(a), Value::BuiltinFn(b)) => a.name == b.name,
            (Value::Future(a), Value::Future(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::vec(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Option(Arc::new(opt.map(Into::into)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_sequences_lexicographically() {
        let a = Value::from(vec![1i64, 2]);
        let b = Value::from(vec![1i64, 3]);
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(Value::Int(1).compare(&Value::string("1")), None);
    }

    #[test]
    fn test_range_items() {
        let range = Value::Range(RangeValue {
            start: Some(1),
            end: Some(3),
            inclusive: true,
        });
        assert_eq!(
            range.to_items(),
            Some(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let block: syn::Block = syn::parse_quote!({ 1 });
        let f = Value::Function(Arc::new(FunctionValue::new(
            "f".to_string(),
            vec![],
            block,
        )));
        assert_eq!(f, f.clone());
    }
}
