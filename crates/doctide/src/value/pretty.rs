//! Width-aware rendering of example results
//!
//! A value is printed on one line when it fits; otherwise containers are
//! broken one element per line, indented by four spaces, the way `{:#?}`
//! lays them out. Callables, futures and types have no structured form and
//! are rejected so the caller can fall back to their `Debug` text.

use thiserror::Error;

use super::{StructValue, Value};
use crate::error::type_name;

/// Default line width for rendered results.
pub const DEFAULT_WIDTH: usize = 80;

const INDENT: usize = 4;

/// A value the pretty printer cannot lay out.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrettyError {
    /// Callables, futures and type definitions
    #[error("`{type_name}` values have no structured representation")]
    Unrepresentable {
        /// Type of the offending value
        type_name: &'static str,
    },
}

/// Render a value within `width` columns.
pub fn pretty(value: &Value, width: usize) -> Result<String, PrettyError> {
    check_representable(value)?;
    let mut out = String::new();
    write_value(value, 0, width, &mut out);
    Ok(out)
}

fn check_representable(value: &Value) -> Result<(), PrettyError> {
    match value {
        Value::Function(_)
        | Value::Closure(_)
        | Value::BuiltinFn(_)
        | Value::Future(_)
        | Value::Type(_) => Err(PrettyError::Unrepresentable {
            type_name: type_name(value),
        }),
        Value::Vec(items) | Value::Tuple(items) => items.iter().try_for_each(check_representable),
        Value::Map(map) => map.iter().try_for_each(|(k, v)| {
            check_representable(&k.0)?;
            check_representable(v)
        }),
        Value::Struct(s) => s.fields.values().try_for_each(check_representable),
        Value::Option(opt) => opt.as_ref().as_ref().map_or(Ok(()), check_representable),
        Value::Result(res) => match res.as_ref() {
            Ok(v) | Err(v) => check_representable(v),
        },
        _ => Ok(()),
    }
}

fn write_value(value: &Value, column: usize, width: usize, out: &mut String) {
    let flat = format!("{:?}", value);
    if column + flat.len() <= width || is_empty_container(value) {
        out.push_str(&flat);
        return;
    }

    match value {
        Value::Vec(items) => write_items(items, "[", "]", column, width, out),
        Value::Tuple(items) => write_items(items, "(", ")", column, width, out),
        Value::Map(map) => {
            out.push_str("{\n");
            for (k, v) in map.iter() {
                push_indent(column + INDENT, out);
                let key = format!("{:?}: ", k.0);
                out.push_str(&key);
                write_value(v, column + INDENT + key.len(), width, out);
                out.push_str(",\n");
            }
            push_indent(column, out);
            out.push('}');
        }
        Value::Struct(s) => write_struct(s, column, width, out),
        Value::Option(opt) => match opt.as_ref() {
            Some(v) => write_wrapped("Some", v, column, width, out),
            None => out.push_str("None"),
        },
        Value::Result(res) => match res.as_ref() {
            Ok(v) => write_wrapped("Ok", v, column, width, out),
            Err(v) => write_wrapped("Err", v, column, width, out),
        },
        _ => out.push_str(&flat),
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Vec(items) | Value::Tuple(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Struct(s) => s.fields.is_empty(),
        _ => false,
    }
}

fn write_items(items: &[Value], open: &str, close: &str, column: usize, width: usize, out: &mut String) {
    out.push_str(open);
    out.push('\n');
    for item in items {
        push_indent(column + INDENT, out);
        write_value(item, column + INDENT, width, out);
        out.push_str(",\n");
    }
    push_indent(column, out);
    out.push_str(close);
}

fn write_struct(s: &StructValue, column: usize, width: usize, out: &mut String) {
    out.push_str(&s.type_name);
    if s.is_tuple_struct {
        let items: Vec<Value> = s.fields.values().cloned().collect();
        write_items(&items, "(", ")", column, width, out);
        return;
    }
    out.push_str(" {\n");
    for (name, v) in s.fields.iter() {
        push_indent(column + INDENT, out);
        out.push_str(name);
        out.push_str(": ");
        write_value(v, column + INDENT + name.len() + 2, width, out);
        out.push_str(",\n");
    }
    push_indent(column, out);
    out.push('}');
}

fn write_wrapped(name: &str, inner: &Value, column: usize, width: usize, out: &mut String) {
    out.push_str(name);
    out.push_str("(\n");
    push_indent(column + INDENT, out);
    write_value(inner, column + INDENT, width, out);
    out.push_str(",\n");
    push_indent(column, out);
    out.push(')');
}

fn push_indent(n: usize, out: &mut String) {
    out.extend(std::iter::repeat(' ').take(n));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::BuiltinFn;

    #[test]
    fn test_short_values_stay_flat() {
        let v = Value::from(vec![1i64, 2, 3]);
        assert_eq!(pretty(&v, DEFAULT_WIDTH).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_long_values_break() {
        let v = Value::from(vec!["alpha", "beta", "gamma"]);
        assert_eq!(
            pretty(&v, 10).unwrap(),
            "[\n    \"alpha\",\n    \"beta\",\n    \"gamma\",\n]"
        );
    }

    #[test]
    fn test_nested_option_breaks_inside() {
        let v = Value::some(Value::from(vec![100i64, 200]));
        assert_eq!(
            pretty(&v, 15).unwrap(),
            "Some(\n    [100, 200],\n)"
        );
    }

    #[test]
    fn test_zero_width_matches_alternate_debug() {
        let v = Value::tuple(vec![Value::Int(1), Value::vec(vec![])]);
        assert_eq!(pretty(&v, 0).unwrap(), "(\n    1,\n    [],\n)");
    }

    #[test]
    fn test_callables_are_unrepresentable() {
        let f = Value::BuiltinFn(BuiltinFn::new("noop", 0, |_, _| Ok(Value::Unit)));
        assert_eq!(
            pretty(&Value::vec(vec![f]), DEFAULT_WIDTH),
            Err(PrettyError::Unrepresentable {
                type_name: "builtin fn"
            })
        );
    }
}
