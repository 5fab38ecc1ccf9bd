//! Path evaluation (variable lookup)

use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprPath {
    fn eval(&self, env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        resolve_path(&self.path, env)
    }
}

/// Look up a (possibly qualified) path.
///
/// `a::b::c` is looked up as the binding `a::b::c`, which is how the
/// prelude registers `String::new` and how `impl` blocks register
/// associated functions. Leading module segments (`std::collections::`)
/// are ignored, `Self` resolves to the type of the enclosing `impl`, and
/// numeric limits such as `i64::MAX` are built in.
pub fn resolve_path(path: &syn::Path, env: &Environment) -> Result<Value, EvalError> {
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();

    if let [name] = segments.as_slice() {
        return match env.get(name) {
            // A unit struct names its only value
            Some(Value::Type(def)) if def.fields.is_empty() && !def.is_tuple_struct => Ok(
                Value::structure(crate::value::StructValue::new(def.name.clone())),
            ),
            Some(value) => Ok(value.clone()),
            None => Err(EvalError::UndefinedVariable { name: name.clone() }),
        };
    }

    let mut segments = segments;
    if segments.first().map(String::as_str) == Some("Self") {
        if let Some(Value::Type(def)) = env.get("Self") {
            segments[0] = def.name.clone();
        }
    }

    // Try the longest suffix first: `std::string::String::new` -> `String::new`
    for start in 0..segments.len() {
        let name = segments[start..].join("::");
        if let Some(value) = env.get(&name) {
            return Ok(value.clone());
        }
        if let Some(value) = numeric_constant(&segments[start..]) {
            return Ok(value);
        }
    }

    Err(EvalError::UndefinedVariable {
        name: path_to_string(path),
    })
}

fn numeric_constant(segments: &[String]) -> Option<Value> {
    let [ty, name] = segments else {
        return None;
    };
    let value = match (ty.as_str(), name.as_str()) {
        ("i8", "MAX") => Value::Int(i8::MAX.into()),
        ("i8", "MIN") => Value::Int(i8::MIN.into()),
        ("i16", "MAX") => Value::Int(i16::MAX.into()),
        ("i16", "MIN") => Value::Int(i16::MIN.into()),
        ("i32", "MAX") => Value::Int(i32::MAX.into()),
        ("i32", "MIN") => Value::Int(i32::MIN.into()),
        ("i64" | "isize", "MAX") => Value::Int(i64::MAX),
        ("i64" | "isize", "MIN") => Value::Int(i64::MIN),
        ("u8", "MAX") => Value::Int(u8::MAX.into()),
        ("u16", "MAX") => Value::Int(u16::MAX.into()),
        ("u32", "MAX") => Value::Int(u32::MAX.into()),
        ("u8" | "u16" | "u32" | "u64" | "usize", "MIN") => Value::Int(0),
        ("f64" | "f32", "MAX") => Value::Float(f64::MAX),
        ("f64" | "f32", "MIN") => Value::Float(f64::MIN),
        ("f64" | "f32", "INFINITY") => Value::Float(f64::INFINITY),
        ("f64" | "f32", "NEG_INFINITY") => Value::Float(f64::NEG_INFINITY),
        ("f64" | "f32", "NAN") => Value::Float(f64::NAN),
        ("f64" | "f32", "EPSILON") => Value::Float(f64::EPSILON),
        ("consts", "PI") => Value::Float(std::f64::consts::PI),
        ("consts", "E") => Value::Float(std::f64::consts::E),
        _ => return None,
    };
    Some(value)
}

/// Convert a syn::Path to a string for error messages.
pub fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// Last identifier of a path (`Some` for `Option::Some`).
pub fn last_segment(path: &syn::Path) -> String {
    path.segments
        .last()
        .map(|s| s.ident.to_string())
        .unwrap_or_default()
}
