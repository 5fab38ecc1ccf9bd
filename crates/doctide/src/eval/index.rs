//! Index expression evaluation

use crate::error::type_name;
use crate::value::HashableValue;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprIndex {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let base = self.expr.eval(env, ctx)?;
        let index = self.index.eval(env, ctx)?;
        index_value(&base, &index)
    }
}

/// `base[index]` for vectors, strings and maps.
pub fn index_value(base: &Value, index: &Value) -> Result<Value, EvalError> {
    match (base, index) {
        (Value::Vec(items), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|idx| items.get(idx).cloned())
            .ok_or(EvalError::IndexOutOfBounds {
                index: *i,
                len: items.len(),
            }),

        (Value::Vec(items), Value::Range(range)) => {
            let (start, end) = range.bounds(items.len()).ok_or_else(|| {
                EvalError::panic(format!(
                    "range {:?} out of range for slice of length {}",
                    index,
                    items.len()
                ))
            })?;
            Ok(Value::vec(items[start..end].to_vec()))
        }

        (Value::String(s), Value::Range(range)) => range
            .bounds(s.len())
            .and_then(|(start, end)| s.get(start..end))
            .map(Value::string)
            .ok_or_else(|| {
                EvalError::panic(format!("byte index {:?} is out of bounds of `{}`", index, s))
            }),

        (Value::Map(map), key) => HashableValue::new(key.clone())
            .and_then(|k| map.get(&k).cloned())
            .ok_or_else(|| EvalError::panic(format!("key not found: {:?}", key))),

        (base, index) => Err(EvalError::type_error(format!(
            "cannot index into a value of type `{}` with `{}`",
            type_name(base),
            type_name(index)
        ))),
    }
}
