//! Methods on maps

use indexmap::IndexMap;

use crate::value::HashableValue;
use crate::{Environment, EvalContext, EvalError, Value};

use super::{expected_arg, iter_items, predicate, MethodCall};

type Map = IndexMap<HashableValue, Value>;

fn key(value: &Value, method: &str) -> Result<HashableValue, EvalError> {
    HashableValue::new(value.clone()).ok_or_else(|| expected_arg("hashable key", value, method))
}

/// Non-mutating methods on a map.
pub(super) fn call(
    map: &Map,
    call: &MethodCall<'_>,
    _env: &mut Environment,
    _ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "len" => Value::Int(map.len() as i64),
        "is_empty" => Value::Bool(map.is_empty()),
        "get" => {
            let [k] = call.args::<1>()?;
            Value::from(map.get(&key(k, method)?).cloned())
        }
        "contains_key" => {
            let [k] = call.args::<1>()?;
            Value::Bool(map.contains_key(&key(k, method)?))
        }
        "get_key_value" => {
            let [k] = call.args::<1>()?;
            Value::from(
                map.get_key_value(&key(k, method)?)
                    .map(|(k, v)| Value::tuple(vec![k.0.clone(), v.clone()])),
            )
        }
        "keys" | "into_keys" => Value::vec(map.keys().map(|k| k.0.clone()).collect()),
        "values" | "into_values" | "values_mut" => Value::vec(map.values().cloned().collect()),
        "iter" | "into_iter" | "iter_mut" => Value::vec(
            map.iter()
                .map(|(k, v)| Value::tuple(vec![k.0.clone(), v.clone()]))
                .collect(),
        ),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Mutating methods on a map.
pub(super) fn mutate(
    map: &mut Map,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "insert" => {
            let [k, v] = call.args::<2>()?;
            Value::from(map.insert(key(k, method)?, v.clone()))
        }
        // Removal keeps the remaining entries in insertion order
        "remove" => {
            let [k] = call.args::<1>()?;
            Value::from(map.shift_remove(&key(k, method)?))
        }
        "clear" => {
            map.clear();
            Value::Unit
        }
        "retain" => {
            let [f] = call.args::<1>()?;
            let mut kept = Map::with_capacity(map.len());
            for (k, v) in map.iter() {
                if predicate(f, vec![k.0.clone(), v.clone()], env, ctx)? {
                    kept.insert(k.clone(), v.clone());
                }
            }
            *map = kept;
            Value::Unit
        }
        "extend" => {
            let [pairs] = call.args::<1>()?;
            for pair in iter_items(pairs)? {
                match &pair {
                    Value::Tuple(kv) if kv.len() == 2 => {
                        map.insert(key(&kv[0], method)?, kv[1].clone());
                    }
                    other => return Err(expected_arg("(K, V)", other, method)),
                }
            }
            Value::Unit
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}
