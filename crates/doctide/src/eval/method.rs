//! Method call evaluation
//!
//! Methods defined in `impl` blocks take precedence. Everything else is a
//! builtin method on the receiver's runtime type. Builtins that take
//! `&mut self` (`push`, `insert`, `sort`, ...) operate on the receiver's
//! place so the change is visible afterwards.

mod map;
mod number;
mod option;
mod sequence;
mod string;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::type_name;
use crate::value::Receiver;
use crate::{Environment, EvalContext, EvalError, Value};

use super::assign::Place;
use super::function::{call_method, call_value};
use super::Evaluate;

pub(crate) use sequence::iter_items;

/// A builtin method invocation with its arguments already evaluated.
pub(crate) struct MethodCall<'a> {
    /// Method name
    pub method: &'a str,
    /// Arguments, receiver excluded
    pub args: Vec<Value>,
    /// Type given with turbofish: `collect::<String>()`
    pub turbofish: Option<&'a syn::Type>,
}

impl MethodCall<'_> {
    /// The arguments as a fixed-size array, or an arity error.
    pub fn args<const N: usize>(&self) -> Result<&[Value; N], EvalError> {
        self.args
            .as_slice()
            .try_into()
            .map_err(|_| EvalError::ArityMismatch {
                name: self.method.to_string(),
                expected: N,
                got: self.args.len(),
            })
    }

    /// Name of the turbofish type, if any (`i64` in `parse::<i64>()`).
    pub fn turbofish_name(&self) -> Option<String> {
        match self.turbofish? {
            syn::Type::Path(path) => Some(super::path::last_segment(&path.path)),
            _ => None,
        }
    }

    fn undefined(&self, receiver: &Value) -> EvalError {
        EvalError::UndefinedMethod {
            type_name: type_name(receiver).to_string(),
            method: self.method.to_string(),
        }
    }
}

impl Evaluate for syn::ExprMethodCall {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // `map.entry(k).or_insert(v)` yields the (possibly new) entry
        if is_entry_insert(self) {
            let expr = syn::Expr::MethodCall(self.clone());
            return match Place::resolve(&expr, env, ctx)? {
                Some(place) => Ok(place.get_mut(env)?.clone()),
                None => Err(EvalError::UnsupportedExpr {
                    kind: "entry on a temporary map".to_string(),
                }),
            };
        }

        let receiver = self.receiver.eval(env, ctx)?;
        let args = self
            .args
            .iter()
            .map(|arg| arg.eval(env, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let method = self.method.to_string();
        let call = MethodCall {
            method: &method,
            args,
            turbofish: turbofish_type(self),
        };

        if let Value::Struct(instance) = &receiver {
            let qualified = format!("{}::{}", instance.type_name, method);
            if let Some(Value::Function(func)) = env.get(&qualified).cloned() {
                let (result, final_self) = call_method(&func, receiver, call.args, env, ctx)?;
                if func.receiver == Some(Receiver::RefMut) {
                    if let (Some(updated), Some(place)) =
                        (final_self, Place::resolve(&self.receiver, env, ctx)?)
                    {
                        *place.get_mut(env)? = updated;
                    }
                }
                return Ok(result);
            }
        }

        if is_mutating(&receiver, &method) {
            return match Place::resolve(&self.receiver, env, ctx)? {
                Some(place) => place.modify(env, |value, env| mutate(value, &call, env, ctx)),
                // A temporary: mutate it and drop it
                None => {
                    let mut temporary = receiver;
                    mutate(&mut temporary, &call, env, ctx)
                }
            };
        }

        call_builtin_method(&receiver, &call, env, ctx)
    }
}

fn turbofish_type(call: &syn::ExprMethodCall) -> Option<&syn::Type> {
    call.turbofish.as_ref()?.args.iter().find_map(|arg| match arg {
        syn::GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

/// `X.entry(k).or_insert(v)` / `X.entry(k).or_insert_with(f)`
pub(crate) fn is_entry_insert(call: &syn::ExprMethodCall) -> bool {
    matches!(
        call.method.to_string().as_str(),
        "or_insert" | "or_insert_with"
    ) && matches!(call.receiver.as_ref(), syn::Expr::MethodCall(inner) if inner.method == "entry")
}

// ═══════════════════════════════════════════════════════════════════════
// Builtin Dispatch
// ═══════════════════════════════════════════════════════════════════════

/// Call a builtin method that does not modify its receiver.
pub(crate) fn call_builtin_method(
    receiver: &Value,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let result = match receiver {
        Value::String(s) => string::call(s, call)?,
        Value::Char(c) => string::call_char(*c, call)?,
        Value::Int(n) => number::call_int(*n, call)?,
        Value::Float(x) => number::call_float(*x, call)?,
        Value::Vec(items) => sequence::call(items.as_ref().clone(), call, env, ctx)?,
        Value::Range(range) => sequence::call_range(range, call, env, ctx)?,
        Value::Map(map) => map::call(map, call, env, ctx)?,
        Value::Option(opt) => option::call_option(opt.as_ref(), call, env, ctx)?,
        Value::Result(res) => option::call_result(res.as_ref(), call, env, ctx)?,
        Value::Struct(_) => match receiver.as_ordering() {
            Some(ord) => call_ordering(ord, call)?,
            None => None,
        },
        _ => None,
    };
    match result {
        Some(value) => Ok(value),
        None => call_common(receiver, call),
    }
}

/// Methods every value answers to.
fn call_common(receiver: &Value, call: &MethodCall<'_>) -> Result<Value, EvalError> {
    let value = match call.method {
        "clone" | "to_owned" | "into" | "as_ref" | "as_mut" | "borrow" | "borrow_mut" => {
            receiver.clone()
        }
        "to_string" => Value::string(receiver.to_string()),
        "eq" | "ne" => {
            let [other] = call.args::<1>()?;
            Value::Bool((receiver == other) == (call.method == "eq"))
        }
        "lt" | "le" | "gt" | "ge" => {
            let [other] = call.args::<1>()?;
            let ord = compare(receiver, other)?;
            Value::Bool(match call.method {
                "lt" => ord == Ordering::Less,
                "le" => ord != Ordering::Greater,
                "gt" => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            })
        }
        "cmp" => {
            let [other] = call.args::<1>()?;
            Value::ordering(compare(receiver, other)?)
        }
        "partial_cmp" => {
            let [other] = call.args::<1>()?;
            Value::from(receiver.compare(other).map(Value::ordering))
        }
        "max" | "min" => {
            let [other] = call.args::<1>()?;
            let ord = compare(receiver, other)?;
            let keep_receiver = match call.method {
                "max" => ord == Ordering::Greater,
                _ => ord != Ordering::Greater,
            };
            if keep_receiver {
                receiver.clone()
            } else {
                other.clone()
            }
        }
        _ => return Err(call.undefined(receiver)),
    };
    Ok(value)
}

/// Methods on `Ordering` values.
fn call_ordering(ord: Ordering, call: &MethodCall<'_>) -> Result<Option<Value>, EvalError> {
    let value = match call.method {
        "reverse" => Value::ordering(ord.reverse()),
        "then" => {
            let [other] = call.args::<1>()?;
            match other.as_ordering() {
                Some(next) => Value::ordering(ord.then(next)),
                None => return Err(expected_arg("Ordering", other, call.method)),
            }
        }
        "is_lt" => Value::Bool(ord.is_lt()),
        "is_le" => Value::Bool(ord.is_le()),
        "is_gt" => Value::Bool(ord.is_gt()),
        "is_ge" => Value::Bool(ord.is_ge()),
        "is_eq" => Value::Bool(ord.is_eq()),
        "is_ne" => Value::Bool(ord.is_ne()),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

// ═══════════════════════════════════════════════════════════════════════
// Mutating Builtins
// ═══════════════════════════════════════════════════════════════════════

const VEC_MUTATORS: &[&str] = &[
    "push", "pop", "insert", "remove", "clear", "extend", "truncate", "reverse", "sort",
    "sort_unstable", "sort_by", "sort_by_key", "dedup", "retain", "swap", "drain",
];
const STRING_MUTATORS: &[&str] = &[
    "push", "push_str", "pop", "clear", "insert", "insert_str", "truncate", "remove",
];
const MAP_MUTATORS: &[&str] = &["insert", "remove", "clear", "retain", "extend"];
const OPTION_MUTATORS: &[&str] = &["take", "replace", "insert", "get_or_insert"];

fn is_mutating(receiver: &Value, method: &str) -> bool {
    let mutators = match receiver {
        Value::Vec(_) => VEC_MUTATORS,
        Value::String(_) => STRING_MUTATORS,
        Value::Map(_) => MAP_MUTATORS,
        Value::Option(_) => OPTION_MUTATORS,
        _ => return false,
    };
    mutators.contains(&method)
}

fn mutate(
    value: &mut Value,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let result = match value {
        Value::Vec(items) => sequence::mutate(Arc::make_mut(items), call, env, ctx)?,
        Value::String(s) => string::mutate(Arc::make_mut(s), call)?,
        Value::Map(map) => map::mutate(Arc::make_mut(map), call, env, ctx)?,
        Value::Option(opt) => option::mutate(Arc::make_mut(opt), call)?,
        _ => None,
    };
    result.ok_or_else(|| call.undefined(value))
}

// ═══════════════════════════════════════════════════════════════════════
// Shared Helpers
// ═══════════════════════════════════════════════════════════════════════

pub(crate) fn expected_arg(expected: &str, found: &Value, method: &str) -> EvalError {
    EvalError::type_error(format!(
        "expected `{}` argument to `{}`, found `{}`",
        expected,
        method,
        type_name(found)
    ))
}

pub(crate) fn int_arg(value: &Value, method: &str) -> Result<i64, EvalError> {
    value.as_i64().ok_or_else(|| expected_arg("integer", value, method))
}

pub(crate) fn usize_arg(value: &Value, method: &str) -> Result<usize, EvalError> {
    value.as_usize().ok_or_else(|| expected_arg("usize", value, method))
}

pub(crate) fn str_arg<'v>(value: &'v Value, method: &str) -> Result<&'v str, EvalError> {
    value.as_str().ok_or_else(|| expected_arg("&str", value, method))
}

pub(crate) fn compare(left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    left.compare(right).ok_or_else(|| {
        EvalError::type_error(format!(
            "cannot compare `{}` with `{}`",
            type_name(left),
            type_name(right)
        ))
    })
}

/// Call `f` and require a `bool` back.
pub(crate) fn predicate(
    f: &Value,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<bool, EvalError> {
    match call_value(f, args, env, ctx)? {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::type_error(format!(
            "expected `bool` from closure, found `{}`",
            type_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::stmt::eval_stmts;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Result<Value, EvalError> {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        let mut env = Environment::with_prelude();
        eval_stmts(&block.stmts, &mut env, &EvalContext::new())
    }

    fn debug(src: &str) -> String {
        format!("{:?}", run(src).unwrap())
    }

    #[test]
    fn test_user_method_with_mut_self() {
        let src = "
            struct Counter { n: i64 }
            impl Counter {
                fn new() -> Self { Counter { n: 0 } }
                fn bump(&mut self) { self.n += 1; }
                fn get(&self) -> i64 { self.n }
            }
            let mut c = Counter::new();
            c.bump();
            c.bump();
            c.get()";
        assert_eq!(run(src).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_push_on_place() {
        assert_eq!(debug("let mut v = vec![1]; v.push(2); v"), "[1, 2]");
        assert_eq!(
            debug("let mut s = (vec![0], 1); s.0.push(5); s"),
            "([0, 5], 1)"
        );
    }

    #[test]
    fn test_push_on_immutable_binding() {
        assert_eq!(
            run("let v = vec![1]; v.push(2);").unwrap_err().kind(),
            "ImmutableBinding"
        );
    }

    #[test]
    fn test_entry_or_insert_counts_words() {
        let src = r#"
            let mut counts = HashMap::new();
            for w in "a b a".split_whitespace() {
                *counts.entry(w).or_insert(0) += 1;
            }
            counts"#;
        assert_eq!(debug(src), r#"{"a": 2, "b": 1}"#);
    }

    #[test]
    fn test_sort_by_with_cmp() {
        assert_eq!(
            debug("let mut v = vec![1, 3, 2]; v.sort_by(|a, b| b.cmp(a)); v"),
            "[3, 2, 1]"
        );
        assert_eq!(debug("1.cmp(&2)"), "Less");
    }

    #[test]
    fn test_common_methods() {
        assert_eq!(debug("3.max(7)"), "7");
        assert_eq!(debug("\"b\".to_string().eq(&\"b\".to_string())"), "true");
    }

    #[test]
    fn test_unknown_method() {
        let err = run("true.frobnicate()").unwrap_err();
        assert_eq!(err.to_string(), "no method named `frobnicate` found for `bool`");
    }
}
