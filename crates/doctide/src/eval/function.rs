//! Function values: definition, closures and invocation

use std::sync::Arc;

use crate::eval::pattern::{apply_bindings, match_pattern, MatchBindings};
use crate::value::{BuiltinFn, ClosureValue, FunctionValue, FutureValue, Receiver, StructValue};
use crate::{Environment, EvalContext, EvalError, Value};

use super::{ControlFlow, Evaluate};

/// Build a FunctionValue from a signature and body.
///
/// Parameter types are dropped; the patterns are kept so `(a, b): (i64, i64)`
/// destructures at call time.
pub fn function_from_sig(sig: &syn::Signature, body: &syn::Block) -> FunctionValue {
    let params = sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            syn::FnArg::Typed(pat_type) => Some(pat_type.pat.as_ref().clone()),
            syn::FnArg::Receiver(_) => None,
        })
        .collect();
    let func = FunctionValue::new(sig.ident.to_string(), params, body.clone());
    if sig.asyncness.is_some() {
        func.asynchronous()
    } else {
        func
    }
}

/// How a signature takes `self`, if at all.
pub fn receiver_of(sig: &syn::Signature) -> Option<Receiver> {
    match sig.receiver()? {
        r if r.reference.is_none() => Some(Receiver::Value),
        r if r.mutability.is_some() => Some(Receiver::RefMut),
        _ => Some(Receiver::Ref),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Closures
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprClosure {
    fn eval(&self, env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        if self.asyncness.is_some() {
            return Err(EvalError::UnsupportedExpr {
                kind: "async closure".to_string(),
            });
        }
        Ok(Value::Closure(Arc::new(ClosureValue {
            params: self.inputs.iter().cloned().collect(),
            body: Arc::new(self.body.as_ref().clone()),
            captures: Arc::new(env.local_bindings()),
        })))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Invocation
// ═══════════════════════════════════════════════════════════════════════

/// Call any callable value with already-evaluated arguments.
pub fn call_value(
    callee: &Value,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match callee {
        Value::Function(func) => invoke(func, None, args, env, ctx).map(|(value, _)| value),
        Value::Closure(closure) => call_closure(closure, args, env, ctx),
        Value::BuiltinFn(builtin) => call_builtin(builtin, &args, ctx),
        Value::Type(def) if def.is_tuple_struct => {
            check_arity(&def.name, def.fields.len(), args.len())?;
            let mut instance = StructValue::tuple(def.name.clone());
            for (name, value) in def.fields.iter().zip(args) {
                instance.fields.insert(name.clone(), value);
            }
            Ok(Value::structure(instance))
        }
        other => Err(EvalError::type_error(format!(
            "expected function, found `{}`",
            crate::error::type_name(other)
        ))),
    }
}

/// Call a method defined in an `impl` block on `receiver`.
///
/// Returns the result and the final value of `self`, which callers write
/// back for `&mut self` methods.
pub fn call_method(
    func: &FunctionValue,
    receiver: Value,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(Value, Option<Value>), EvalError> {
    invoke(func, Some(receiver), args, env, ctx)
}

fn invoke(
    func: &FunctionValue,
    receiver: Option<Value>,
    mut args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(Value, Option<Value>), EvalError> {
    // `Type::method(value, ...)` passes the receiver positionally
    let receiver = match (receiver, func.receiver) {
        (Some(value), _) => Some(value),
        (None, Some(_)) if !args.is_empty() => Some(args.remove(0)),
        (None, Some(_)) => {
            return Err(EvalError::ArityMismatch {
                name: func.name.clone(),
                expected: func.params.len() + 1,
                got: 0,
            })
        }
        (None, None) => None,
    };
    check_arity(&func.name, func.params.len(), args.len())?;

    let mut bindings = bind_params(&func.params, &args)?;
    if let Some(type_name) = &func.self_type {
        if let Some(def) = env.get(type_name).cloned() {
            bindings.push(("Self".to_string(), def, false));
        }
    }
    if let Some(value) = receiver {
        bindings.push(("self".to_string(), value, true));
    }

    if func.is_async {
        let captures = bindings.into_iter().map(|(name, value, _)| (name, value)).collect();
        let future = FutureValue::deferred(func.name.clone(), Arc::clone(&func.body), captures);
        return Ok((Value::Future(future), None));
    }

    let mut call = env.call_guard()?;
    apply_bindings(&mut call, bindings);
    let result = catch_return(super::eval_block(&func.body, &mut call, ctx))?;
    let final_self = call.get("self").cloned();
    Ok((result, final_self))
}

fn call_closure(
    closure: &ClosureValue,
    args: Vec<Value>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    check_arity("closure", closure.params.len(), args.len())?;
    let bindings = bind_params(&closure.params, &args)?;

    let mut call = env.call_guard()?;
    for (name, value) in closure.captures.iter() {
        call.define_with_mode(name.clone(), value.clone(), crate::BindingMode::Mutable);
    }
    apply_bindings(&mut call, bindings);
    catch_return(closure.body.eval(&mut call, ctx))
}

/// Invoke a builtin, turning its error string into an `EvalError`.
pub fn call_builtin(
    builtin: &BuiltinFn,
    args: &[Value],
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    if let Ok(arity) = usize::try_from(builtin.arity) {
        check_arity(&builtin.name, arity, args.len())?;
    }
    (builtin.func)(args, ctx).map_err(|message| EvalError::Builtin {
        name: builtin.name.clone(),
        message,
    })
}

fn check_arity(name: &str, expected: usize, got: usize) -> Result<(), EvalError> {
    if expected == got {
        Ok(())
    } else {
        Err(EvalError::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        })
    }
}

fn bind_params(params: &[syn::Pat], args: &[Value]) -> Result<MatchBindings, EvalError> {
    let mut bindings = Vec::new();
    for (pat, arg) in params.iter().zip(args) {
        match match_pattern(pat, arg)? {
            Some(found) => bindings.extend(found),
            None => {
                return Err(EvalError::RefutablePattern {
                    pattern: super::source_text(pat),
                })
            }
        }
    }
    Ok(bindings)
}

/// A `return` ends the call with its value.
pub fn catch_return(result: Result<Value, EvalError>) -> Result<Value, EvalError> {
    match result {
        Err(EvalError::ControlFlow(ControlFlow::Return { value })) => Ok(value),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_from_sig() {
        let item_fn: syn::ItemFn = syn::parse_str("fn add(a: i64, b: i64) -> i64 { a + b }").unwrap();
        let func = function_from_sig(&item_fn.sig, &item_fn.block);
        assert_eq!(func.name, "add");
        assert_eq!(func.params.len(), 2);
        assert!(!func.is_async);
    }

    #[test]
    fn test_receiver_kinds() {
        let sig = |src: &str| syn::parse_str::<syn::ItemFn>(src).unwrap().sig;
        assert_eq!(receiver_of(&sig("fn f(&self) {}")), Some(Receiver::Ref));
        assert_eq!(receiver_of(&sig("fn f(&mut self) {}")), Some(Receiver::RefMut));
        assert_eq!(receiver_of(&sig("fn f(self) {}")), Some(Receiver::Value));
        assert_eq!(receiver_of(&sig("fn f(x: i64) {}")), None);
    }

    #[test]
    fn test_call_checks_arity() {
        let item_fn: syn::ItemFn = syn::parse_str("fn one(a: i64) -> i64 { a }").unwrap();
        let func = Value::Function(Arc::new(function_from_sig(&item_fn.sig, &item_fn.block)));
        let err = call_value(&func, vec![], &mut Environment::new(), &EvalContext::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "function `one` takes 1 argument but 0 were supplied"
        );
    }

    #[test]
    fn test_return_ends_call() {
        let item_fn: syn::ItemFn =
            syn::parse_str("fn early(a: i64) -> i64 { if a > 0 { return 1; } 2 }").unwrap();
        let func = Value::Function(Arc::new(function_from_sig(&item_fn.sig, &item_fn.block)));
        let mut env = Environment::new();
        let ctx = EvalContext::new();
        assert_eq!(call_value(&func, vec![Value::Int(5)], &mut env, &ctx).unwrap(), Value::Int(1));
        assert_eq!(call_value(&func, vec![Value::Int(0)], &mut env, &ctx).unwrap(), Value::Int(2));
    }
}
