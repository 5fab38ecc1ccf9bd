//! Assignment and places (`x`, `x.field`, `x[i]`, `x.0[i].y`)

use std::sync::Arc;

use crate::error::type_name;
use crate::value::HashableValue;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

/// One step from a value to a part of it.
#[derive(Debug, Clone)]
enum Accessor {
    /// `.name` or `.0`
    Field(String),
    /// `[index]`, already evaluated
    Index(Value),
}

/// A resolved assignable location: a binding plus a path into its value.
#[derive(Debug, Clone)]
pub struct Place {
    root: String,
    path: Vec<Accessor>,
}

impl Place {
    /// Resolve `expr` as a place, evaluating any index expressions.
    ///
    /// Returns `Ok(None)` when the expression does not name a place.
    pub fn resolve(
        expr: &syn::Expr,
        env: &mut Environment,
        ctx: &EvalContext,
    ) -> Result<Option<Place>, EvalError> {
        match expr {
            syn::Expr::Path(p) if p.path.segments.len() == 1 && p.qself.is_none() => {
                Ok(Some(Place {
                    root: super::path::last_segment(&p.path),
                    path: Vec::new(),
                }))
            }
            syn::Expr::Field(field) => {
                let Some(mut place) = Place::resolve(&field.base, env, ctx)? else {
                    return Ok(None);
                };
                place.path.push(Accessor::Field(super::field::member_name(&field.member)));
                Ok(Some(place))
            }
            syn::Expr::Index(index) => {
                let Some(mut place) = Place::resolve(&index.expr, env, ctx)? else {
                    return Ok(None);
                };
                let key = index.index.eval(env, ctx)?;
                place.path.push(Accessor::Index(key));
                Ok(Some(place))
            }
            syn::Expr::MethodCall(call) if super::method::is_entry_insert(call) => {
                Place::resolve_entry(call, env, ctx)
            }
            syn::Expr::Paren(inner) => Place::resolve(&inner.expr, env, ctx),
            syn::Expr::Group(inner) => Place::resolve(&inner.expr, env, ctx),
            syn::Expr::Reference(inner) => Place::resolve(&inner.expr, env, ctx),
            syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Deref(_)) => {
                Place::resolve(&unary.expr, env, ctx)
            }
            _ => Ok(None),
        }
    }

    /// `map.entry(key).or_insert(default)`: the entry for `key`, inserted
    /// first when missing.
    fn resolve_entry(
        call: &syn::ExprMethodCall,
        env: &mut Environment,
        ctx: &EvalContext,
    ) -> Result<Option<Place>, EvalError> {
        let syn::Expr::MethodCall(entry) = call.receiver.as_ref() else {
            return Ok(None);
        };
        let Some(mut place) = Place::resolve(&entry.receiver, env, ctx)? else {
            return Ok(None);
        };
        let (Some(key_expr), 1) = (entry.args.first(), entry.args.len()) else {
            return Err(EvalError::ArityMismatch {
                name: "entry".to_string(),
                expected: 1,
                got: entry.args.len(),
            });
        };
        let key = key_expr.eval(env, ctx)?;
        let hashable = HashableValue::new(key.clone()).ok_or_else(|| {
            EvalError::type_error(format!("`{}` cannot be used as a map key", type_name(&key)))
        })?;

        let present = match place.get_mut(env)? {
            Value::Map(map) => map.contains_key(&hashable),
            other => {
                return Err(EvalError::UndefinedMethod {
                    type_name: type_name(other).to_string(),
                    method: "entry".to_string(),
                })
            }
        };
        if !present {
            let default = match call.args.first() {
                Some(arg) if call.method == "or_insert" => arg.eval(env, ctx)?,
                Some(arg) => {
                    let f = arg.eval(env, ctx)?;
                    super::function::call_value(&f, Vec::new(), env, ctx)?
                }
                None => {
                    return Err(EvalError::ArityMismatch {
                        name: call.method.to_string(),
                        expected: 1,
                        got: 0,
                    })
                }
            };
            if let Value::Map(map) = place.get_mut(env)? {
                Arc::make_mut(map).insert(hashable, default);
            }
        }

        place.path.push(Accessor::Index(key));
        Ok(Some(place))
    }

    /// Borrow the location mutably. Fails on immutable bindings.
    pub fn get_mut<'e>(&self, env: &'e mut Environment) -> Result<&'e mut Value, EvalError> {
        let mut slot = env
            .get_mut(&self.root)?
            .ok_or_else(|| EvalError::UndefinedVariable {
                name: self.root.clone(),
            })?;
        for accessor in &self.path {
            slot = step(slot, accessor)?;
        }
        Ok(slot)
    }

    /// Run `f` on the owned value at this place and store it back afterwards.
    ///
    /// The binding holds `()` while `f` runs, so `f` may use the environment
    /// freely. The value is written back even if `f` fails.
    pub fn modify<R>(
        &self,
        env: &mut Environment,
        f: impl FnOnce(&mut Value, &mut Environment) -> Result<R, EvalError>,
    ) -> Result<R, EvalError> {
        let mut value = std::mem::replace(self.get_mut(env)?, Value::Unit);
        let result = f(&mut value, env);
        *self.get_mut(env)? = value;
        result
    }
}

fn step<'v>(slot: &'v mut Value, accessor: &Accessor) -> Result<&'v mut Value, EvalError> {
    match (slot, accessor) {
        (Value::Struct(s), Accessor::Field(name)) => {
            let type_name = s.type_name.clone();
            Arc::make_mut(s)
                .fields
                .get_mut(name)
                .ok_or_else(|| EvalError::UndefinedField {
                    type_name,
                    field: name.clone(),
                })
        }
        (Value::Tuple(items), Accessor::Field(name)) => {
            let len = items.len();
            match name.parse::<usize>() {
                Ok(i) if i < len => Ok(&mut Arc::make_mut(items)[i]),
                _ => Err(EvalError::UndefinedField {
                    type_name: "tuple".to_string(),
                    field: name.clone(),
                }),
            }
        }
        (Value::Vec(items), Accessor::Index(key)) => {
            let len = items.len();
            let index = key.as_i64().ok_or_else(|| {
                EvalError::type_error(format!(
                    "the type `[T]` cannot be indexed by `{}`",
                    type_name(key)
                ))
            })?;
            match usize::try_from(index) {
                Ok(i) if i < len => Ok(&mut Arc::make_mut(items)[i]),
                _ => Err(EvalError::IndexOutOfBounds { index, len }),
            }
        }
        (Value::Map(map), Accessor::Index(key)) => {
            let missing = || EvalError::panic(format!("key not found: {:?}", key));
            let key = HashableValue::new(key.clone()).ok_or_else(missing)?;
            Arc::make_mut(map).get_mut(&key).ok_or_else(missing)
        }
        (other, Accessor::Field(name)) => Err(EvalError::UndefinedField {
            type_name: type_name(other).to_string(),
            field: name.clone(),
        }),
        (other, Accessor::Index(_)) => Err(EvalError::type_error(format!(
            "cannot index into a value of type `{}`",
            type_name(other)
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Assignment Expressions
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprAssign {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let value = self.right.eval(env, ctx)?;
        assign_to(&self.left, value, env, ctx)?;
        Ok(Value::Unit)
    }
}

/// Store `value` into the place named by `target`.
///
/// Supports destructuring assignment to tuples and `_`.
pub fn assign_to(
    target: &syn::Expr,
    value: Value,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    match target {
        syn::Expr::Infer(_) => Ok(()),
        syn::Expr::Path(p) if p.path.is_ident("_") => Ok(()),
        syn::Expr::Tuple(tuple) => {
            let items = match &value {
                Value::Tuple(items) if items.len() == tuple.elems.len() => items.clone(),
                other => {
                    return Err(EvalError::type_error(format!(
                        "cannot destructure `{}` into a tuple of {} elements",
                        type_name(other),
                        tuple.elems.len()
                    )))
                }
            };
            for (elem, item) in tuple.elems.iter().zip(items.iter()) {
                assign_to(elem, item.clone(), env, ctx)?;
            }
            Ok(())
        }
        _ => {
            let place = Place::resolve(target, env, ctx)?.ok_or_else(|| {
                EvalError::InvalidAssignTarget {
                    kind: super::expr_kind_name(target).to_string(),
                }
            })?;
            *place.get_mut(env)? = value;
            Ok(())
        }
    }
}

/// Replace the value at `target` with `f(current)`.
pub fn update_place(
    target: &syn::Expr,
    env: &mut Environment,
    ctx: &EvalContext,
    f: impl FnOnce(Value) -> Result<Value, EvalError>,
) -> Result<Value, EvalError> {
    let place = Place::resolve(target, env, ctx)?.ok_or_else(|| EvalError::InvalidAssignTarget {
        kind: super::expr_kind_name(target).to_string(),
    })?;
    let slot = place.get_mut(env)?;
    let current = slot.clone();
    *slot = f(current)?;
    Ok(Value::Unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::BindingMode;
    use crate::value::StructValue;

    fn run(env: &mut Environment, expr: syn::Expr) -> Result<Value, EvalError> {
        expr.eval(env, &EvalContext::new())
    }

    #[test]
    fn test_assign_variable() {
        let mut env = Environment::new();
        env.define_with_mode("x", Value::Int(1), BindingMode::Mutable);
        run(&mut env, syn::parse_quote!(x = 5)).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_assign_immutable_fails() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        let err = run(&mut env, syn::parse_quote!(x = 5)).unwrap_err();
        assert_eq!(err.kind(), "ImmutableBinding");
    }

    #[test]
    fn test_assign_nested_place() {
        let mut env = Environment::new();
        let point = StructValue::new("P").with_field("xs", Value::from(vec![1i64, 2]));
        env.define_with_mode("p", Value::structure(point), BindingMode::Mutable);
        run(&mut env, syn::parse_quote!(p.xs[1] = 9)).unwrap();
        assert_eq!(
            format!("{:?}", env.get("p").unwrap()),
            "P { xs: [1, 9] }"
        );
    }

    #[test]
    fn test_assign_does_not_alias_copies() {
        let mut env = Environment::new();
        env.define_with_mode("a", Value::from(vec![1i64]), BindingMode::Mutable);
        let copy = env.get("a").cloned().unwrap();
        run(&mut env, syn::parse_quote!(a[0] = 2)).unwrap();
        assert_eq!(copy, Value::from(vec![1i64]));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let mut env = Environment::new();
        env.define_with_mode("a", Value::from(vec![1i64]), BindingMode::Mutable);
        assert!(matches!(
            run(&mut env, syn::parse_quote!(a[3] = 2)),
            Err(EvalError::IndexOutOfBounds { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_destructuring_assignment() {
        let mut env = Environment::new();
        env.define_with_mode("a", Value::Int(1), BindingMode::Mutable);
        env.define_with_mode("b", Value::Int(2), BindingMode::Mutable);
        run(&mut env, syn::parse_quote!((a, b) = (b, a))).unwrap();
        assert_eq!(env.get("a"), Some(&Value::Int(2)));
        assert_eq!(env.get("b"), Some(&Value::Int(1)));
    }
}
