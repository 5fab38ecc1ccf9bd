//! Item evaluation (`fn`, `struct`, `impl`, `const`, `static`, `use`)

use std::sync::Arc;

use crate::value::TypeDef;
use crate::{BindingMode, Environment, EvalContext, EvalError, Value};

use super::function::{function_from_sig, receiver_of};
use super::Evaluate;

/// Items defined before the statements of their block run.
pub fn is_hoisted(item: &syn::Item) -> bool {
    matches!(
        item,
        syn::Item::Fn(_)
            | syn::Item::Struct(_)
            | syn::Item::Impl(_)
            | syn::Item::Use(_)
            | syn::Item::Type(_)
            | syn::Item::Trait(_)
    )
}

/// Evaluate an item, defining whatever it declares in the current scope.
pub fn eval_item(
    item: &syn::Item,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    match item {
        syn::Item::Fn(item_fn) => {
            env.define_function(function_from_sig(&item_fn.sig, &item_fn.block));
            Ok(Value::Unit)
        }

        syn::Item::Const(item_const) => {
            let value = item_const.expr.eval(env, ctx)?;
            let value = super::local::coerce(value, &item_const.ty);
            env.define(item_const.ident.to_string(), value);
            Ok(Value::Unit)
        }

        syn::Item::Static(item_static) => {
            let value = item_static.expr.eval(env, ctx)?;
            let mode = match item_static.mutability {
                syn::StaticMutability::Mut(_) => BindingMode::Mutable,
                _ => BindingMode::Immutable,
            };
            env.define_with_mode(item_static.ident.to_string(), value, mode);
            Ok(Value::Unit)
        }

        // Struct definitions register a type used by literals and patterns
        syn::Item::Struct(item_struct) => {
            let (fields, is_tuple_struct) = match &item_struct.fields {
                syn::Fields::Named(named) => (
                    named
                        .named
                        .iter()
                        .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
                        .collect(),
                    false,
                ),
                syn::Fields::Unnamed(unnamed) => (
                    (0..unnamed.unnamed.len()).map(|i| i.to_string()).collect(),
                    true,
                ),
                syn::Fields::Unit => (Vec::new(), false),
            };
            let name = item_struct.ident.to_string();
            env.define(
                name.clone(),
                Value::Type(Arc::new(TypeDef {
                    name,
                    fields,
                    is_tuple_struct,
                })),
            );
            Ok(Value::Unit)
        }

        // Impl blocks register `Type::method` bindings
        syn::Item::Impl(item_impl) => {
            let syn::Type::Path(self_ty) = item_impl.self_ty.as_ref() else {
                return Err(EvalError::UnsupportedExpr {
                    kind: format!("impl for `{}`", super::source_text(&item_impl.self_ty)),
                });
            };
            let type_name = super::path::last_segment(&self_ty.path);
            for impl_item in &item_impl.items {
                match impl_item {
                    syn::ImplItem::Fn(method) => {
                        let func = function_from_sig(&method.sig, &method.block)
                            .in_impl(type_name.clone(), receiver_of(&method.sig));
                        let binding = format!("{}::{}", type_name, func.name);
                        env.define(binding, Value::Function(Arc::new(func)));
                    }
                    syn::ImplItem::Const(item_const) => {
                        let value = item_const.expr.eval(env, ctx)?;
                        env.define(format!("{}::{}", type_name, item_const.ident), value);
                    }
                    _ => {}
                }
            }
            Ok(Value::Unit)
        }

        // No runtime effect
        syn::Item::Use(_) | syn::Item::Type(_) | syn::Item::Trait(_) => Ok(Value::Unit),

        syn::Item::Enum(_) => Err(EvalError::UnsupportedExpr {
            kind: "enum definition".to_string(),
        }),

        syn::Item::Mod(_) => Err(EvalError::UnsupportedExpr {
            kind: "module definition".to_string(),
        }),

        other => Err(EvalError::UnsupportedExpr {
            kind: format!("item `{}`", super::source_text(other)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, env: &mut Environment) -> Result<Value, EvalError> {
        let item: syn::Item = syn::parse_str(source).unwrap();
        eval_item(&item, env, &EvalContext::new())
    }

    #[test]
    fn test_eval_fn_item() {
        let mut env = Environment::new();
        eval("fn test() -> i64 { 42 }", &mut env).unwrap();
        assert!(matches!(env.get("test"), Some(Value::Function(_))));
    }

    #[test]
    fn test_eval_const_item() {
        let mut env = Environment::new();
        eval("const LIMIT: i64 = 4 * 25;", &mut env).unwrap();
        assert_eq!(env.get("LIMIT"), Some(&Value::Int(100)));
    }

    #[test]
    fn test_struct_registers_type() {
        let mut env = Environment::new();
        eval("struct Point { x: i64, y: i64 }", &mut env).unwrap();
        match env.get("Point") {
            Some(Value::Type(def)) => assert_eq!(def.fields, vec!["x", "y"]),
            other => panic!("expected type, got {other:?}"),
        }
    }

    #[test]
    fn test_impl_registers_methods() {
        let mut env = Environment::new();
        eval("struct Counter { n: i64 }", &mut env).unwrap();
        eval(
            "impl Counter { fn new() -> Self { Counter { n: 0 } } fn bump(&mut self) { self.n += 1; } }",
            &mut env,
        )
        .unwrap();
        assert!(env.contains("Counter::new"));
        assert!(env.contains("Counter::bump"));
    }

    #[test]
    fn test_enum_unsupported() {
        let mut env = Environment::new();
        let err = eval("enum E { A }", &mut env).unwrap_err();
        assert_eq!(err.kind(), "Unsupported");
    }
}
