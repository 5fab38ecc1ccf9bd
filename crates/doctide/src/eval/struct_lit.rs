//! Struct literal evaluation

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::type_name;
use crate::value::{StructValue, TypeDef};
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprStruct {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let def = lookup_type(&self.path, env)?;

        let mut given: IndexMap<String, Value> = IndexMap::new();
        for field in &self.fields {
            let name = super::field::member_name(&field.member);
            if !def.fields.contains(&name) {
                return Err(EvalError::UndefinedField {
                    type_name: def.name.clone(),
                    field: name,
                });
            }
            let value = field.expr.eval(env, ctx)?;
            given.insert(name, value);
        }

        // `..base` fills whatever was not given explicitly
        let base = match &self.rest {
            Some(rest) => match rest.eval(env, ctx)? {
                Value::Struct(s) if s.type_name == def.name => Some(s),
                other => {
                    return Err(EvalError::type_error(format!(
                        "functional update base must be `{}`, found `{}`",
                        def.name,
                        type_name(&other)
                    )))
                }
            },
            None => None,
        };

        let mut instance = StructValue::new(def.name.clone());
        for name in &def.fields {
            let value = match given.swap_remove(name) {
                Some(value) => value,
                None => base
                    .as_ref()
                    .and_then(|b| b.get(name).cloned())
                    .ok_or_else(|| {
                        EvalError::type_error(format!(
                            "missing field `{}` in initializer of `{}`",
                            name, def.name
                        ))
                    })?,
            };
            instance.fields.insert(name.clone(), value);
        }
        Ok(Value::structure(instance))
    }
}

/// Find the struct definition named by `path` (`Point`, `Self`, `shapes::Point`).
pub fn lookup_type(path: &syn::Path, env: &Environment) -> Result<Arc<TypeDef>, EvalError> {
    let name = super::path::last_segment(path);
    match env.get(&name) {
        Some(Value::Type(def)) => Ok(Arc::clone(def)),
        _ => Err(EvalError::UndefinedVariable { name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_point() -> Environment {
        let mut env = Environment::new();
        env.define(
            "Point",
            Value::Type(Arc::new(TypeDef {
                name: "Point".to_string(),
                fields: vec!["x".to_string(), "y".to_string()],
                is_tuple_struct: false,
            })),
        );
        env
    }

    #[test]
    fn test_fields_follow_definition_order() {
        let mut env = env_with_point();
        let expr: syn::Expr = syn::parse_quote!(Point { y: 2, x: 1 });
        let value = expr.eval(&mut env, &EvalContext::new()).unwrap();
        assert_eq!(format!("{:?}", value), "Point { x: 1, y: 2 }");
    }

    #[test]
    fn test_update_syntax() {
        let mut env = env_with_point();
        let ctx = EvalContext::new();
        let base: syn::Expr = syn::parse_quote!(Point { x: 1, y: 2 });
        let base = base.eval(&mut env, &ctx).unwrap();
        env.define("p", base);
        let expr: syn::Expr = syn::parse_quote!(Point { x: 5, ..p });
        assert_eq!(
            format!("{:?}", expr.eval(&mut env, &ctx).unwrap()),
            "Point { x: 5, y: 2 }"
        );
    }

    #[test]
    fn test_missing_field() {
        let mut env = env_with_point();
        let expr: syn::Expr = syn::parse_quote!(Point { x: 1 });
        let err = expr.eval(&mut env, &EvalContext::new()).unwrap_err();
        assert_eq!(err.to_string(), "missing field `y` in initializer of `Point`");
    }
}
