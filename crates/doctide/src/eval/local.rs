//! Local binding (let statement) evaluation

use std::sync::Arc;

use indexmap::IndexMap;

use crate::eval::pattern::{apply_bindings, match_pattern};
use crate::value::HashableValue;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

/// Evaluate a local (let) binding.
///
/// Supports let-else patterns where the else block must diverge.
///
/// # Errors
///
/// Returns `RefutablePattern` if the pattern doesn't match and no else block.
/// Returns `NonDivergingLetElse` if the else block doesn't diverge.
pub fn eval_local(
    local: &syn::Local,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<(), EvalError> {
    let Some(init) = &local.init else {
        // `let x;` declares a binding assigned later
        let mut names = Vec::new();
        super::pattern::bound_names(&local.pat, &mut names);
        for name in names {
            env.define_with_mode(name, Value::Unit, crate::BindingMode::Mutable);
        }
        return Ok(());
    };

    let mut value = init.expr.eval(env, ctx)?;
    if let syn::Pat::Type(typed) = &local.pat {
        value = coerce(value, &typed.ty);
    }

    match match_pattern(&local.pat, &value)? {
        Some(bindings) => {
            apply_bindings(env, bindings);
            Ok(())
        }
        None => match &init.diverge {
            // If the else block produces a value, it didn't diverge
            Some((_, diverge)) => match diverge.eval(env, ctx) {
                Ok(_) => Err(EvalError::NonDivergingLetElse),
                Err(e) => Err(e),
            },
            None => Err(EvalError::RefutablePattern {
                pattern: super::source_text(&local.pat),
            }),
        },
    }
}

/// Apply the conversions a type annotation implies for `collect()` results.
///
/// Iterator adapters are eager and always yield vectors; an annotation of
/// `HashMap<..>` or `String` turns such a vector into the annotated type.
pub fn coerce(value: Value, ty: &syn::Type) -> Value {
    let syn::Type::Path(path) = ty else {
        return value;
    };
    let target = super::path::last_segment(&path.path);
    match (target.as_str(), &value) {
        ("HashMap" | "BTreeMap", Value::Vec(items)) => {
            let mut map = IndexMap::new();
            for item in items.iter() {
                match item {
                    Value::Tuple(pair) if pair.len() == 2 => match HashableValue::new(pair[0].clone()) {
                        Some(key) => {
                            map.insert(key, pair[1].clone());
                        }
                        None => return value,
                    },
                    _ => return value,
                }
            }
            Value::Map(Arc::new(map))
        }
        ("String", Value::Vec(items)) => {
            let mut out = String::new();
            for item in items.iter() {
                match item {
                    Value::Char(c) => out.push(*c),
                    Value::String(s) => out.push_str(s),
                    _ => return value,
                }
            }
            Value::string(out)
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::stmt::eval_stmts;

    fn run(src: &str) -> (Result<Value, EvalError>, Environment) {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        let mut env = Environment::with_prelude();
        let result = eval_stmts(&block.stmts, &mut env, &EvalContext::new());
        (result, env)
    }

    #[test]
    fn test_let_simple_binding() {
        let (result, env) = run("let x = 42;");
        result.unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_let_destructures() {
        let (result, env) = run("let (a, mut b) = (1, 2); b += a;");
        result.unwrap();
        assert_eq!(env.get("b"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_let_else() {
        let (result, _) = run("let Some(x) = None else { return 0; }; x");
        assert!(matches!(result, Err(EvalError::ControlFlow(_))));
        let (result, _) = run("let Some(x) = None else { 5 };");
        assert!(matches!(result, Err(EvalError::NonDivergingLetElse)));
    }

    #[test]
    fn test_refutable_pattern() {
        let (result, _) = run("let Some(x) = None;");
        assert_eq!(result.unwrap_err().kind(), "RefutablePattern");
    }

    #[test]
    fn test_annotation_shapes_collect() {
        let (result, env) = run(
            "let m: HashMap<&str, i64> = vec![(\"a\", 1)].into_iter().collect();",
        );
        result.unwrap();
        assert_eq!(format!("{:?}", env.get("m").unwrap()), "{\"a\": 1}");
    }
}
