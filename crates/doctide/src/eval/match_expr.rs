//! Match expression evaluation

use super::pattern::{apply_bindings, match_pattern};
use super::Evaluate;
use crate::{Environment, EvalContext, EvalError, Value};

impl Evaluate for syn::ExprMatch {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let scrutinee = self.expr.eval(env, ctx)?;

        for arm in &self.arms {
            let Some(bindings) = match_pattern(&arm.pat, &scrutinee)? else {
                continue;
            };

            let mut scope = env.scope_guard();
            apply_bindings(&mut scope, bindings);

            if let Some((_, guard)) = &arm.guard {
                if !super::eval_condition(guard, "match guard", &mut scope, ctx)? {
                    continue;
                }
            }

            return arm.body.eval(&mut scope, ctx);
        }

        Err(EvalError::NonExhaustiveMatch {
            value: format!("{:?}", scrutinee),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(env: &mut Environment, expr: syn::Expr) -> Result<Value, EvalError> {
        expr.eval(env, &EvalContext::new())
    }

    #[test]
    fn test_match_with_guard() {
        let mut env = Environment::new();
        env.define("n", Value::Int(7));
        let expr: syn::Expr = syn::parse_quote!(match n {
            0 => "zero",
            x if x % 2 == 0 => "even",
            _ => "odd",
        });
        assert_eq!(eval(&mut env, expr).unwrap(), Value::string("odd"));
    }

    #[test]
    fn test_match_destructures_tuple() {
        let mut env = Environment::new();
        env.define("pair", Value::tuple(vec![Value::Int(1), Value::Int(2)]));
        let expr: syn::Expr = syn::parse_quote!(match pair {
            (a, b) => a + b,
        });
        assert_eq!(eval(&mut env, expr).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_non_exhaustive() {
        let mut env = Environment::new();
        let expr: syn::Expr = syn::parse_quote!(match 3 {
            1 => 'a',
        });
        assert_eq!(
            eval(&mut env, expr).unwrap_err().to_string(),
            "non-exhaustive patterns: `3` not covered"
        );
    }
}
