//! Return and `?` evaluation

use crate::error::type_name;
use crate::eval::control::ControlFlow;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprReturn {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let value = if let Some(expr) = &self.expr {
            expr.eval(env, ctx)?
        } else {
            Value::Unit
        };

        // Return is implemented as a control flow error
        Err(EvalError::ControlFlow(ControlFlow::Return { value }))
    }
}

impl Evaluate for syn::ExprTry {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let operand = self.expr.eval(env, ctx)?;

        // The early-exit value, or the unwrapped success value
        let residual = match &operand {
            Value::Result(result) => match result.as_ref() {
                Ok(value) => return Ok(value.clone()),
                Err(payload) => Value::err(payload.clone()),
            },
            Value::Option(option) => match option.as_ref() {
                Some(value) => return Ok(value.clone()),
                None => Value::none(),
            },
            other => {
                return Err(EvalError::type_error(format!(
                    "the `?` operator can only be applied to values of type `Result` or `Option`, found `{}`",
                    type_name(other)
                )))
            }
        };

        if env.call_depth() > 0 {
            return Err(EvalError::ControlFlow(ControlFlow::Return { value: residual }));
        }

        // Outside any function the error surfaces as the example's failure
        let message = match &residual {
            Value::Result(result) => match result.as_ref() {
                Err(payload) => format!("{:?}", payload),
                Ok(_) => String::new(),
            },
            _ => "None".to_string(),
        };
        Err(EvalError::Propagated {
            message,
            value: residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::stmt::eval_stmts;

    fn run(src: &str) -> Result<Value, EvalError> {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        let mut env = Environment::with_prelude();
        eval_stmts(&block.stmts, &mut env, &EvalContext::new())
    }

    #[test]
    fn test_return_with_value() {
        let expr: syn::Expr = syn::parse_str("return 42").unwrap();
        let mut env = Environment::new();
        let result = expr.eval(&mut env, &EvalContext::default());
        assert!(matches!(
            result,
            Err(EvalError::ControlFlow(ControlFlow::Return { value: Value::Int(42) }))
        ));
    }

    #[test]
    fn test_return_without_value() {
        let expr: syn::Expr = syn::parse_str("return").unwrap();
        let mut env = Environment::new();
        let result = expr.eval(&mut env, &EvalContext::default());
        assert!(matches!(
            result,
            Err(EvalError::ControlFlow(ControlFlow::Return { value: Value::Unit }))
        ));
    }

    #[test]
    fn test_try_unwraps_ok_and_some() {
        assert_eq!(run("Ok::<i64, String>(3)?").unwrap(), Value::Int(3));
        assert_eq!(run("Some(4)?").unwrap(), Value::Int(4));
    }

    #[test]
    fn test_try_returns_err_from_function() {
        let src = r#"
            fn half(n: i64) -> Result<i64, String> {
                if n % 2 == 1 { return Err(String::from("odd")); }
                Ok(n / 2)
            }
            fn quarter(n: i64) -> Result<i64, String> {
                let h = half(n)?;
                half(h)
            }
            quarter(6)
        "#;
        assert_eq!(run(src).unwrap(), Value::err(Value::string("odd")));
    }

    #[test]
    fn test_try_at_top_level_fails_the_example() {
        let err = run(r#"let x: Result<i64, String> = Err(String::from("bad")); x?"#).unwrap_err();
        assert_eq!(err.kind(), "Err");
        assert_eq!(err.to_string(), "\"bad\"");
    }

    #[test]
    fn test_try_on_non_result() {
        assert_eq!(run("5?").unwrap_err().kind(), "TypeError");
    }
}
