//! Range expression evaluation

use crate::error::type_name;
use crate::value::RangeValue;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprRange {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let mut bound = |expr: &Option<Box<syn::Expr>>| -> Result<Option<i64>, EvalError> {
            let Some(expr) = expr else {
                return Ok(None);
            };
            match expr.eval(env, ctx)? {
                Value::Int(n) => Ok(Some(n)),
                other => Err(EvalError::type_error(format!(
                    "range bounds must be integers, found `{}`",
                    type_name(&other)
                ))),
            }
        };
        let start = bound(&self.start)?;
        let end = bound(&self.end)?;
        Ok(Value::Range(RangeValue {
            start,
            end,
            inclusive: matches!(self.limits, syn::RangeLimits::Closed(_)),
        }))
    }
}
