//! Array expression evaluation (`[a, b]`, `[x; n]`)

use crate::error::type_name;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprArray {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let items = self
            .elems
            .iter()
            .map(|e| e.eval(env, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::vec(items))
    }
}

impl Evaluate for syn::ExprRepeat {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let item = self.expr.eval(env, ctx)?;
        let len = self.len.eval(env, ctx)?;
        repeat(item, &len)
    }
}

/// `[item; len]` and `vec![item; len]`.
pub fn repeat(item: Value, len: &Value) -> Result<Value, EvalError> {
    let count = len.as_usize().ok_or_else(|| {
        EvalError::type_error(format!(
            "repeat count must be a non-negative integer, found `{}`",
            type_name(len)
        ))
    })?;
    Ok(Value::vec(vec![item; count]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_forms() {
        let ctx = EvalContext::new();
        let mut env = Environment::new();
        let list: syn::Expr = syn::parse_quote!([1, 2, 3]);
        assert_eq!(
            list.eval(&mut env, &ctx).unwrap(),
            Value::from(vec![1i64, 2, 3])
        );
        let zeros: syn::Expr = syn::parse_quote!([0; 2]);
        assert_eq!(
            zeros.eval(&mut env, &ctx).unwrap(),
            Value::from(vec![0i64, 0])
        );
    }
}
