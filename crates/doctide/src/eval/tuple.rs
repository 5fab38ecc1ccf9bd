//! Tuple expression evaluation

use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprTuple {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // `()` is the unit value, not an empty tuple
        if self.elems.is_empty() {
            return Ok(Value::Unit);
        }
        let items = self
            .elems
            .iter()
            .map(|e| e.eval(env, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::tuple(items))
    }
}
