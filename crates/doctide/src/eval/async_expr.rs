//! `async` blocks and `.await`

use std::sync::Arc;

use crate::error::type_name;
use crate::value::{FutureState, FutureValue};
use crate::{BindingMode, Environment, EvalContext, EvalError, Value};

use super::function::catch_return;
use super::Evaluate;

impl Evaluate for syn::ExprAsync {
    fn eval(&self, env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        // ALLOW: the block never leaves the evaluating thread
        #[allow(clippy::arc_with_non_send_sync)]
        let body = Arc::new(self.block.clone());
        Ok(Value::Future(FutureValue::deferred(
            "async block",
            body,
            env.local_bindings(),
        )))
    }
}

impl Evaluate for syn::ExprAwait {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        match self.base.eval(env, ctx)? {
            Value::Future(future) => await_future(&future, env, ctx),
            other => Err(EvalError::type_error(format!(
                "`{}` is not a future",
                type_name(&other)
            ))),
        }
    }
}

/// Resolve a future, consuming it.
pub fn await_future(
    future: &FutureValue,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    tracing::trace!(future = %future.label, "await");

    match future.take() {
        FutureState::Native(native) => match &ctx.driver {
            Some(driver) => driver.block_on(native, &ctx.interrupt, ctx.await_timeout),
            None => Err(EvalError::Future {
                message: format!("no async runtime available to drive `{}`", future.label),
            }),
        },
        FutureState::Deferred { body, captures } => {
            let mut call = env.call_guard()?;
            for (name, value) in captures {
                call.define_with_mode(name, value, BindingMode::Mutable);
            }
            catch_return(super::eval_block(&body, &mut call, ctx))
        }
        FutureState::Taken => Err(EvalError::Future {
            message: format!("`{}` was already awaited", future.label),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Driver;
    use crate::eval::stmt::eval_stmts;

    fn run_with(src: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        let mut env = Environment::with_prelude();
        eval_stmts(&block.stmts, &mut env, ctx)
    }

    #[test]
    fn test_async_block_is_lazy() {
        let ctx = EvalContext::new();
        let src = "let mut hit = 0; let fut = async { 7 }; hit";
        assert_eq!(run_with(src, &ctx).unwrap(), Value::Int(0));
        assert_eq!(run_with("async { 1 + 1 }.await", &ctx).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_async_fn_sees_arguments() {
        let ctx = EvalContext::new();
        let src = "async fn double(x: i64) -> i64 { x * 2 } double(21).await";
        assert_eq!(run_with(src, &ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_native_future_needs_driver() {
        let err = run_with("ready(1).await", &EvalContext::new()).unwrap_err();
        assert_eq!(err.kind(), "FutureError");
    }

    #[test]
    fn test_native_futures_on_driver() {
        let ctx = EvalContext::new().with_driver(Arc::new(Driver::new().unwrap()));
        assert_eq!(run_with("ready(5).await", &ctx).unwrap(), Value::Int(5));
        assert_eq!(run_with("sleep(1).await", &ctx).unwrap(), Value::Unit);
    }

    #[test]
    fn test_await_twice_fails() {
        let ctx = EvalContext::new();
        let err = run_with("let f = async { 1 }; let g = f.clone(); f.await; g.await", &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("already awaited"));
    }

    #[test]
    fn test_await_non_future() {
        assert_eq!(
            run_with("let n = 3; n.await", &EvalContext::new()).unwrap_err().kind(),
            "TypeError"
        );
    }
}
