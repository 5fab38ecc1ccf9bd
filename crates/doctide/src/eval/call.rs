//! Function call evaluation

use crate::{Environment, EvalContext, EvalError, Value};

use super::function::call_value;
use super::Evaluate;

impl Evaluate for syn::ExprCall {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let callee = self.func.eval(env, ctx)?;
        let args = self
            .args
            .iter()
            .map(|arg| arg.eval(env, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        call_value(&callee, args, env, ctx)
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
    fn test_recursive_function() {
        let src = "fn fact(n: i64) -> i64 { if n <= 1 { 1 } else { n * fact(n - 1) } } fact(10)";
        assert_eq!(run(src).unwrap(), Value::Int(3628800));
    }

    #[test]
    fn test_callee_cannot_see_caller_locals() {
        let src = "fn peek() -> i64 { hidden } fn outer() -> i64 { let hidden = 1; peek() } outer()";
        assert_eq!(run(src).unwrap_err().kind(), "UndefinedVariable");
    }

    #[test]
    fn test_closure_captures_locals() {
        let src = "let add = { let k = 10; move |x| x + k }; add(5)";
        assert_eq!(run(src).unwrap(), Value::Int(15));
    }

    #[test]
    fn test_tuple_struct_constructor() {
        let src = "struct Meters(f64); let m = Meters(2.5); m.0";
        assert_eq!(run(src).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn test_builtin_constructors() {
        assert_eq!(run("Some(1)").unwrap(), Value::some(Value::Int(1)));
        assert_eq!(run("String::from(\"a\")").unwrap(), Value::string("a"));
    }

    #[test]
    fn test_stack_overflow_is_reported() {
        let src = "{ fn forever(n: i64) -> i64 { forever(n + 1) } forever(0) }";
        let block: syn::Block = syn::parse_str(src).unwrap();
        let mut env = Environment::with_max_call_depth(32);
        let err = eval_stmts(&block.stmts, &mut env, &EvalContext::new()).unwrap_err();
        assert_eq!(err.kind(), "StackOverflow");
    }
}
