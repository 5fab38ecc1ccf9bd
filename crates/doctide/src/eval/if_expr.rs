//! If expression and block evaluation

use super::Evaluate;
use crate::eval::pattern::{apply_bindings, match_pattern};
use crate::{Environment, EvalContext, EvalError, Value};

impl Evaluate for syn::ExprIf {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // `if let PAT = EXPR` binds for the then-branch only
        if let syn::Expr::Let(let_expr) = self.cond.as_ref() {
            let scrutinee = let_expr.expr.eval(env, ctx)?;
            if let Some(bindings) = match_pattern(&let_expr.pat, &scrutinee)? {
                let mut scope = env.scope_guard();
                apply_bindings(&mut scope, bindings);
                return eval_block(&self.then_branch, &mut scope, ctx);
            }
            return self.eval_else(env, ctx);
        }

        if super::eval_condition(&self.cond, "if", env, ctx)? {
            eval_block(&self.then_branch, env, ctx)
        } else {
            self.eval_else(env, ctx)
        }
    }
}

trait ElseBranch {
    fn eval_else(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError>;
}

impl ElseBranch for syn::ExprIf {
    fn eval_else(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        match &self.else_branch {
            Some((_, else_branch)) => else_branch.eval(env, ctx),
            // No else branch, return unit
            None => Ok(Value::Unit),
        }
    }
}

/// Evaluate a block in a fresh scope, returning the value of the last
/// expression.
pub fn eval_block(
    block: &syn::Block,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let mut scope = env.scope_guard();
    super::stmt::eval_stmts(&block.stmts, &mut scope, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(env: &mut Environment, expr: syn::Expr) -> Result<Value, EvalError> {
        expr.eval(env, &EvalContext::new())
    }

    #[test]
    fn test_if_else_chain() {
        let mut env = Environment::new();
        env.define("n", Value::Int(0));
        let expr: syn::Expr =
            syn::parse_quote!(if n < 0 { "neg" } else if n == 0 { "zero" } else { "pos" });
        assert_eq!(eval(&mut env, expr).unwrap(), Value::string("zero"));
    }

    #[test]
    fn test_if_let_scopes_bindings() {
        let mut env = Environment::new();
        env.define("opt", Value::some(Value::Int(4)));
        let expr: syn::Expr = syn::parse_quote!(if let Some(x) = opt { x * 2 } else { 0 });
        assert_eq!(eval(&mut env, expr).unwrap(), Value::Int(8));
        assert!(!env.contains("x"));
    }

    #[test]
    fn test_if_without_else_is_unit() {
        let mut env = Environment::new();
        let expr: syn::Expr = syn::parse_quote!(if false { 1 });
        assert_eq!(eval(&mut env, expr).unwrap(), Value::Unit);
    }

    #[test]
    fn test_block_scope_is_dropped() {
        let mut env = Environment::new();
        let expr: syn::Expr = syn::parse_quote!({
            let inner = 1;
            inner + 1
        });
        assert_eq!(eval(&mut env, expr).unwrap(), Value::Int(2));
        assert!(!env.contains("inner"));
    }
}
