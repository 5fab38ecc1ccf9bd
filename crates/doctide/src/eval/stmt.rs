//! Statement evaluation

use crate::{Environment, EvalContext, EvalError, Value};

use super::item::{eval_item, is_hoisted};
use super::local::eval_local;
use super::Evaluate;

/// Evaluate a statement.
pub fn eval_stmt(
    stmt: &syn::Stmt,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    if ctx.is_interrupted() {
        return Err(EvalError::Interrupted);
    }

    match stmt {
        // Expression without semicolon: value is returned
        syn::Stmt::Expr(expr, None) => expr.eval(env, ctx),

        // Expression with semicolon: evaluate for side effects, return unit
        syn::Stmt::Expr(expr, Some(_)) => {
            expr.eval(env, ctx)?;
            Ok(Value::Unit)
        }

        // Let binding
        syn::Stmt::Local(local) => {
            eval_local(local, env, ctx)?;
            Ok(Value::Unit)
        }

        // Item (fn, struct, etc.) in block
        syn::Stmt::Item(item) => {
            eval_item(item, env, ctx)?;
            Ok(Value::Unit)
        }

        // Macro statement: `println!(...);`
        syn::Stmt::Macro(stmt_macro) => {
            let value = super::macros::eval_macro(&stmt_macro.mac, env, ctx)?;
            Ok(if stmt_macro.semi_token.is_some() {
                Value::Unit
            } else {
                value
            })
        }
    }
}

/// Evaluate statements in the current scope, returning the block's value.
///
/// Function, struct and impl items are defined before any statement runs,
/// so code may call a function declared further down.
pub fn eval_stmts(
    stmts: &[syn::Stmt],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    for stmt in stmts {
        if let syn::Stmt::Item(item) = stmt {
            if is_hoisted(item) {
                eval_item(item, env, ctx)?;
            }
        }
    }

    let mut last_value = Value::Unit;
    for stmt in stmts {
        last_value = match stmt {
            syn::Stmt::Item(item) if is_hoisted(item) => Value::Unit,
            _ => eval_stmt(stmt, env, ctx)?,
        };
    }
    Ok(last_value)
}
