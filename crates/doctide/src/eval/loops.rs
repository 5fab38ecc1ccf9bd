//! Loop expression evaluation

use crate::error::type_name;
use crate::eval::control::ControlFlow;
use crate::eval::pattern::{apply_bindings, match_pattern};
use crate::{Environment, EvalContext, EvalError, Value};

use super::if_expr::eval_block;
use super::Evaluate;

/// What a loop does after one run of its body.
enum LoopStep {
    /// Keep iterating
    Next,
    /// Leave the loop with this value
    Exit(Value),
}

/// Interpret the outcome of a loop body against the loop's label.
fn after_body(result: Result<Value, EvalError>, label: Option<&str>) -> Result<LoopStep, EvalError> {
    match result {
        Ok(_) => Ok(LoopStep::Next),
        Err(EvalError::ControlFlow(cf)) if cf.matches_label(label) => match cf {
            ControlFlow::Break { value, .. } => Ok(LoopStep::Exit(value)),
            _ => Ok(LoopStep::Next),
        },
        Err(e) => Err(e),
    }
}

fn label_of(label: &Option<syn::Label>) -> Option<String> {
    label.as_ref().map(|l| l.name.ident.to_string())
}

// ═══════════════════════════════════════════════════════════════════════
// loop expression
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprLoop {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let label = label_of(&self.label);

        loop {
            if ctx.is_interrupted() {
                return Err(EvalError::Interrupted);
            }
            if let LoopStep::Exit(value) = after_body(eval_block(&self.body, env, ctx), label.as_deref())? {
                return Ok(value);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// while / while let
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprWhile {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let label = label_of(&self.label);

        loop {
            if ctx.is_interrupted() {
                return Err(EvalError::Interrupted);
            }

            let result = if let syn::Expr::Let(let_expr) = self.cond.as_ref() {
                let scrutinee = let_expr.expr.eval(env, ctx)?;
                let Some(bindings) = match_pattern(&let_expr.pat, &scrutinee)? else {
                    return Ok(Value::Unit);
                };
                let mut scope = env.scope_guard();
                apply_bindings(&mut scope, bindings);
                eval_block(&self.body, &mut scope, ctx)
            } else {
                if !super::eval_condition(&self.cond, "while", env, ctx)? {
                    return Ok(Value::Unit);
                }
                eval_block(&self.body, env, ctx)
            };

            // while loops always evaluate to unit
            if let LoopStep::Exit(_) = after_body(result, label.as_deref())? {
                return Ok(Value::Unit);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// for expression
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprForLoop {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let label = label_of(&self.label);
        let iterable = self.expr.eval(env, ctx)?;

        for item in iterate(iterable)? {
            if ctx.is_interrupted() {
                return Err(EvalError::Interrupted);
            }

            let Some(bindings) = match_pattern(&self.pat, &item)? else {
                return Err(EvalError::RefutablePattern {
                    pattern: super::source_text(&self.pat),
                });
            };
            let mut scope = env.scope_guard();
            apply_bindings(&mut scope, bindings);
            let result = eval_block(&self.body, &mut scope, ctx);
            drop(scope);

            if let LoopStep::Exit(_) = after_body(result, label.as_deref())? {
                return Ok(Value::Unit);
            }
        }

        Ok(Value::Unit)
    }
}

/// Turn a value into the sequence a `for` loop walks.
///
/// Ranges without an upper bound count up forever.
pub fn iterate(value: Value) -> Result<Box<dyn Iterator<Item = Value>>, EvalError> {
    if let Value::Range(range) = &value {
        if range.end.is_none() {
            let start = range.start.unwrap_or(0);
            return Ok(Box::new((start..).map(Value::Int)));
        }
    }
    match value.to_items() {
        Some(items) => Ok(Box::new(items.into_iter())),
        None => Err(EvalError::type_error(format!(
            "`{}` is not an iterator",
            type_name(&value)
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// labeled blocks
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate a block expression, catching `break 'label value` for it.
pub fn eval_labeled_block(
    block: &syn::Block,
    label: Option<&str>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let result = eval_block(block, env, ctx);
    match (result, label) {
        (Err(EvalError::ControlFlow(cf)), Some(label)) if cf.matches_block_label(label) => {
            match cf {
                ControlFlow::Break { value, .. } => Ok(value),
                other => Err(EvalError::ControlFlow(other)),
            }
        }
        (result, _) => result,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// break / continue
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprBreak {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let label = self.label.as_ref().map(|l| l.ident.to_string());
        let value = match &self.expr {
            Some(expr) => expr.eval(env, ctx)?,
            None => Value::Unit,
        };
        Err(EvalError::ControlFlow(ControlFlow::Break { value, label }))
    }
}

impl Evaluate for syn::ExprContinue {
    fn eval(&self, _env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        let label = self.label.as_ref().map(|l| l.ident.to_string());
        Err(EvalError::ControlFlow(ControlFlow::Continue { label }))
    }
}
