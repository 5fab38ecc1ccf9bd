//! Expression evaluation

pub mod array;
pub mod assign;
pub mod async_expr;
pub mod binary;
pub mod call;
pub mod control;
pub mod field;
pub mod format;
pub mod function;
pub mod if_expr;
pub mod index;
pub mod item;
pub mod literal;
pub mod local;
pub mod loops;
pub mod macros;
pub mod match_expr;
pub mod method;
pub mod path;
pub mod pattern;
pub mod range;
pub mod return_expr;
pub mod stmt;
pub mod struct_lit;
pub mod tuple;
pub mod unary;

use crate::{Environment, EvalContext, EvalError, Value};

/// Trait for evaluating AST nodes to values.
///
/// This is the core abstraction for the tree-walking interpreter.
/// Each `syn` expression type implements this trait.
pub trait Evaluate {
    /// Evaluate this AST node in the given environment.
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError>;
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::Expr {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // Check for interruption before each expression
        if ctx.is_interrupted() {
            return Err(EvalError::Interrupted);
        }
        if ctx.trace {
            tracing::trace!(kind = expr_kind_name(self), "eval");
        }

        match self {
            // Basic expressions
            syn::Expr::Lit(expr) => expr.eval(env, ctx),
            syn::Expr::Path(expr) => expr.eval(env, ctx),
            syn::Expr::Unary(expr) => expr.eval(env, ctx),
            syn::Expr::Binary(expr) => expr.eval(env, ctx),
            syn::Expr::Cast(expr) => expr.eval(env, ctx),
            syn::Expr::Reference(expr) => expr.expr.eval(env, ctx),

            // Assignment
            syn::Expr::Assign(expr) => expr.eval(env, ctx),

            // Control flow
            syn::Expr::If(expr) => expr.eval(env, ctx),
            syn::Expr::Match(expr) => expr.eval(env, ctx),
            syn::Expr::Loop(expr) => expr.eval(env, ctx),
            syn::Expr::While(expr) => expr.eval(env, ctx),
            syn::Expr::ForLoop(expr) => expr.eval(env, ctx),
            syn::Expr::Break(expr) => expr.eval(env, ctx),
            syn::Expr::Continue(expr) => expr.eval(env, ctx),
            syn::Expr::Return(expr) => expr.eval(env, ctx),
            syn::Expr::Try(expr) => expr.eval(env, ctx),

            // Functions
            syn::Expr::Call(expr) => expr.eval(env, ctx),
            syn::Expr::MethodCall(expr) => expr.eval(env, ctx),
            syn::Expr::Closure(expr) => expr.eval(env, ctx),
            syn::Expr::Macro(expr) => macros::eval_macro(&expr.mac, env, ctx),

            // Async
            syn::Expr::Async(expr) => expr.eval(env, ctx),
            syn::Expr::Await(expr) => expr.eval(env, ctx),

            // Compound data
            syn::Expr::Array(expr) => expr.eval(env, ctx),
            syn::Expr::Repeat(expr) => expr.eval(env, ctx),
            syn::Expr::Tuple(expr) => expr.eval(env, ctx),
            syn::Expr::Index(expr) => expr.eval(env, ctx),
            syn::Expr::Range(expr) => expr.eval(env, ctx),
            syn::Expr::Field(expr) => expr.eval(env, ctx),
            syn::Expr::Struct(expr) => expr.eval(env, ctx),

            // Blocks
            syn::Expr::Block(expr) => {
                let label = expr.label.as_ref().map(|l| l.name.ident.to_string());
                loops::eval_labeled_block(&expr.block, label.as_deref(), env, ctx)
            }
            syn::Expr::Unsafe(expr) => eval_block(&expr.block, env, ctx),

            // Parenthesized expressions - just unwrap
            syn::Expr::Paren(expr) => expr.expr.eval(env, ctx),

            // Group expressions (for precedence) - just unwrap
            syn::Expr::Group(expr) => expr.expr.eval(env, ctx),

            // Everything else
            _ => Err(EvalError::UnsupportedExpr {
                kind: expr_kind_name(self).to_string(),
            }),
        }
    }
}

/// Get a human-readable name for an expression kind.
pub fn expr_kind_name(expr: &syn::Expr) -> &'static str {
    match expr {
        syn::Expr::Array(_) => "array",
        syn::Expr::Assign(_) => "assignment",
        syn::Expr::Async(_) => "async block",
        syn::Expr::Await(_) => "await",
        syn::Expr::Binary(_) => "binary operation",
        syn::Expr::Block(_) => "block",
        syn::Expr::Break(_) => "break",
        syn::Expr::Call(_) => "function call",
        syn::Expr::Cast(_) => "cast",
        syn::Expr::Closure(_) => "closure",
        syn::Expr::Const(_) => "const block",
        syn::Expr::Continue(_) => "continue",
        syn::Expr::Field(_) => "field access",
        syn::Expr::ForLoop(_) => "for loop",
        syn::Expr::Group(_) => "group",
        syn::Expr::If(_) => "if",
        syn::Expr::Index(_) => "index",
        syn::Expr::Infer(_) => "infer",
        syn::Expr::Let(_) => "let guard",
        syn::Expr::Lit(_) => "literal",
        syn::Expr::Loop(_) => "loop",
        syn::Expr::Macro(_) => "macro invocation",
        syn::Expr::Match(_) => "match",
        syn::Expr::MethodCall(_) => "method call",
        syn::Expr::Paren(_) => "parenthesized",
        syn::Expr::Path(_) => "path",
        syn::Expr::Range(_) => "range",
        syn::Expr::Reference(_) => "reference",
        syn::Expr::Repeat(_) => "repeat",
        syn::Expr::Return(_) => "return",
        syn::Expr::Struct(_) => "struct literal",
        syn::Expr::Try(_) => "try",
        syn::Expr::TryBlock(_) => "try block",
        syn::Expr::Tuple(_) => "tuple",
        syn::Expr::Unary(_) => "unary operation",
        syn::Expr::Unsafe(_) => "unsafe block",
        syn::Expr::Verbatim(_) => "verbatim",
        syn::Expr::While(_) => "while",
        syn::Expr::Yield(_) => "yield",
        _ => "unknown",
    }
}

/// Source text of a syntax node, as `stringify!` would print it.
pub(crate) fn source_text(node: &impl quote::ToTokens) -> String {
    node.to_token_stream().to_string()
}

// ═══════════════════════════════════════════════════════════════════════
// Convenience Functions
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate an expression (convenience wrapper).
pub fn eval_expr(
    expr: &syn::Expr,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    expr.eval(env, ctx)
}

/// Evaluate an expression that must produce a `bool`.
pub(crate) fn eval_condition(
    expr: &syn::Expr,
    what: &str,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<bool, EvalError> {
    match expr.eval(env, ctx)? {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::type_error(format!(
            "expected `bool` in {} condition, found `{}`",
            what,
            crate::error::type_name(&other)
        ))),
    }
}

// Re-export for use by other modules
pub use control::ControlFlow;
pub use if_expr::eval_block;
pub use pattern::{apply_bindings, match_pattern};
