//! # doctide
//!
//! Keeps the `>>>` examples in documentation honest.
//!
//! doctide finds interactive examples embedded in a text document, reformats
//! their source, runs them in order in one persistent session, and rewrites
//! each example's expected output to what the code actually prints.
//!
//! ```text
//! >>> let v = vec![3, 1, 2];
//! >>> v.iter().max()
//! Some(3)
//! ```
//!
//! ## Architecture
//!
//! - **Interpreter** ([`eval`], [`environment`], [`value`]): a tree-walking
//!   evaluator over the `syn` AST, so example source is plain Rust
//! - **Doctest engine** ([`doctest`]): scanning, normalizing, executing,
//!   reconciling and reassembling documents
//! - **CLI** ([`cli`]): `doctide [OPTIONS] <PATH>...`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod context;
pub mod doctest;
pub mod environment;
pub mod error;
pub mod eval;
pub mod value;

// Re-export main types
pub use config::{ConfigError, Options};
pub use context::{EvalContext, Interrupt};
pub use doctest::{
    regenerate, update, verify, Execution, Mode, Outcome, RegenError, Regenerator, Session,
};
pub use environment::{Binding, BindingMode, Environment, ScopeGuard};
pub use error::{EnvironmentError, EvalError};
pub use eval::{eval_block, eval_expr, ControlFlow, Evaluate};
pub use value::{
    BuiltinFn, BuiltinFnPtr, ClosureValue, FunctionValue, FutureValue, HashableValue, StructValue,
    Value,
};

/// doctide version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
