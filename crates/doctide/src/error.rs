//! Error types for interpretation

use thiserror::Error;

use crate::eval::ControlFlow;
use crate::value::Value;

/// Errors raised by the runtime environment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvironmentError {
    /// Lookup or assignment of a name that is not bound
    #[error("cannot find value `{name}` in this scope")]
    UndefinedVariable {
        /// The missing name
        name: String,
    },

    /// Assignment to a binding declared without `mut`
    #[error("cannot assign twice to immutable variable `{name}`")]
    ImmutableBinding {
        /// The binding's name
        name: String,
    },

    /// Call depth exceeded
    #[error("reached the recursion limit: call depth {depth} exceeds {max}")]
    StackOverflow {
        /// Depth at which the call was rejected
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Errors raised while evaluating example code.
///
/// Everything except [`EvalError::Interrupted`] is a per-example failure that
/// ends up in the regenerated annotation. `Interrupted` aborts the run.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Reference to an unbound name
    #[error("cannot find value `{name}` in this scope")]
    UndefinedVariable {
        /// The missing name
        name: String,
    },

    /// Operation applied to a value of the wrong type
    #[error("{message}")]
    TypeError {
        /// Description of the mismatch
        message: String,
    },

    /// Wrong number of arguments
    #[error("function `{name}` takes {expected} argument{} but {got} {} supplied",
        if *expected == 1 { "" } else { "s" },
        if *got == 1 { "was" } else { "were" })]
    ArityMismatch {
        /// Callee name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Integer division or remainder by zero
    #[error("attempt to divide by zero")]
    DivisionByZero,

    /// Checked integer arithmetic overflowed
    #[error("attempt to compute `{op}` with overflow")]
    IntegerOverflow {
        /// The operator that overflowed
        op: String,
    },

    /// Index past the end of a sequence
    #[error("index out of bounds: the len is {len} but the index is {index}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Sequence length
        len: usize,
    },

    /// Field access on a value without that field
    #[error("no field `{field}` on type `{type_name}`")]
    UndefinedField {
        /// Type of the receiver
        type_name: String,
        /// Requested field
        field: String,
    },

    /// Method call that no receiver type understands
    #[error("no method named `{method}` found for `{type_name}`")]
    UndefinedMethod {
        /// Type of the receiver
        type_name: String,
        /// Requested method
        method: String,
    },

    /// `panic!`, failed assertions, `unwrap` on `None`, ...
    #[error("{message}")]
    Panic {
        /// Panic payload
        message: String,
    },

    /// A builtin function reported a failure
    #[error("{message}")]
    Builtin {
        /// Builtin name
        name: String,
        /// Failure description
        message: String,
    },

    /// `?` applied to an `Err` (or `None`) outside any function
    #[error("{message}")]
    Propagated {
        /// Display form of the error payload
        message: String,
        /// The payload itself, so `?` inside a function can return it
        value: Value,
    },

    /// Environment failure (immutability, recursion limit, ...)
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// `let` with a pattern that did not match and no `else`
    #[error("refutable pattern in local binding: `{pattern}` not covered")]
    RefutablePattern {
        /// Source form of the pattern
        pattern: String,
    },

    /// `let ... else` whose else block produced a value
    #[error("`else` clause of `let...else` does not diverge")]
    NonDivergingLetElse,

    /// `match` with no arm matching the scrutinee
    #[error("non-exhaustive patterns: `{value}` not covered")]
    NonExhaustiveMatch {
        /// Debug form of the scrutinee
        value: String,
    },

    /// Syntax the interpreter does not execute
    #[error("unsupported {kind}")]
    UnsupportedExpr {
        /// Description of the construct
        kind: String,
    },

    /// Assignment to something that is not a place
    #[error("invalid left-hand side of assignment: {kind}")]
    InvalidAssignTarget {
        /// Description of the target
        kind: String,
    },

    /// Example source that does not parse
    #[error("{message}")]
    Syntax {
        /// Parser message
        message: String,
    },

    /// An awaited future exceeded the configured timeout
    #[error("future did not complete within {millis} ms")]
    Timeout {
        /// Timeout in milliseconds
        millis: u128,
    },

    /// An awaited future failed or could not be driven
    #[error("{message}")]
    Future {
        /// Failure description
        message: String,
    },

    /// The run was cancelled
    #[error("interrupted")]
    Interrupted,

    /// `break`, `continue` or `return` escaping its construct
    #[error("`{}` outside of its enclosing construct", .0.keyword())]
    ControlFlow(ControlFlow),
}

impl EvalError {
    /// Short type name used in regenerated error annotations.
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::UndefinedVariable { .. } => "UndefinedVariable",
            EvalError::TypeError { .. } => "TypeError",
            EvalError::ArityMismatch { .. } => "ArityMismatch",
            EvalError::DivisionByZero => "DivisionByZero",
            EvalError::IntegerOverflow { .. } => "IntegerOverflow",
            EvalError::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            EvalError::UndefinedField { .. } => "UndefinedField",
            EvalError::UndefinedMethod { .. } => "UndefinedMethod",
            EvalError::Panic { .. } => "Panic",
            EvalError::Builtin { .. } => "BuiltinError",
            EvalError::Propagated { .. } => "Err",
            EvalError::Environment(EnvironmentError::UndefinedVariable { .. }) => {
                "UndefinedVariable"
            }
            EvalError::Environment(EnvironmentError::ImmutableBinding { .. }) => {
                "ImmutableBinding"
            }
            EvalError::Environment(EnvironmentError::StackOverflow { .. }) => "StackOverflow",
            EvalError::RefutablePattern { .. } => "RefutablePattern",
            EvalError::NonDivergingLetElse => "NonDivergingLetElse",
            EvalError::NonExhaustiveMatch { .. } => "NonExhaustiveMatch",
            EvalError::UnsupportedExpr { .. } => "Unsupported",
            EvalError::InvalidAssignTarget { .. } => "InvalidAssignTarget",
            EvalError::Syntax { .. } => "SyntaxError",
            EvalError::Timeout { .. } => "Timeout",
            EvalError::Future { .. } => "FutureError",
            EvalError::Interrupted => "Interrupted",
            EvalError::ControlFlow(_) => "ControlFlow",
        }
    }

    /// Shorthand for a type error.
    pub fn type_error(message: impl Into<String>) -> Self {
        EvalError::TypeError {
            message: message.into(),
        }
    }

    /// Shorthand for a panic.
    pub fn panic(message: impl Into<String>) -> Self {
        EvalError::Panic {
            message: message.into(),
        }
    }
}

/// Get the Rust-style type name of a value for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Unit => "()",
        Value::Bool(_) => "bool",
        Value::Char(_) => "char",
        Value::Int(_) => "i64",
        Value::Float(_) => "f64",
        Value::String(_) => "String",
        Value::Vec(_) => "Vec",
        Value::Tuple(_) => "tuple",
        Value::Map(_) => "HashMap",
        Value::Range(_) => "Range",
        Value::Struct(_) => "struct",
        Value::Option(_) => "Option",
        Value::Result(_) => "Result",
        Value::Function(_) => "fn",
        Value::Closure(_) => "closure",
        Value::BuiltinFn(_) => "builtin fn",
        Value::Future(_) => "future",
        Value::Type(_) => "type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EvalError::panic("boom").kind(), "Panic");
        assert_eq!(EvalError::DivisionByZero.kind(), "DivisionByZero");
        assert_eq!(
            EvalError::from(EnvironmentError::ImmutableBinding {
                name: "x".to_string()
            })
            .kind(),
            "ImmutableBinding"
        );
    }

    #[test]
    fn test_arity_message_pluralizes() {
        let err = EvalError::ArityMismatch {
            name: "f".to_string(),
            expected: 1,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "function `f` takes 1 argument but 2 were supplied"
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name(&Value::Int(1)), "i64");
        assert_eq!(type_name(&Value::string("x")), "String");
    }
}
