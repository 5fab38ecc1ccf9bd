//! Control flow mechanism for break/continue/return

use crate::Value;

/// Control flow signal for non-local jumps.
///
/// When `break`, `continue` or `return` is evaluated, it doesn't return a
/// normal value. Instead, it returns an `Err(EvalError::ControlFlow(...))`
/// that propagates up until caught by the enclosing loop or call.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    /// Break out of a loop or labeled block, optionally with a value.
    Break {
        /// Value to return from the loop
        value: Value,
        /// Optional loop label (`break 'outer`)
        label: Option<String>,
    },

    /// Continue to next iteration of a loop.
    Continue {
        /// Optional loop label
        label: Option<String>,
    },

    /// Return from a function, closure, async block or the example itself.
    Return {
        /// Value to return
        value: Value,
    },
}

impl ControlFlow {
    /// Create a break with a value.
    pub fn break_with(value: Value) -> Self {
        ControlFlow::Break { value, label: None }
    }

    /// Create a labeled break.
    pub fn break_labeled(value: Value, label: String) -> Self {
        ControlFlow::Break {
            value,
            label: Some(label),
        }
    }

    /// Create a continue.
    pub fn continue_loop() -> Self {
        ControlFlow::Continue { label: None }
    }

    /// Create a return.
    pub fn return_value(value: Value) -> Self {
        ControlFlow::Return { value }
    }

    /// The keyword that raised this signal.
    pub fn keyword(&self) -> &'static str {
        match self {
            ControlFlow::Break { .. } => "break",
            ControlFlow::Continue { .. } => "continue",
            ControlFlow::Return { .. } => "return",
        }
    }

    /// Check if this control flow matches a loop label.
    /// None label matches any loop, Some(l) matches only that label.
    pub fn matches_label(&self, loop_label: Option<&str>) -> bool {
        match self {
            ControlFlow::Break { label, .. } | ControlFlow::Continue { label } => {
                match (label, loop_label) {
                    (None, _) => true,
                    (Some(l), Some(ll)) => l == ll,
                    (Some(_), None) => false,
                }
            }
            ControlFlow::Return { .. } => false,
        }
    }

    /// Labeled blocks only catch a `break` naming them.
    pub fn matches_block_label(&self, block_label: &str) -> bool {
        matches!(self, ControlFlow::Break { label: Some(l), .. } if l == block_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_label_unlabeled_break() {
        let cf = ControlFlow::break_with(Value::Unit);
        assert!(cf.matches_label(None));
        assert!(cf.matches_label(Some("outer")));
        assert!(!cf.matches_block_label("outer"));
    }

    #[test]
    fn test_matches_label_labeled_break() {
        let cf = ControlFlow::break_labeled(Value::Unit, "outer".to_string());
        assert!(!cf.matches_label(None));
        assert!(cf.matches_label(Some("outer")));
        assert!(!cf.matches_label(Some("inner")));
        assert!(cf.matches_block_label("outer"));
    }

    #[test]
    fn test_matches_label_return() {
        let cf = ControlFlow::return_value(Value::Int(42));
        assert!(!cf.matches_label(None));
        assert!(!cf.matches_label(Some("outer")));
    }

    #[test]
    fn test_keyword() {
        assert_eq!(ControlFlow::continue_loop().keyword(), "continue");
        assert_eq!(ControlFlow::return_value(Value::Unit).keyword(), "return");
    }

    #[test]
    fn test_partialeq() {
        assert_eq!(
            ControlFlow::break_with(Value::Int(1)),
            ControlFlow::break_with(Value::Int(1))
        );
        assert_ne!(
            ControlFlow::break_with(Value::Int(1)),
            ControlFlow::return_value(Value::Int(1))
        );
    }
}
