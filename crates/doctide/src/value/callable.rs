//! Callable value types: functions, closures, and builtins

use std::sync::Arc;

use super::Value;
use crate::context::EvalContext;

/// Type alias for builtin function pointers to reduce complexity
///
/// Builtins receive the evaluation context so that printing goes through
/// the context's output sink rather than straight to the process.
pub type BuiltinFnPtr = Arc<dyn Fn(&[Value], &EvalContext) -> Result<Value, String>>;

/// A user-defined function parsed from syn::ItemFn.
///
/// Stores the AST directly for interpretation.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    /// Function name
    pub name: String,

    /// Parameter patterns (types are erased at runtime)
    pub params: Vec<syn::Pat>,

    /// `self` parameter of a method defined in an `impl` block
    pub receiver: Option<Receiver>,

    /// Type named by the enclosing `impl`, bound as `Self` during calls
    pub self_type: Option<String>,

    /// The function body (stored as syn AST)
    pub body: Arc<syn::Block>,

    /// `async fn`: calling it yields a future instead of running the body
    pub is_async: bool,
}

/// How a method takes `self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `self`
    Value,
    /// `&self`
    Ref,
    /// `&mut self`: the updated `self` is written back to the receiver
    RefMut,
}

impl FunctionValue {
    /// Create a new function value
    pub fn new(name: String, params: Vec<syn::Pat>, body: syn::Block) -> Self {
        Self {
            name,
            params,
            receiver: None,
            self_type: None,
            // ALLOW: syn::Block is only ever touched from the evaluating thread
            #[allow(clippy::arc_with_non_send_sync)]
            body: Arc::new(body),
            is_async: false,
        }
    }

    /// Attach this function to `self_type` as a method or associated fn.
    pub fn in_impl(mut self, self_type: impl Into<String>, receiver: Option<Receiver>) -> Self {
        self.self_type = Some(self_type.into());
        self.receiver = receiver;
        self
    }

    /// Mark this function as `async`.
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }
}

/// A closure with captured environment.
///
/// Captures are a snapshot of the local (non-global) bindings visible where
/// the closure was created. Globals are looked up at call time.
#[derive(Debug, Clone)]
pub struct ClosureValue {
    /// Parameter patterns
    pub params: Vec<syn::Pat>,

    /// The closure body
    pub body: Arc<syn::Expr>,

    /// Captured variables (name -> value)
    pub captures: Arc<Vec<(String, Value)>>,
}

/// A built-in native function.
///
/// These are Rust functions exposed to the interpreter.
#[derive(Clone)]
pub struct BuiltinFn {
    /// Function name (for display/debugging)
    pub name: String,

    /// Arity (-1 for variadic)
    pub arity: i32,

    /// The actual function pointer
    pub func: BuiltinFnPtr,
}

impl BuiltinFn {
    /// Create a builtin from a plain function.
    pub fn new(
        name: impl Into<String>,
        arity: i32,
        func: impl Fn(&[Value], &EvalContext) -> Result<Value, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}
