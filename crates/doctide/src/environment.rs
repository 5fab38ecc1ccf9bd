//! Runtime environment managing variable and function bindings

mod frame;
mod prelude;

pub use frame::{CallGuard, ScopeGuard};

use std::sync::Arc;

use crate::error::EnvironmentError;
use crate::value::{BuiltinFn, FunctionValue, Value};

/// Default limit for nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// A single variable or function binding.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The binding's name
    pub name: String,

    /// The bound value
    pub value: Value,

    /// Whether this binding is mutable
    pub mutable: bool,
}

/// Binding mode for let statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Immutable binding: `let x = ...`
    Immutable,

    /// Mutable binding: `let mut x = ...`
    Mutable,

    /// Constant binding: `const X = ...`
    Constant,
}

/// The runtime environment managing variable and function bindings.
///
/// Uses a flat scope design with frame boundaries. Function calls add a
/// barrier: code running inside a call sees the bindings of its own call
/// plus the top level (everything defined outside any call), never the
/// locals of its caller.
///
/// # Example
///
/// ```
/// use doctide::{Environment, Value};
///
/// let mut env = Environment::new();
///
/// // Global scope
/// env.define("x", Value::Int(1));
///
/// // Enter a new scope
/// env.push_frame();
/// env.define("y", Value::Int(2));
/// env.define("x", Value::Int(10)); // Shadows outer x
///
/// assert_eq!(env.get("x"), Some(&Value::Int(10)));
/// assert_eq!(env.get("y"), Some(&Value::Int(2)));
///
/// // Exit scope
/// env.pop_frame();
///
/// assert_eq!(env.get("x"), Some(&Value::Int(1)));
/// assert_eq!(env.get("y"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    /// All bindings in a flat array (most recent at end)
    bindings: Vec<Binding>,

    /// Frame boundaries (indices into bindings)
    /// Each entry marks where a scope begins
    frames: Vec<usize>,

    /// Binding index where each active call begins
    calls: Vec<usize>,

    /// Maximum allowed call depth
    max_call_depth: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a new empty environment.
    pub fn new() -> Self {
        Self::with_max_call_depth(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Create an environment with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            bindings: Vec::new(),
            frames: vec![0], // Start with one frame (global scope)
            calls: Vec::new(),
            max_call_depth: max_depth,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Frame Management (Scope Entry/Exit)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a new scope (push a frame).
    pub fn push_frame(&mut self) {
        self.frames.push(self.bindings.len());
    }

    /// Exit the current scope (pop a frame).
    ///
    /// Removes all bindings defined since the matching `push_frame()`.
    /// Does nothing at the global scope.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            if let Some(boundary) = self.frames.pop() {
                self.bindings.truncate(boundary);
            }
        }
    }

    /// Exit the current scope, moving the latest binding of each of `names`
    /// into the global frame.
    ///
    /// A promoted binding replaces any global binding with the same name.
    /// Names that were never bound in the popped frame are ignored.
    pub fn pop_frame_promoting(&mut self, names: &[String]) {
        if self.frames.len() < 2 {
            return;
        }
        let Some(boundary) = self.frames.pop() else {
            return;
        };
        let popped = self.bindings.split_off(boundary);

        let mut promoted: Vec<Binding> = Vec::new();
        for binding in popped.into_iter().rev() {
            if names.contains(&binding.name) && !promoted.iter().any(|p| p.name == binding.name) {
                promoted.push(binding);
            }
        }
        promoted.reverse();

        let global_end = self.global_end();
        for binding in promoted {
            if let Some(idx) = self.bindings[..global_end]
                .iter()
                .rposition(|b| b.name == binding.name)
            {
                self.bindings[idx] = binding;
                continue;
            }
            let at = self.global_end();
            self.bindings.insert(at, binding);
            for frame in self.frames.iter_mut().skip(1) {
                *frame += 1;
            }
            for call in self.calls.iter_mut() {
                *call += 1;
            }
        }
    }

    /// Get the current scope depth (number of frames).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Check if we're at global scope.
    pub fn is_global_scope(&self) -> bool {
        self.frames.len() == 1
    }

    fn global_end(&self) -> usize {
        self.frames.get(1).copied().unwrap_or(self.bindings.len())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call Depth Tracking (Stack Overflow Protection)
    // ═══════════════════════════════════════════════════════════════════

    /// Enter a function call: check the depth limit, push a frame and hide
    /// the caller's locals.
    pub fn enter_call(&mut self) -> Result<(), EnvironmentError> {
        if self.calls.len() >= self.max_call_depth {
            return Err(EnvironmentError::StackOverflow {
                depth: self.calls.len() + 1,
                max: self.max_call_depth,
            });
        }
        self.push_frame();
        self.calls.push(self.bindings.len());
        Ok(())
    }

    /// Exit a function call.
    pub fn exit_call(&mut self) {
        if self.calls.pop().is_some() {
            self.pop_frame();
        }
    }

    /// Get current call depth.
    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Definition
    // ═══════════════════════════════════════════════════════════════════

    /// Define a new immutable binding in the current scope.
    ///
    /// This always creates a new binding, even if a binding with the
    /// same name exists (shadowing).
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.define_with_mode(name, value, BindingMode::Immutable);
    }

    /// Define a new binding with explicit mutability.
    pub fn define_with_mode(&mut self, name: impl Into<String>, value: Value, mode: BindingMode) {
        self.bindings.push(Binding {
            name: name.into(),
            value,
            mutable: mode == BindingMode::Mutable,
        });
    }

    /// Define a function in the environment.
    pub fn define_function(&mut self, func: FunctionValue) {
        let name = func.name.clone();
        self.define(name, Value::Function(Arc::new(func)));
    }

    /// Register a built-in function.
    pub fn define_builtin(&mut self, builtin: BuiltinFn) {
        let name = builtin.name.clone();
        self.define(name, Value::BuiltinFn(builtin));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Index of the visible binding for `name`, honoring call barriers.
    fn find(&self, name: &str) -> Option<usize> {
        let (local_start, top_end) = match (self.calls.first(), self.calls.last()) {
            (Some(&first), Some(&last)) => (last, first),
            _ => (0, 0),
        };
        self.bindings[local_start..]
            .iter()
            .rposition(|b| b.name == name)
            .map(|i| i + local_start)
            .or_else(|| self.bindings[..top_end].iter().rposition(|b| b.name == name))
    }

    /// Look up a binding by name.
    ///
    /// Returns the most recent visible binding with the given name
    /// (shadowing), or `None` if not found.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).map(|i| &self.bindings[i].value)
    }

    /// Look up a binding and return the full Binding struct.
    pub fn get_binding(&self, name: &str) -> Option<&Binding> {
        self.find(name).map(|i| &self.bindings[i])
    }

    /// Look up a mutable reference to a binding's value.
    ///
    /// Returns `None` if the binding doesn't exist.
    /// Returns `Err` if the binding exists but is immutable.
    pub fn get_mut(&mut self, name: &str) -> Result<Option<&mut Value>, EnvironmentError> {
        match self.find(name) {
            Some(i) => {
                let binding = &mut self.bindings[i];
                if !binding.mutable {
                    return Err(EnvironmentError::ImmutableBinding {
                        name: name.to_string(),
                    });
                }
                Ok(Some(&mut binding.value))
            }
            None => Ok(None),
        }
    }

    /// Check if a binding is visible.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Assignment (Mutation)
    // ═══════════════════════════════════════════════════════════════════

    /// Assign a new value to an existing mutable binding.
    ///
    /// # Errors
    ///
    /// - `UndefinedVariable` if the binding doesn't exist
    /// - `ImmutableBinding` if the binding is not mutable
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), EnvironmentError> {
        match self.get_mut(name)? {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EnvironmentError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Iteration and Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Snapshot of the visible non-global bindings, oldest first.
    ///
    /// Closures and async blocks carry this snapshot so they keep working
    /// after the scope that created them is gone.
    pub fn local_bindings(&self) -> Vec<(String, Value)> {
        let start = self.calls.last().copied().unwrap_or_else(|| self.global_end());
        self.bindings[start..]
            .iter()
            .map(|b| (b.name.clone(), b.value.clone()))
            .collect()
    }

    /// Names bound in the global frame.
    pub fn global_names(&self) -> Vec<&str> {
        self.bindings[..self.global_end()]
            .iter()
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Iterate over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Get the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
