//! RAII guards for automatic frame cleanup

use super::Environment;
use crate::error::EnvironmentError;

/// RAII guard that automatically pops a frame when dropped.
///
/// # Example
///
/// ```
/// use doctide::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.define("x", Value::Int(1));
///
/// {
///     let mut guard = env.scope_guard();
///     guard.define("y", Value::Int(2));
///     // y is visible here
/// }
/// // guard dropped, frame popped, y is gone
/// assert!(!env.contains("y"));
/// assert!(env.contains("x"));
/// ```
pub struct ScopeGuard<'a> {
    env: &'a mut Environment,
}

/// RAII guard for a function call frame.
///
/// Created by [`Environment::call_guard`]; leaves the call when dropped, so
/// an error or early return inside the callee can't leak its bindings.
pub struct CallGuard<'a> {
    env: &'a mut Environment,
}

impl Environment {
    /// Create a scope guard that pushes a frame now and pops it on drop.
    pub fn scope_guard(&mut self) -> ScopeGuard<'_> {
        self.push_frame();
        ScopeGuard { env: self }
    }

    /// Enter a call frame that is exited when the guard drops.
    pub fn call_guard(&mut self) -> Result<CallGuard<'_>, EnvironmentError> {
        self.enter_call()?;
        Ok(CallGuard { env: self })
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.env.pop_frame();
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.env.exit_call();
    }
}

impl std::ops::Deref for ScopeGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl std::ops::DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}

impl std::ops::Deref for CallGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl std::ops::DerefMut for CallGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}
