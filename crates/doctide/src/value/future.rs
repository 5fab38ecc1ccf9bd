//! Future values resolved by `.await`

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use super::Value;

/// A native future produced by a builtin such as `sleep` or `ready`.
pub type NativeFuture = Pin<Box<dyn Future<Output = Result<Value, String>>>>;

/// What remains to be done before a future yields its value.
pub enum FutureState {
    /// Driven on the session's async runtime
    Native(NativeFuture),

    /// An `async` block or `async fn` call, evaluated when awaited
    Deferred {
        /// Body to evaluate
        body: Arc<syn::Block>,
        /// Bindings visible to the body (parameters, captured locals)
        captures: Vec<(String, Value)>,
    },

    /// Already awaited
    Taken,
}

/// A one-shot future.
///
/// Clones share state, so awaiting any clone consumes all of them, like
/// moving a future into `.await` does in Rust.
#[derive(Clone)]
pub struct FutureValue {
    /// Description used when printing (`<future sleep>`)
    pub label: String,

    state: Arc<Mutex<FutureState>>,
}

impl FutureValue {
    /// Wrap a native future.
    pub fn native(
        label: impl Into<String>,
        future: impl Future<Output = Result<Value, String>> + 'static,
    ) -> Self {
        Self::from_state(label, FutureState::Native(Box::pin(future)))
    }

    /// Defer evaluation of a block until it is awaited.
    pub fn deferred(
        label: impl Into<String>,
        body: Arc<syn::Block>,
        captures: Vec<(String, Value)>,
    ) -> Self {
        Self::from_state(label, FutureState::Deferred { body, captures })
    }

    fn from_state(label: impl Into<String>, state: FutureState) -> Self {
        Self {
            label: label.into(),
            // ALLOW: futures never leave the evaluating thread
            #[allow(clippy::arc_with_non_send_sync)]
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Take the pending work out of this future, leaving it `Taken`.
    pub fn take(&self) -> FutureState {
        match self.state.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, FutureState::Taken),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), FutureState::Taken),
        }
    }

    /// Whether both values are handles to the same future.
    pub fn ptr_eq(&self, other: &FutureValue) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl std::fmt::Debug for FutureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FutureValue({})", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_shared_state() {
        let future = FutureValue::native("ready", async { Ok(Value::Int(1)) });
        let alias = future.clone();
        assert!(matches!(future.take(), FutureState::Native(_)));
        assert!(matches!(alias.take(), FutureState::Taken));
        assert!(future.ptr_eq(&alias));
    }
}
