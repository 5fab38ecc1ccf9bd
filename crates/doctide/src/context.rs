//! Evaluation context configuration

mod driver;
mod output;

pub use driver::{listen_for_ctrl_c, Driver};
pub use output::{OutputCapture, OutputSink};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Shared cancellation flag.
///
/// Tripping it makes the evaluator stop before the next expression and
/// wakes any `.await` currently blocked on the driver.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<InterruptInner>,
}

#[derive(Debug, Default)]
struct InterruptInner {
    flag: AtomicBool,
    notify: Notify,
}

impl Interrupt {
    /// Create an untripped interrupt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request interruption of evaluation.
    pub fn trip(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Check if evaluation has been interrupted.
    pub fn is_tripped(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Reset the interrupt flag.
    pub fn reset(&self) {
        self.inner.flag.store(false, Ordering::SeqCst);
    }

    pub(crate) fn notify(&self) -> &Notify {
        &self.inner.notify
    }
}

/// Configuration and state for evaluation.
///
/// This is passed through all evaluation calls and controls interruption,
/// where printed output goes, and how `.await` is driven.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    /// Interrupt handle - trip it to abort evaluation
    pub interrupt: Interrupt,

    /// Destination of `print!`/`println!`
    pub stdout: OutputSink,

    /// Runtime that drives native futures; `None` outside a session
    pub driver: Option<Arc<Driver>>,

    /// Upper bound for a single `.await`
    pub await_timeout: Option<Duration>,

    /// Whether to trace evaluation (for debugging)
    pub trace: bool,
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an async driver.
    pub fn with_driver(mut self, driver: Arc<Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Share `interrupt` with whoever else holds it.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Bound every `.await` by `timeout`.
    pub fn with_await_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.await_timeout = timeout;
        self
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_tripped()
    }

    /// Request interruption of evaluation.
    pub fn interrupt(&self) {
        self.interrupt.trip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_is_shared_between_clones() {
        let ctx = EvalContext::new();
        let other = ctx.clone();
        assert!(!other.is_interrupted());
        ctx.interrupt();
        assert!(other.is_interrupted());
        other.interrupt.reset();
        assert!(!ctx.is_interrupted());
    }
}
