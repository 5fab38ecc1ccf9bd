//! Output sink and scoped capture

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

/// Where printed output goes.
///
/// With no capture installed, text is written to the process stdout.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    buffer: Arc<Mutex<Option<String>>>,
}

impl OutputSink {
    /// Create a sink writing to the process stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write text to the current destination.
    pub fn write_str(&self, text: &str) {
        let mut slot = self.lock();
        match slot.as_mut() {
            Some(buffer) => buffer.push_str(text),
            None => {
                let mut stdout = std::io::stdout().lock();
                // Output to a closed stdout is dropped, as `print!` would panic.
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
        }
    }

    /// Begin capturing into a fresh buffer until the guard is dropped.
    pub fn capture(&self) -> OutputCapture<'_> {
        let previous = self.lock().replace(String::new());
        OutputCapture {
            sink: self,
            previous: Some(previous),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// RAII guard that restores the sink's previous destination when dropped.
///
/// # Example
///
/// ```
/// use doctide::context::OutputSink;
///
/// let sink = OutputSink::new();
/// let capture = sink.capture();
/// sink.write_str("hello\n");
/// assert_eq!(capture.finish(), "hello\n");
/// ```
pub struct OutputCapture<'a> {
    sink: &'a OutputSink,
    previous: Option<Option<String>>,
}

impl OutputCapture<'_> {
    /// Text captured so far, without ending the capture.
    pub fn contents(&self) -> String {
        self.sink.lock().clone().unwrap_or_default()
    }

    /// End the capture and return everything written during it.
    pub fn finish(self) -> String {
        self.contents()
    }
}

impl Drop for OutputCapture<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.sink.lock() = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_collects_writes() {
        let sink = OutputSink::new();
        let capture = sink.capture();
        sink.write_str("a");
        sink.write_str("b\n");
        assert_eq!(capture.finish(), "ab\n");
    }

    #[test]
    fn test_nested_capture_restores_outer() {
        let sink = OutputSink::new();
        let outer = sink.capture();
        sink.write_str("outer ");
        {
            let inner = sink.capture();
            sink.write_str("inner");
            assert_eq!(inner.contents(), "inner");
        }
        sink.write_str("again");
        assert_eq!(outer.finish(), "outer again");
    }

    #[test]
    fn test_capture_released_on_panic() {
        let sink = OutputSink::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _capture = sink.capture();
            sink.write_str("lost");
            panic!("example blew up");
        }));
        assert!(result.is_err());
        let capture = sink.capture();
        assert_eq!(capture.finish(), "");
    }
}
