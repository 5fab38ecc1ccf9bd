//! Regenerating whole documents
//!
//! Scans a document, runs each example in one session, and reassembles the
//! text with normalized source and reconciled output.

use std::path::{Path, PathBuf};

use similar::TextDiff;
use thiserror::Error;

use super::executor::{Execution, Session};
use super::normalize::{normalize, FormatError, SourceFormatter};
use super::reconcile::{reconcile, render_output};
use super::scanner::{scan, Example, ScanError, Segment};
use crate::config::Options;
use crate::context::Interrupt;

/// Label of the regenerated side of a diff.
pub const EXPECTED_LABEL: &str = "<expected>";

/// Failures that abort a run.
#[derive(Error, Debug)]
pub enum RegenError {
    /// An example's source could not be reformatted
    #[error("{}:{lineno}: {source}", path.display())]
    Format {
        /// Document path
        path: PathBuf,
        /// Line of the example's prompt
        lineno: usize,
        /// Formatter failure
        source: FormatError,
    },

    /// The document has a malformed example block
    #[error("{}:{}: {source}", path.display(), source.lineno())]
    Scan {
        /// Document path
        path: PathBuf,
        /// Scanner failure
        source: ScanError,
    },

    /// The run was interrupted while an example executed
    #[error("{}:{lineno}: interrupted", path.display())]
    Cancelled {
        /// Document path
        path: PathBuf,
        /// Line of the example that was running
        lineno: usize,
    },

    /// Regeneration would change the document
    #[error("{} is out of date:\n{diff}", path.display())]
    Drift {
        /// Document path
        path: PathBuf,
        /// Unified diff from the document to its regenerated text
        diff: String,
    },

    /// Reading or writing the document failed
    #[error("{}: {source}", path.display())]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The async driver for the session could not be started
    #[error("failed to start the async runtime: {0}")]
    Runtime(std::io::Error),
}

/// A document and its regenerated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regenerated {
    /// Document path
    pub path: PathBuf,
    /// Text as read
    pub original: String,
    /// Text with regenerated examples
    pub regenerated: String,
}

impl Regenerated {
    /// Whether regeneration left the text unchanged.
    pub fn is_unchanged(&self) -> bool {
        self.original == self.regenerated
    }

    /// Unified diff from the original to the regenerated text.
    pub fn diff(&self) -> String {
        unified_diff(&self.path, &self.original, &self.regenerated)
    }
}

/// What [`update`] does with the regenerated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Overwrite the document
    InPlace,
    /// Print a unified diff to stderr
    #[default]
    Diff,
    /// Print the regenerated text to stdout
    Print,
}

/// Unified diff labelled with `path` and [`EXPECTED_LABEL`].
pub fn unified_diff(path: &Path, original: &str, regenerated: &str) -> String {
    TextDiff::from_lines(original, regenerated)
        .unified_diff()
        .header(&path.display().to_string(), EXPECTED_LABEL)
        .to_string()
}

/// Regenerates documents with one set of options and one cancellation handle.
#[derive(Debug, Clone, Default)]
pub struct Regenerator {
    options: Options,
    interrupt: Interrupt,
}

impl Regenerator {
    /// Create a regenerator with its own interrupt.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            interrupt: Interrupt::new(),
        }
    }

    /// Cancel through `interrupt`, typically one tripped by Ctrl-C.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Handle that cancels the current and every later document.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Regenerate the examples of `text`, read from `path`.
    pub fn regenerate(&self, path: &Path, text: &str) -> Result<Regenerated, RegenError> {
        let segments = scan(text).map_err(|source| RegenError::Scan {
            path: path.to_path_buf(),
            source,
        })?;
        let formatter = self.options.formatter.build();
        let mut session = Session::with_interrupt(&self.options, self.interrupt.clone())
            .map_err(RegenError::Runtime)?;

        let mut out = String::with_capacity(text.len());
        let mut examples = 0;
        for segment in &segments {
            match segment {
                Segment::Text(literal) => out.push_str(literal),
                Segment::Comment(line) => out.push_str(line),
                Segment::Example(example) => {
                    examples += 1;
                    self.regenerate_example(path, example, formatter.as_ref(), &mut session, &mut out)?;
                }
            }
        }
        tracing::debug!(path = %path.display(), examples, "regenerated document");

        Ok(Regenerated {
            path: path.to_path_buf(),
            original: text.to_string(),
            regenerated: out,
        })
    }

    fn regenerate_example(
        &self,
        path: &Path,
        example: &Example,
        formatter: &dyn SourceFormatter,
        session: &mut Session,
        out: &mut String,
    ) -> Result<(), RegenError> {
        let cancelled = || RegenError::Cancelled {
            path: path.to_path_buf(),
            lineno: example.lineno,
        };
        if self.interrupt.is_tripped() {
            return Err(cancelled());
        }

        tracing::debug!(path = %path.display(), lineno = example.lineno, "running example");
        if self.options.verbose {
            tracing::info!("executing example:\n{}", example.source.trim_end());
        }

        let prompt_lines = normalize(example, formatter, self.options.width).map_err(|source| {
            // Ctrl-C also reaches an external formatter
            if self.interrupt.is_tripped() {
                cancelled()
            } else {
                RegenError::Format {
                    path: path.to_path_buf(),
                    lineno: example.lineno,
                    source,
                }
            }
        })?;
        for line in prompt_lines {
            out.push_str(&line);
            out.push('\n');
        }

        let outcome = match session.execute(&example.source) {
            Execution::Completed(outcome) => outcome,
            Execution::Cancelled => return Err(cancelled()),
        };
        if !outcome.succeeded() {
            tracing::debug!(lineno = example.lineno, "example raised an error");
        }

        for line in render_output(reconcile(&example.want, &outcome), example.indent) {
            out.push_str(&line);
            out.push('\n');
        }
        Ok(())
    }

    /// Regenerate the document at `path` and apply `mode`.
    ///
    /// In-place writes happen only after the whole document regenerated.
    pub fn update(&self, path: &Path, mode: Mode) -> Result<Regenerated, RegenError> {
        let text = read(path)?;
        let result = self.regenerate(path, &text)?;

        match mode {
            Mode::InPlace => {
                if !result.is_unchanged() {
                    std::fs::write(path, &result.regenerated).map_err(|source| RegenError::Io {
                        path: path.to_path_buf(),
                        source,
                    })?;
                    tracing::info!(path = %path.display(), "updated");
                }
            }
            Mode::Diff => eprint!("{}", result.diff()),
            Mode::Print => print!("{}", result.regenerated),
        }
        Ok(result)
    }

    /// Check that regenerating `path` would not change it.
    pub fn verify(&self, path: &Path) -> Result<(), RegenError> {
        let text = read(path)?;
        let result = self.regenerate(path, &text)?;
        if result.is_unchanged() {
            Ok(())
        } else {
            Err(RegenError::Drift {
                path: path.to_path_buf(),
                diff: result.diff(),
            })
        }
    }
}

fn read(path: &Path) -> Result<String, RegenError> {
    std::fs::read_to_string(path).map_err(|source| RegenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Regenerate the examples of `text`, read from `path`.
pub fn regenerate(path: &Path, text: &str, options: &Options) -> Result<Regenerated, RegenError> {
    Regenerator::new(options.clone()).regenerate(path, text)
}

/// Regenerate the document at `path` and apply `mode`.
pub fn update(path: &Path, options: &Options, mode: Mode) -> Result<Regenerated, RegenError> {
    Regenerator::new(options.clone()).update(path, mode)
}

/// Check that regenerating `path` would not change it.
pub fn verify(path: &Path, options: &Options) -> Result<(), RegenError> {
    Regenerator::new(options.clone()).verify(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn regen(text: &str) -> String {
        regenerate(Path::new("doc.md"), text, &Options::default())
            .unwrap()
            .regenerated
    }

    #[test]
    fn test_fills_in_missing_output() {
        assert_eq!(regen("Sum:\n\n>>> 1+2\n\nDone\n"), "Sum:\n\n>>> 1 + 2\n3\n\nDone\n");
    }

    #[test]
    fn test_up_to_date_document_is_unchanged() {
        let text = "  >>> let x = 2;\n  >>> x * 21\n  42\n";
        assert_eq!(regen(text), text);
    }

    #[test]
    fn test_format_error_is_located() {
        let err = regenerate(Path::new("doc.md"), "a\n>>> let = ;\n", &Options::default())
            .unwrap_err();
        assert!(matches!(err, RegenError::Format { lineno: 2, .. }));
        assert!(err.to_string().starts_with("doc.md:2: "));
    }

    #[test]
    fn test_scan_error_is_located() {
        let err = regenerate(Path::new("doc.md"), "  >>> 1\n 1\n", &Options::default()).unwrap_err();
        assert!(err.to_string().starts_with("doc.md:2: "));
    }

    #[test]
    fn test_tripped_interrupt_cancels_at_first_example() {
        let interrupt = Interrupt::new();
        let regenerator = Regenerator::new(Options::default()).with_interrupt(interrupt.clone());
        interrupt.trip();

        // Nothing to run, nothing to cancel
        assert!(regenerator.regenerate(Path::new("doc.md"), "prose\n").is_ok());

        let err = regenerator
            .regenerate(Path::new("doc.md"), "prose\n>>> fn f() {}\n")
            .unwrap_err();
        assert!(matches!(err, RegenError::Cancelled { lineno: 2, .. }));
    }

    #[test]
    fn test_diff_labels() {
        let diff = unified_diff(Path::new("doc.md"), "a\n", "b\n");
        assert!(diff.starts_with("--- doc.md\n+++ <expected>\n"));
        assert!(diff.contains("-a\n+b\n"));
    }
}
