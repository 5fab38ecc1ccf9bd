//! Regenerating the expected output of `>>>` examples
//!
//! A document is [scanned](scanner) into text and examples; each example's
//! source is [normalized](normalize) and [executed](executor) in a session
//! shared by the whole document, its output is [reconciled](reconcile)
//! with the old annotation, and [`regen`] stitches the text back together.

pub mod executor;
pub mod normalize;
pub mod reconcile;
pub mod regen;
pub mod scanner;

pub use executor::{Execution, Outcome, Session};
pub use normalize::{normalize, FormatError, FormatterKind, PrettyPlease, Rustfmt, SourceFormatter};
pub use reconcile::{check_output, reconcile, render_output, BLANKLINE};
pub use regen::{regenerate, update, verify, Mode, RegenError, Regenerated, Regenerator};
pub use scanner::{scan, Example, ScanError, Segment};
