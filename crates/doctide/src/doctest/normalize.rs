//! Reformatting example source
//!
//! Example source is wrapped in an `async fn` so top-level `.await` parses,
//! handed to a [`SourceFormatter`], then unwrapped and given its prompts
//! back.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;
use thiserror::Error;

use super::scanner::Example;

/// Indent of the example body inside the synthetic wrapper.
pub const WRAPPER_INDENT: usize = 4;

/// Width of `>>> ` and `... `.
pub const PROMPT_WIDTH: usize = 4;

/// Narrowest column limit handed to a formatter.
pub const MIN_COLUMN_LIMIT: usize = 20;

const WRAPPER_OPEN: &str = "async fn __doctest__() {\n";
const WRAPPER_CLOSE: &str = "}\n";

/// Failure to reformat example source.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The wrapped source is not valid Rust
    #[error("{0}")]
    Parse(#[from] syn::Error),

    /// The external formatter could not be run
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Formatter binary
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The external formatter rejected the source
    #[error("`{program}` failed: {stderr}")]
    Rejected {
        /// Formatter binary
        program: String,
        /// What the formatter printed to stderr
        stderr: String,
    },

    /// The formatter's output lost the wrapper
    #[error("formatter output does not contain the example wrapper")]
    MissingWrapper,
}

/// Something that lays out Rust source within a column limit.
pub trait SourceFormatter {
    /// Format a complete source file.
    fn format(&self, code: &str, column_limit: usize) -> Result<String, FormatError>;
}

/// In-process formatting with `prettyplease`.
///
/// `prettyplease` has a fixed margin, so the column limit is not honored.
/// It prints from the syntax tree, which has no comments; source containing
/// a comment is checked for syntax and returned unchanged instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyPlease;

impl SourceFormatter for PrettyPlease {
    fn format(&self, code: &str, _column_limit: usize) -> Result<String, FormatError> {
        let file = syn::parse_file(code)?;
        if has_comment(code) {
            tracing::debug!("source has comments, keeping its layout");
            return Ok(code.to_string());
        }
        Ok(prettyplease::unparse(&file))
    }
}

/// Whether `code` has a `//` or `/* */` comment outside string and char literals.
pub fn has_comment(code: &str) -> bool {
    let chars: Vec<char> = code.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '/' if matches!(chars.get(i + 1), Some('/') | Some('*')) => return true,
            '"' => i = skip_string(&chars, i + 1),
            'r' if starts_token(&chars, i) => {
                let hashes = chars[i + 1..].iter().take_while(|&&c| c == '#').count();
                if chars.get(i + 1 + hashes) == Some(&'"') {
                    i = skip_raw_string(&chars, i + 2 + hashes, hashes);
                    continue;
                }
                i += 1;
            }
            '\'' => i = skip_char(&chars, i),
            _ => i += 1,
        }
    }
    false
}

fn starts_token(chars: &[char], i: usize) -> bool {
    match i.checked_sub(1).map(|j| chars[j]) {
        // `br"..."` is a raw byte string
        Some('b') => i < 2 || !is_ident_char(chars[i - 2]),
        Some(c) => !is_ident_char(c),
        None => true,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Index just past the closing quote of a string whose body starts at `i`.
fn skip_string(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    i
}

fn skip_raw_string(chars: &[char], mut i: usize, hashes: usize) -> usize {
    while i < chars.len() {
        if chars[i] == '"'
            && chars[i + 1..].iter().take(hashes).filter(|&&c| c == '#').count() == hashes
        {
            return i + 1 + hashes;
        }
        i += 1;
    }
    i
}

/// Skip a char literal at `i`, or just the quote of a lifetime.
fn skip_char(chars: &[char], i: usize) -> usize {
    match (chars.get(i + 1), chars.get(i + 2)) {
        // The escaped char at `i + 2` may itself be a quote
        (Some('\\'), _) => chars
            .get(i + 3..)
            .and_then(|rest| rest.iter().position(|&c| c == '\''))
            .map_or(chars.len(), |p| i + 4 + p),
        (Some(_), Some('\'')) => i + 3,
        _ => i + 1,
    }
}

/// Formatting by piping through a `rustfmt` binary.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    /// Path or name of the binary
    pub program: PathBuf,
}

impl Default for Rustfmt {
    fn default() -> Self {
        Self {
            program: PathBuf::from("rustfmt"),
        }
    }
}

impl SourceFormatter for Rustfmt {
    fn format(&self, code: &str, column_limit: usize) -> Result<String, FormatError> {
        let program = self.program.display().to_string();
        let spawn_error = |source| FormatError::Spawn {
            program: program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(["--edition", "2021", "--emit", "stdout", "--quiet"])
            .arg("--config")
            .arg(format!("max_width={}", column_limit))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(FormatError::Rejected {
                program,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Which formatter to use, as named in configuration and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormatterKind {
    /// [`PrettyPlease`]
    #[default]
    Prettyplease,
    /// [`Rustfmt`]
    Rustfmt,
}

impl FormatterKind {
    /// Instantiate the formatter.
    pub fn build(self) -> Box<dyn SourceFormatter> {
        match self {
            FormatterKind::Prettyplease => Box::new(PrettyPlease),
            FormatterKind::Rustfmt => Box::new(Rustfmt::default()),
        }
    }
}

/// Column limit for an example indented by `indent` in a `width` wide document.
pub fn column_limit(width: usize, indent: usize) -> usize {
    (width + WRAPPER_INDENT)
        .saturating_sub(indent + PROMPT_WIDTH)
        .max(MIN_COLUMN_LIMIT)
}

fn wrap(source: &str) -> String {
    let mut code = String::from(WRAPPER_OPEN);
    for line in source.lines() {
        if !line.is_empty() {
            code.push_str(&" ".repeat(WRAPPER_INDENT));
        }
        code.push_str(line);
        code.push('\n');
    }
    code.push_str(WRAPPER_CLOSE);
    code
}

/// Body lines of formatted wrapper code, dedented.
fn unwrap(formatted: &str) -> Result<Vec<String>, FormatError> {
    let lines: Vec<&str> = formatted.trim_end().lines().collect();
    let body = match lines.as_slice() {
        [open, body @ .., close] if open.starts_with("async fn") && close.trim() == "}" => body,
        // A body the formatter emptied collapses to `async fn __doctest__() {}`
        [only] if only.starts_with("async fn") => &[],
        _ => return Err(FormatError::MissingWrapper),
    };

    let margin = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    Ok(body
        .iter()
        .map(|line| line.get(margin..).unwrap_or("").trim_end().to_string())
        .collect())
}

fn prompt_lines(body: &[String], indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    body.iter()
        .enumerate()
        .map(|(i, line)| {
            let marker = if i == 0 { ">>>" } else { "..." };
            if line.is_empty() {
                format!("{}{}", pad, marker)
            } else {
                format!("{}{} {}", pad, marker, line)
            }
        })
        .collect()
}

/// Reformat an example's source into prompt-prefixed lines (without newlines).
pub fn normalize(
    example: &Example,
    formatter: &dyn SourceFormatter,
    width: usize,
) -> Result<Vec<String>, FormatError> {
    let limit = column_limit(width, example.indent);
    let formatted = formatter.format(&wrap(&example.source), limit)?;
    let mut body = unwrap(&formatted)?;
    if body.is_empty() {
        // Comment-only source: keep it as written
        body = example.source.lines().map(str::to_string).collect();
    }
    Ok(prompt_lines(&body, example.indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest::scanner::{scan, Segment};
    use pretty_assertions::assert_eq;

    fn example(text: &str) -> Example {
        match scan(text).unwrap().into_iter().next() {
            Some(Segment::Example(e)) => e,
            other => panic!("expected an example, got {:?}", other),
        }
    }

    #[test]
    fn test_column_limit() {
        assert_eq!(column_limit(80, 0), 80);
        assert_eq!(column_limit(80, 4), 76);
        assert_eq!(column_limit(10, 8), MIN_COLUMN_LIMIT);
    }

    #[test]
    fn test_normalize_spacing() {
        let ex = example("  >>> let   x=1+2;\n");
        assert_eq!(
            normalize(&ex, &PrettyPlease, 80).unwrap(),
            vec!["  >>> let x = 1 + 2;".to_string()]
        );
    }

    #[test]
    fn test_normalize_multiline_with_await() {
        let ex = example(">>> let v = ready(3)\n...     .await;\n>>> v\n");
        assert_eq!(
            normalize(&ex, &PrettyPlease, 80).unwrap(),
            vec![">>> let v = ready(3).await;".to_string()]
        );

        let ex = example(">>> fn add(a: i64, b: i64) -> i64 { a + b }\n");
        assert_eq!(
            normalize(&ex, &PrettyPlease, 80).unwrap(),
            vec![
                ">>> fn add(a: i64, b: i64) -> i64 {".to_string(),
                "...     a + b".to_string(),
                "... }".to_string(),
            ]
        );
    }

    #[test]
    fn test_already_normalized_is_stable() {
        let ex = example(">>> let total: i64 = (1..=4).sum();\n");
        let once = normalize(&ex, &PrettyPlease, 80).unwrap();
        assert_eq!(once, vec![">>> let total: i64 = (1..=4).sum();".to_string()]);
    }

    #[test]
    fn test_invalid_source_is_an_error() {
        let ex = example(">>> let = ;\n");
        assert!(matches!(
            normalize(&ex, &PrettyPlease, 80),
            Err(FormatError::Parse(_))
        ));
    }

    #[test]
    fn test_comment_detection() {
        assert!(has_comment("let x = 1; // the answer"));
        assert!(has_comment("let x = /* inline */ 1;"));
        assert!(!has_comment(r#"let url = "http://example.com";"#));
        assert!(!has_comment(r##"let s = r#"a // b"#;"##));
        assert!(!has_comment(r#"let s = "quote \" // still string";"#));
        assert!(!has_comment("let c = '/'; let d = '\\''; fn f<'a>(x: &'a str) {}"));
        assert!(has_comment("let c = '/'; // trailing"));
    }

    #[test]
    fn test_comments_are_kept() {
        let ex = example(">>> let x = 1; // the answer\n... x\n");
        assert_eq!(
            normalize(&ex, &PrettyPlease, 80).unwrap(),
            vec![">>> let x = 1; // the answer".to_string(), "... x".to_string()]
        );

        let ex = example(">>> // setup\n... let y = 2;\n");
        assert_eq!(
            normalize(&ex, &PrettyPlease, 80).unwrap(),
            vec![">>> // setup".to_string(), "... let y = 2;".to_string()]
        );
    }

    #[test]
    fn test_commented_source_is_still_checked() {
        let ex = example(">>> let = ; // oops\n");
        assert!(matches!(
            normalize(&ex, &PrettyPlease, 80),
            Err(FormatError::Parse(_))
        ));
    }

    #[test]
    fn test_unwrap_keeps_blank_lines() {
        let formatted = "async fn __doctest__() {\n    let a = 1;\n\n    a\n}\n";
        assert_eq!(
            prompt_lines(&unwrap(formatted).unwrap(), 0),
            vec![">>> let a = 1;", "...", "... a"]
        );
    }
}
