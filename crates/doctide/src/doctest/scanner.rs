//! Splitting a document into text and `>>>` examples

use thiserror::Error;

const PROMPT: &str = ">>>";
const CONTINUATION: &str = "...";

/// One interactive example found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// Source lines with prompts stripped, each newline terminated
    pub source: String,
    /// Expected output with the indent stripped, newline terminated; may be empty
    pub want: String,
    /// 1-based line of the `>>>` line
    pub lineno: usize,
    /// Spaces before the prompt
    pub indent: usize,
    text: String,
}

impl Example {
    /// The example exactly as it appears in the document.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A piece of a scanned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text outside any example, verbatim
    Text(String),
    /// A `>>>` line holding only a comment, verbatim including its newline
    Comment(String),
    /// An executable example
    Example(Example),
}

/// Malformed example blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// An expected-output line is indented less than its prompt
    #[error("line {lineno} of the expected output has inconsistent leading whitespace")]
    BadIndent {
        /// 1-based line number of the offending line
        lineno: usize,
    },
}

impl ScanError {
    /// Line the error refers to.
    pub fn lineno(&self) -> usize {
        match self {
            ScanError::BadIndent { lineno } => *lineno,
        }
    }
}

fn strip_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// `(indent, content)` of a primary prompt line with something after the marker.
fn primary(line: &str) -> Option<(usize, &str)> {
    let indent = leading_spaces(line);
    let content = line[indent..].strip_prefix(PROMPT)?.strip_prefix(' ')?;
    if content.trim().is_empty() {
        return None;
    }
    Some((indent, content))
}

/// Content of a continuation line at exactly `indent`.
fn continuation(line: &str, indent: usize) -> Option<&str> {
    if leading_spaces(line) != indent {
        return None;
    }
    let rest = line[indent..].strip_prefix(CONTINUATION)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(' ')
}

/// `# note` or `// note`, but not an attribute.
fn is_comment(content: &str) -> bool {
    let content = content.trim_start();
    content.starts_with("//")
        || (content.starts_with('#') && !content.starts_with("#[") && !content.starts_with("#!"))
}

fn is_output_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.trim_start_matches(' ').starts_with(PROMPT)
}

/// Split `text` into segments covering the whole document in order.
pub fn scan(text: &str) -> Result<Vec<Segment>, ScanError> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < lines.len() {
        let Some((indent, first)) = primary(strip_newline(lines[i])) else {
            literal.push_str(lines[i]);
            i += 1;
            continue;
        };

        let mut source = format!("{}\n", first);
        let mut end = i + 1;
        while let Some(content) = lines
            .get(end)
            .and_then(|line| continuation(strip_newline(line), indent))
        {
            source.push_str(content);
            source.push('\n');
            end += 1;
        }

        if end == i + 1 && is_comment(first) {
            if !literal.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Comment(lines[i].to_string()));
            i += 1;
            continue;
        }

        let mut want = String::new();
        while let Some(line) = lines.get(end).map(|l| strip_newline(l)) {
            if !is_output_line(line) {
                break;
            }
            if leading_spaces(line) < indent {
                return Err(ScanError::BadIndent { lineno: end + 1 });
            }
            want.push_str(&line[indent..]);
            want.push('\n');
            end += 1;
        }

        if !literal.is_empty() {
            segments.push(Segment::Text(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Example(Example {
            source,
            want,
            lineno: i + 1,
            indent,
            text: lines[i..end].concat(),
        }));
        i = end;
    }

    if !literal.is_empty() {
        segments.push(Segment::Text(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn examples(text: &str) -> Vec<Example> {
        scan(text)
            .unwrap()
            .into_iter()
            .filter_map(|s| match s {
                Segment::Example(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_example_with_output() {
        let text = "Intro\n\n  >>> 1 + 1\n  2\n\nOutro\n";
        let found = examples(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "1 + 1\n");
        assert_eq!(found[0].want, "2\n");
        assert_eq!(found[0].lineno, 3);
        assert_eq!(found[0].indent, 2);
        assert_eq!(found[0].text(), "  >>> 1 + 1\n  2\n");
    }

    #[test]
    fn test_continuation_lines() {
        let text = ">>> let v = vec![\n...     1,\n...\n... ];\n>>> v.len()\n1\n";
        let found = examples(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].source, "let v = vec![\n    1,\n\n];\n");
        assert_eq!(found[0].want, "");
        assert_eq!(found[1].lineno, 5);
    }

    #[test]
    fn test_continuation_with_other_indent_ends_source() {
        let text = "  >>> x\n    ... y\n";
        let found = examples(text);
        assert_eq!(found[0].source, "x\n");
        assert_eq!(found[0].want, "  ... y\n");
    }

    #[test]
    fn test_comment_lines_are_not_examples() {
        let text = "Doc\n>>> # just a note\n>>> // another\n>>> #[derive(Debug)]\n... struct A;\n";
        let segments = scan(text).unwrap();
        assert_eq!(segments[0], Segment::Text("Doc\n".to_string()));
        assert_eq!(segments[1], Segment::Comment(">>> # just a note\n".to_string()));
        assert_eq!(segments[2], Segment::Comment(">>> // another\n".to_string()));
        assert!(matches!(&segments[3], Segment::Example(e) if e.lineno == 4));
    }

    #[test]
    fn test_bare_prompt_is_text() {
        let segments = scan(">>>\n>>> \n").unwrap();
        assert_eq!(segments, vec![Segment::Text(">>>\n>>> \n".to_string())]);
    }

    #[test]
    fn test_bad_indent() {
        let err = scan("    >>> 1\n  1\n").unwrap_err();
        assert_eq!(err, ScanError::BadIndent { lineno: 2 });
    }

    #[test]
    fn test_segments_reassemble_input() {
        let text = "a\n  >>> f()\n  out\n  >>> # c\nb\n>>> g()";
        let rebuilt: String = scan(text)
            .unwrap()
            .iter()
            .map(|s| match s {
                Segment::Text(t) | Segment::Comment(t) => t.as_str(),
                Segment::Example(e) => e.text(),
            })
            .collect();
        assert_eq!(rebuilt, text);
    }
}
