//! Document scanning tests

use doctide::doctest::{scan, Example, ScanError, Segment};
use pretty_assertions::assert_eq;

fn examples(text: &str) -> Vec<Example> {
    scan(text)
        .unwrap()
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Example(example) => Some(example),
            _ => None,
        })
        .collect()
}

// Concatenation of every segment's text
fn reassemble(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) | Segment::Comment(text) => text.as_str(),
            Segment::Example(example) => example.text(),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Coverage
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_segments_cover_document() {
    let text = "# Title\n\n>>> let x = 1;\n>>> x\n1\n\nProse.\n  >>> // note\n  >>> x + 1\n  2\n\nno trailing newline";
    let segments = scan(text).unwrap();
    assert_eq!(reassemble(&segments), text);
}

#[test]
fn test_document_without_examples_is_one_text_segment() {
    let text = "just prose\n>>>\nstill prose\n";
    assert_eq!(scan(text).unwrap(), vec![Segment::Text(text.to_string())]);
}

#[test]
fn test_empty_document() {
    assert!(scan("").unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Example Boundaries
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_output_ends_at_blank_line() {
    let found = examples(">>> 1\n1\n\nnot output\n");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].want, "1\n");
}

#[test]
fn test_output_ends_at_next_prompt() {
    let found = examples(">>> 1\n1\n>>> 2\n2\n");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].want, "1\n");
    assert_eq!(found[1].lineno, 3);
}

#[test]
fn test_continuation_must_share_indent() {
    let found = examples("  >>> let v = [\n  ...     1,\n  ... ];\n");
    assert_eq!(found[0].source, "let v = [\n    1,\n];\n");

    // A misaligned `...` line is output, not source
    let found = examples("  >>> f()\n    ... more\n");
    assert_eq!(found[0].source, "f()\n");
    assert_eq!(found[0].want, "  ... more\n");
}

#[test]
fn test_output_keeps_relative_indent() {
    let found = examples("  >>> panic!(\"x\")\n  Traceback (most recent call last):\n      ...\n  Panic: x\n");
    assert_eq!(
        found[0].want,
        "Traceback (most recent call last):\n    ...\nPanic: x\n"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Comments and Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_comment_prompt_is_passed_through() {
    let segments = scan(">>> # heading\n>>> // aside\n>>> #[derive(Debug)]\n... struct S;\n").unwrap();
    assert_eq!(segments[0], Segment::Comment(">>> # heading\n".to_string()));
    assert_eq!(segments[1], Segment::Comment(">>> // aside\n".to_string()));
    assert!(matches!(&segments[2], Segment::Example(e) if e.source.starts_with("#[derive")));
}

#[test]
fn test_underindented_output_is_an_error() {
    let err = scan("text\n    >>> 1\n  1\n").unwrap_err();
    assert_eq!(err, ScanError::BadIndent { lineno: 3 });
    assert_eq!(err.lineno(), 3);
}
