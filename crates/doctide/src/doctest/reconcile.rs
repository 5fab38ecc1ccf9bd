//! Choosing and rendering the expected-output annotation

use super::executor::Outcome;

/// Marks an intentionally blank output line.
pub const BLANKLINE: &str = "<BLANKLINE>";

/// Matches any run of output text.
pub const WILDCARD: &str = "...";

/// Whether `got` satisfies the expected output `want`.
///
/// `<BLANKLINE>` in `want` matches a blank line, whitespace-only lines in
/// `got` count as blank, and `...` in `want` matches anything.
pub fn check_output(want: &str, got: &str) -> bool {
    if want == got {
        return true;
    }

    let want = blank_markers_to_empty(want);
    let got = whitespace_lines_to_empty(got);
    if want == got {
        return true;
    }

    want.contains(WILDCARD) && wildcard_match(&want, &got)
}

fn map_lines(text: &str, f: impl Fn(&str) -> bool) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            let body = line.strip_suffix('\n').unwrap_or(line);
            if f(body) {
                &line[body.len()..]
            } else {
                line
            }
        })
        .collect()
}

fn blank_markers_to_empty(text: &str) -> String {
    map_lines(text, |line| {
        line.strip_prefix(BLANKLINE)
            .is_some_and(|rest| rest.trim().is_empty())
    })
}

fn whitespace_lines_to_empty(text: &str) -> String {
    map_lines(text, |line| !line.is_empty() && line.trim().is_empty())
}

/// Anchored prefix and suffix, middle pieces found left to right.
fn wildcard_match(want: &str, got: &str) -> bool {
    let pieces: Vec<&str> = want.split(WILDCARD).collect();
    let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
        return want == got;
    };

    let mut start = 0;
    let mut end = got.len();
    let mut middle = &pieces[..];

    if !first.is_empty() {
        if !got.starts_with(first) {
            return false;
        }
        start = first.len();
        middle = &middle[1..];
    }
    if !last.is_empty() && !middle.is_empty() {
        if !got.ends_with(last) {
            return false;
        }
        end -= last.len();
        middle = &middle[..middle.len() - 1];
    }
    if start > end {
        return false;
    }

    for piece in middle {
        match got[start..end].find(piece) {
            Some(offset) => start += offset + piece.len(),
            None => return false,
        }
    }
    true
}

/// Text to emit as the example's new expected output.
///
/// A matching `want` is kept so elided output survives. Anything else is
/// replaced by the fresh output, or by the error summary when the example
/// failed.
pub fn reconcile<'a>(want: &'a str, outcome: &'a Outcome) -> &'a str {
    if !want.is_empty() && check_output(want, outcome.text()) {
        want
    } else {
        outcome.text()
    }
}

/// Output lines indented by `indent`, blank lines marked, without newlines.
pub fn render_output(text: &str, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    let text = text.trim_end_matches('\n');
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                format!("{}{}", pad, BLANKLINE)
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn success(captured: &str) -> Outcome {
        Outcome {
            captured: captured.to_string(),
            error: None,
        }
    }

    fn failure(summary: &str) -> Outcome {
        Outcome {
            captured: String::new(),
            error: Some(summary.to_string()),
        }
    }

    #[test]
    fn test_exact_and_blankline() {
        assert!(check_output("1\n", "1\n"));
        assert!(check_output("a\n<BLANKLINE>\nb\n", "a\n\nb\n"));
        assert!(check_output("a\n<BLANKLINE>\n", "a\n   \n"));
        assert!(!check_output("1\n", "2\n"));
    }

    #[test]
    fn test_wildcard() {
        assert!(check_output("[1, 2, ...]\n", "[1, 2, 3, 4]\n"));
        assert!(check_output("...: boom\n", "Traceback\n    ...\nPanic: boom\n"));
        assert!(check_output("a...c...e\n", "abcde\n"));
        assert!(!check_output("a...c...e\n", "aecde\n0"));
        assert!(!check_output("ab...ba\n", "aba\n"));
        // Matching is case-sensitive
        assert!(!check_output("Hello...\n", "hello world\n"));
    }

    #[test]
    fn test_every_elision_of_the_output_matches() {
        let got = "Some(Point { x: 1, y: 2 })\n";
        for start in 0..got.len() {
            for end in start..=got.len() {
                let want = format!("{}...{}", &got[..start], &got[end..]);
                assert!(check_output(&want, got), "want {:?}", want);
            }
        }
    }

    #[test]
    fn test_reconcile_policy() {
        // Matching want is kept verbatim
        assert_eq!(reconcile("[1, ...]\n", &success("[1, 2]\n")), "[1, ...]\n");
        // Success refreshes
        assert_eq!(reconcile("old\n", &success("new\n")), "new\n");
        assert_eq!(reconcile("", &success("new\n")), "new\n");
        // Former error annotation replaced by fresh output, even when empty
        assert_eq!(reconcile("Traceback...\n", &success("")), "");
        // Unannotated failure gets the summary
        let summary = "Traceback (most recent call last):\n    ...\nPanic: boom\n";
        assert_eq!(reconcile("", &failure(summary)), summary);
        // An annotated failure that still matches is kept
        assert_eq!(reconcile("Traceback...\nPanic: boom\n", &failure(summary)), "Traceback...\nPanic: boom\n");
        // A stale annotation on a failure gets the new summary
        assert_eq!(reconcile("Traceback...\nPanic: bang\n", &failure(summary)), summary);
        assert_eq!(reconcile("0\n", &failure(summary)), summary);
    }

    #[test]
    fn test_render_output() {
        assert_eq!(
            render_output("a\n\n  \nb\n\n", 2),
            vec!["  a", "  <BLANKLINE>", "  <BLANKLINE>", "  b"]
        );
        assert!(render_output("", 4).is_empty());
        assert!(render_output("\n\n", 4).is_empty());
    }
}
