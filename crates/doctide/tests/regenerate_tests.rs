//! End-to-end document regeneration tests

use std::path::Path;

use doctide::doctest::{regenerate, update, verify, Mode, RegenError};
use doctide::Options;
use pretty_assertions::assert_eq;

fn regen(text: &str) -> String {
    regenerate(Path::new("README.md"), text, &Options::default())
        .unwrap()
        .regenerated
}

// ═══════════════════════════════════════════════════════════════════════
// Regeneration
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_bindings_persist_through_document() {
    let text = "Setup:\n\n>>> let x = 1;\n\nThen:\n\n>>> x + 1\n\n";
    assert_eq!(regen(text), "Setup:\n\n>>> let x = 1;\n\nThen:\n\n>>> x + 1\n2\n\n");
}

#[test]
fn test_regeneration_is_idempotent() {
    let text = "\
# Numbers

    >>> let   v  =  vec![3, 1, 2];
    >>> v.iter().max()
    wrong

    >>> v.len()
";
    let once = regen(text);
    assert_eq!(
        once,
        "\
# Numbers

    >>> let v = vec![3, 1, 2];
    >>> v.iter().max()
    Some(3)

    >>> v.len()
    3
"
    );
    assert_eq!(regen(&once), once);
}

#[test]
fn test_wildcard_output_is_preserved() {
    let text = ">>> vec![1, 2, 3, 4, 5]\n[1, 2, ...]\n";
    assert_eq!(regen(text), text);
}

#[test]
fn test_blank_lines_become_markers_and_survive() {
    let text = ">>> println!(\"a\\n\\nb\");\n";
    let once = regen(text);
    assert_eq!(once, ">>> println!(\"a\\n\\nb\");\na\n<BLANKLINE>\nb\n");
    assert_eq!(regen(&once), once);
}

#[test]
fn test_comment_prompts_pass_through() {
    let text = ">>> // first, some setup\n>>> #  odd   spacing kept\n>>> 1 + 1\n2\n";
    assert_eq!(regen(text), text);
}

#[test]
fn test_comments_in_source_are_kept() {
    let text = ">>> let x = 1; // the answer\n... x\n1\n";
    assert_eq!(regen(text), text);
}

#[test]
fn test_error_is_captured() {
    let out = regen("  >>> panic!(\"boom\")\n");
    assert_eq!(
        out,
        "  >>> panic!(\"boom\")\n  Traceback (most recent call last):\n      ...\n  Panic: boom\n"
    );
    assert_eq!(out.lines().last(), Some("  Panic: boom"));
    assert_eq!(regen(&out), out);
}

#[test]
fn test_fixed_error_gets_fresh_output() {
    let text = ">>> 1 + 1\nTraceback (most recent call last):\n    ...\nPanic: boom\n";
    assert_eq!(regen(text), ">>> 1 + 1\n2\n");
}

#[test]
fn test_changed_error_is_reannotated() {
    let text = ">>> panic!(\"bang\")\nTraceback (most recent call last):\n    ...\nPanic: boom\n";
    let once = regen(text);
    assert_eq!(
        once,
        ">>> panic!(\"bang\")\nTraceback (most recent call last):\n    ...\nPanic: bang\n"
    );
    assert_eq!(regen(&once), once);
}

#[test]
fn test_broken_example_gets_traceback() {
    let text = ">>> let v: Vec<i64> = Vec::new();\n>>> v[3]\n0\n";
    let once = regen(text);
    assert!(once.starts_with(">>> let v: Vec<i64> = Vec::new();\n>>> v[3]\nTraceback (most recent call last):\n    ...\nIndexOutOfBounds: "));
    assert_eq!(regen(&once), once);
}

#[test]
fn test_text_outside_examples_is_untouched() {
    let text = "Odd   spacing\tand tabs\n\n>>> 2*3\n6\n\ntrailing";
    assert_eq!(regen(text), "Odd   spacing\tand tabs\n\n>>> 2 * 3\n6\n\ntrailing");
}

// ═══════════════════════════════════════════════════════════════════════
// Files
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_update_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.md");
    std::fs::write(&path, ">>> 6 * 7\n").unwrap();

    let result = update(&path, &Options::default(), Mode::InPlace).unwrap();
    assert!(!result.is_unchanged());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), ">>> 6 * 7\n42\n");

    // A second pass has nothing to do
    let result = update(&path, &Options::default(), Mode::InPlace).unwrap();
    assert!(result.is_unchanged());
}

#[test]
fn test_failed_run_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.md");
    let text = ">>> 1\n\n>>> let = ;\n";
    std::fs::write(&path, text).unwrap();

    let err = update(&path, &Options::default(), Mode::InPlace).unwrap_err();
    assert!(matches!(err, RegenError::Format { lineno: 3, .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_verify_reports_drift() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, ">>> 1 + 1\n3\n").unwrap();

    match verify(&path, &Options::default()) {
        Err(RegenError::Drift { diff, .. }) => {
            assert!(diff.contains("+++ <expected>"));
            assert!(diff.contains("-3\n+2\n"));
        }
        other => panic!("expected drift, got {:?}", other),
    }

    std::fs::write(&path, ">>> 1 + 1\n2\n").unwrap();
    verify(&path, &Options::default()).unwrap();
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = verify(&dir.path().join("absent.md"), &Options::default()).unwrap_err();
    assert!(matches!(err, RegenError::Io { .. }));
}
