//! Environment tests

use doctide::*;
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════
// Basic Operations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_environment_new_is_empty() {
    let env = Environment::new();
    assert!(env.is_empty());
    assert_eq!(env.len(), 0);
    assert_eq!(env.depth(), 1); // Global frame
}

#[test]
fn test_environment_define_and_get() {
    let mut env = Environment::new();
    env.define("x", Value::Int(42));

    assert_eq!(env.get("x"), Some(&Value::Int(42)));
    assert_eq!(env.get("y"), None);
    assert!(env.contains("x"));
    assert!(!env.contains("y"));
}

#[test]
fn test_prelude_defines_constructors() {
    let env = Environment::with_prelude();
    assert!(env.contains("Some"));
    assert!(env.contains("None"));
    assert!(env.contains("Vec::new"));
    assert!(env.contains("sleep"));
}

// ═══════════════════════════════════════════════════════════════════════
// Scoping and Shadowing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_environment_push_pop_frame() {
    let mut env = Environment::new();
    env.define("x", Value::Int(1));

    env.push_frame();
    env.define("y", Value::Int(2));
    assert_eq!(env.depth(), 2);
    assert_eq!(env.get("x"), Some(&Value::Int(1)));
    assert_eq!(env.get("y"), Some(&Value::Int(2)));

    env.pop_frame();
    assert_eq!(env.depth(), 1);
    assert_eq!(env.get("x"), Some(&Value::Int(1)));
    assert_eq!(env.get("y"), None);
}

#[test]
fn test_pop_global_frame_is_noop() {
    let mut env = Environment::new();
    env.define("x", Value::Int(1));
    env.pop_frame();
    assert!(env.is_global_scope());
    assert!(env.contains("x"));
}

#[test]
fn test_shadowing_in_nested_scope() {
    let mut env = Environment::new();
    env.define("x", Value::Int(1));
    {
        let mut guard = env.scope_guard();
        guard.define("x", Value::string("inner"));
        assert_eq!(guard.get("x"), Some(&Value::string("inner")));
    }
    assert_eq!(env.get("x"), Some(&Value::Int(1)));
}

// ═══════════════════════════════════════════════════════════════════════
// Promotion Into Globals
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_pop_frame_promoting_keeps_named_bindings() {
    let mut env = Environment::new();
    env.push_frame();
    env.define("kept", Value::Int(1));
    env.define("scratch", Value::Int(2));
    env.pop_frame_promoting(&["kept".to_string()]);

    assert_eq!(env.get("kept"), Some(&Value::Int(1)));
    assert!(!env.contains("scratch"));
    assert_eq!(env.global_names(), vec!["kept"]);
}

#[test]
fn test_promotion_takes_latest_shadow_and_replaces_global() {
    let mut env = Environment::new();
    env.define("x", Value::Int(0));
    env.push_frame();
    env.define("x", Value::Int(1));
    env.define("x", Value::Int(2));
    env.pop_frame_promoting(&["x".to_string()]);

    assert_eq!(env.get("x"), Some(&Value::Int(2)));
    assert_eq!(env.len(), 1);
}

#[test]
fn test_promotion_preserves_mutability() {
    let mut env = Environment::new();
    env.push_frame();
    env.define_with_mode("n", Value::Int(1), BindingMode::Mutable);
    env.pop_frame_promoting(&["n".to_string()]);

    env.assign("n", Value::Int(5)).unwrap();
    assert_eq!(env.get("n"), Some(&Value::Int(5)));
}

#[test]
fn test_promoting_unbound_name_is_ignored() {
    let mut env = Environment::new();
    env.push_frame();
    env.pop_frame_promoting(&["ghost".to_string()]);
    assert!(env.is_empty());
    assert!(env.is_global_scope());
}

// ═══════════════════════════════════════════════════════════════════════
// Mutation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_assign_immutable_fails() {
    let mut env = Environment::new();
    env.define("x", Value::Int(1));
    let err = env.assign("x", Value::Int(2)).unwrap_err();
    assert_eq!(
        err,
        EnvironmentError::ImmutableBinding {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_assign_undefined_fails() {
    let mut env = Environment::new();
    assert!(matches!(
        env.assign("nope", Value::Unit),
        Err(EnvironmentError::UndefinedVariable { .. })
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Call Frames
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_call_hides_caller_locals_but_not_top_level() {
    let mut env = Environment::new();
    env.define("global", Value::Int(1));
    // Block locals outside any call count as top level
    env.push_frame();
    env.define("block", Value::Int(2));

    env.enter_call().unwrap();
    env.define("caller", Value::Int(3));
    {
        let guard = env.call_guard().unwrap();
        assert!(guard.contains("global"));
        assert!(guard.contains("block"));
        assert!(!guard.contains("caller"));
        assert_eq!(guard.call_depth(), 2);
    }
    assert!(env.contains("caller"));
    env.exit_call();

    assert_eq!(env.call_depth(), 0);
    assert!(!env.contains("caller"));
    assert!(env.contains("block"));
}

#[test]
fn test_call_depth_limit() {
    let mut env = Environment::with_max_call_depth(2);
    env.enter_call().unwrap();
    env.enter_call().unwrap();
    assert!(matches!(
        env.enter_call(),
        Err(EnvironmentError::StackOverflow { depth: 3, max: 2 })
    ));
}
