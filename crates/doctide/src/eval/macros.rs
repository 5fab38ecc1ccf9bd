//! Built-in macro invocations
//!
//! Macros arrive as unparsed token streams; each one parses its own body
//! with `syn` and evaluates the pieces it needs.

use syn::parse::{ParseStream, Parser};
use syn::punctuated::Punctuated;
use syn::Token;

use super::format::{self, FormatArgs};
use super::pattern::{apply_bindings, match_pattern};
use super::Evaluate;
use crate::{Environment, EvalContext, EvalError, Value};

type Args = Punctuated<syn::Expr, Token![,]>;

/// Evaluate a macro invocation.
pub fn eval_macro(
    mac: &syn::Macro,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let name = mac
        .path
        .segments
        .last()
        .map(|s| s.ident.to_string())
        .unwrap_or_default();

    match name.as_str() {
        "println" | "print" => {
            let mut text = format_body(mac, env, ctx)?;
            if name == "println" {
                text.push('\n');
            }
            ctx.stdout.write_str(&text);
            Ok(Value::Unit)
        }
        // Diagnostics go to the real stderr and never into a transcript
        "eprintln" | "eprint" => {
            let text = format_body(mac, env, ctx)?;
            if name == "eprintln" {
                eprintln!("{}", text);
            } else {
                eprint!("{}", text);
            }
            Ok(Value::Unit)
        }
        "format" => Ok(Value::string(format_body(mac, env, ctx)?)),
        "vec" => eval_vec(mac, env, ctx),
        "matches" => eval_matches(mac, env, ctx),

        "panic" => {
            let args = parse_args(mac)?;
            let message = if args.is_empty() {
                "explicit panic".to_string()
            } else {
                format_exprs(&args, env, ctx)?
            };
            Err(EvalError::panic(message))
        }
        "unreachable" => Err(labeled_panic(
            "internal error: entered unreachable code",
            mac,
            env,
            ctx,
        )?),
        "todo" => Err(labeled_panic("not yet implemented", mac, env, ctx)?),
        "unimplemented" => Err(labeled_panic("not implemented", mac, env, ctx)?),

        "assert" => eval_assert(mac, env, ctx),
        "assert_eq" | "debug_assert_eq" => eval_assert_cmp(&name, mac, true, env, ctx),
        "assert_ne" | "debug_assert_ne" => eval_assert_cmp(&name, mac, false, env, ctx),
        "debug_assert" => eval_assert(mac, env, ctx),

        _ => Err(EvalError::UnsupportedExpr {
            kind: format!("macro `{}!`", name),
        }),
    }
}

fn parse_args(mac: &syn::Macro) -> Result<Vec<syn::Expr>, EvalError> {
    let args = mac
        .parse_body_with(Args::parse_terminated)
        .map_err(|e| EvalError::Syntax {
            message: e.to_string(),
        })?;
    Ok(args.into_iter().collect())
}

fn format_body(
    mac: &syn::Macro,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<String, EvalError> {
    let args = parse_args(mac)?;
    format_exprs(&args, env, ctx)
}

/// `name = expr` inside a format macro.
fn named_arg(expr: &syn::Expr) -> Option<(String, &syn::Expr)> {
    let syn::Expr::Assign(assign) = expr else {
        return None;
    };
    let syn::Expr::Path(path) = assign.left.as_ref() else {
        return None;
    };
    let ident = path.path.get_ident()?;
    Some((ident.to_string(), assign.right.as_ref()))
}

/// Format a template literal followed by its arguments.
fn format_exprs(
    args: &[syn::Expr],
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<String, EvalError> {
    let Some((template, rest)) = args.split_first() else {
        return Ok(String::new());
    };
    let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Str(template),
        ..
    }) = template
    else {
        return Err(EvalError::Syntax {
            message: "format argument must be a string literal".to_string(),
        });
    };

    let mut format_args = FormatArgs::default();
    for arg in rest {
        match named_arg(arg) {
            Some((name, expr)) => {
                let value = expr.eval(env, ctx)?;
                format_args.named.push((name, value));
            }
            None => format_args.positional.push(arg.eval(env, ctx)?),
        }
    }
    format::format(&template.value(), &format_args, env)
}

fn labeled_panic(
    label: &str,
    mac: &syn::Macro,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<EvalError, EvalError> {
    let args = parse_args(mac)?;
    if args.is_empty() {
        return Ok(EvalError::panic(label));
    }
    let message = format_exprs(&args, env, ctx)?;
    Ok(EvalError::panic(format!("{}: {}", label, message)))
}

// ═══════════════════════════════════════════════════════════════════════
// vec! and matches!
// ═══════════════════════════════════════════════════════════════════════

enum VecBody {
    List(Vec<syn::Expr>),
    Repeat(syn::Expr, syn::Expr),
}

fn parse_vec_body(input: ParseStream<'_>) -> syn::Result<VecBody> {
    if input.is_empty() {
        return Ok(VecBody::List(Vec::new()));
    }
    let first: syn::Expr = input.parse()?;
    if input.peek(Token![;]) {
        input.parse::<Token![;]>()?;
        let len: syn::Expr = input.parse()?;
        return Ok(VecBody::Repeat(first, len));
    }
    let mut items = vec![first];
    while input.parse::<Option<Token![,]>>()?.is_some() {
        if input.is_empty() {
            break;
        }
        items.push(input.parse()?);
    }
    if !input.is_empty() {
        return Err(input.error("expected `,` or `;`"));
    }
    Ok(VecBody::List(items))
}

fn eval_vec(
    mac: &syn::Macro,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let body = parse_vec_body
        .parse2(mac.tokens.clone())
        .map_err(|e| EvalError::Syntax {
            message: e.to_string(),
        })?;
    match body {
        VecBody::List(items) => {
            let values = items
                .iter()
                .map(|item| item.eval(env, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::vec(values))
        }
        VecBody::Repeat(item, len) => {
            let item = item.eval(env, ctx)?;
            let len = len.eval(env, ctx)?;
            super::array::repeat(item, &len)
        }
    }
}

struct MatchesBody {
    expr: syn::Expr,
    pat: syn::Pat,
    guard: Option<syn::Expr>,
}

fn parse_matches_body(input: ParseStream<'_>) -> syn::Result<MatchesBody> {
    let expr = input.parse()?;
    input.parse::<Token![,]>()?;
    let pat = syn::Pat::parse_multi_with_leading_vert(input)?;
    let guard = if input.parse::<Option<Token![if]>>()?.is_some() {
        Some(input.parse()?)
    } else {
        None
    };
    input.parse::<Option<Token![,]>>()?;
    Ok(MatchesBody { expr, pat, guard })
}

fn eval_matches(
    mac: &syn::Macro,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let body = parse_matches_body
        .parse2(mac.tokens.clone())
        .map_err(|e| EvalError::Syntax {
            message: e.to_string(),
        })?;
    let value = body.expr.eval(env, ctx)?;
    let Some(bindings) = match_pattern(&body.pat, &value)? else {
        return Ok(Value::Bool(false));
    };
    let Some(guard) = &body.guard else {
        return Ok(Value::Bool(true));
    };
    let mut scope = env.scope_guard();
    apply_bindings(&mut scope, bindings);
    Ok(Value::Bool(super::eval_condition(
        guard,
        "match guard",
        &mut scope,
        ctx,
    )?))
}

// ═══════════════════════════════════════════════════════════════════════
// Assertions
// ═══════════════════════════════════════════════════════════════════════

/// Source of an expression as rustc quotes it in assertion messages.
fn stringify(expr: &syn::Expr) -> String {
    let file: syn::File = syn::parse_quote! {
        fn f() { #expr; }
    };
    let text = prettyplease::unparse(&file);
    let body = text
        .lines()
        .skip(1)
        .filter(|line| *line != "}")
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    body.strip_suffix(';').unwrap_or(&body).to_string()
}

fn eval_assert(
    mac: &syn::Macro,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let args = parse_args(mac)?;
    let Some((cond, message)) = args.split_first() else {
        return Err(EvalError::Syntax {
            message: "requires a boolean expression as an argument".to_string(),
        });
    };
    if super::eval_condition(cond, "assert!", env, ctx)? {
        return Ok(Value::Unit);
    }
    let message = if message.is_empty() {
        format!("assertion failed: {}", stringify(cond))
    } else {
        format_exprs(message, env, ctx)?
    };
    Err(EvalError::panic(message))
}

fn eval_assert_cmp(
    name: &str,
    mac: &syn::Macro,
    expect_equal: bool,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let args = parse_args(mac)?;
    let [left, right, message @ ..] = args.as_slice() else {
        return Err(EvalError::ArityMismatch {
            name: format!("{}!", name),
            expected: 2,
            got: args.len(),
        });
    };
    let left = left.eval(env, ctx)?;
    let right = right.eval(env, ctx)?;
    if (left == right) == expect_equal {
        return Ok(Value::Unit);
    }

    let op = if expect_equal { "==" } else { "!=" };
    let mut header = format!("assertion `left {} right` failed", op);
    if !message.is_empty() {
        header.push_str(": ");
        header.push_str(&format_exprs(message, env, ctx)?);
    }
    Err(EvalError::panic(format!(
        "{}\n  left: {:?}\n right: {:?}",
        header, left, right
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::stmt::eval_stmts;
    use pretty_assertions::assert_eq;

    fn run(src: &str, ctx: &EvalContext) -> Result<Value, EvalError> {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        eval_stmts(&block.stmts, &mut Environment::with_prelude(), ctx)
    }

    fn printed(src: &str) -> String {
        let ctx = EvalContext::new();
        let capture = ctx.stdout.capture();
        run(src, &ctx).unwrap();
        capture.finish()
    }

    #[test]
    fn test_println_captured() {
        assert_eq!(
            printed(r#"let x = 3; println!("x = {x}"); print!("{}-{}", 1, 2);"#),
            "x = 3\n1-2"
        );
    }

    #[test]
    fn test_format_named_argument() {
        let value = run(r#"format!("{a}{b:>3}", a = 1, b = "z")"#, &EvalContext::new());
        assert_eq!(value.unwrap(), Value::string("1  z"));
    }

    #[test]
    fn test_vec_forms() {
        let ctx = EvalContext::new();
        assert_eq!(format!("{:?}", run("vec![1, 2, 3,]", &ctx).unwrap()), "[1, 2, 3]");
        assert_eq!(format!("{:?}", run("vec![0; 3]", &ctx).unwrap()), "[0, 0, 0]");
        assert_eq!(format!("{:?}", run("vec![]", &ctx).unwrap()), "[]");
    }

    #[test]
    fn test_matches() {
        let ctx = EvalContext::new();
        assert_eq!(run("matches!(Some(4), Some(n) if n > 3)", &ctx).unwrap(), Value::Bool(true));
        assert_eq!(run("matches!('x', 'a'..='f')", &ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_panic_messages() {
        let ctx = EvalContext::new();
        assert_eq!(run("panic!()", &ctx).unwrap_err().to_string(), "explicit panic");
        assert_eq!(
            run(r#"panic!("bad {}", 7)"#, &ctx).unwrap_err().to_string(),
            "bad 7"
        );
        assert_eq!(run("todo!()", &ctx).unwrap_err().to_string(), "not yet implemented");
        assert_eq!(
            run(r#"unreachable!("state {}", 2)"#, &ctx).unwrap_err().to_string(),
            "internal error: entered unreachable code: state 2"
        );
    }

    #[test]
    fn test_assert_quotes_condition() {
        let err = run("let v = vec![1]; assert!(v.len() == 2)", &EvalContext::new()).unwrap_err();
        assert_eq!(err.kind(), "Panic");
        assert_eq!(err.to_string(), "assertion failed: v.len() == 2");
    }

    #[test]
    fn test_assert_eq_reports_both_sides() {
        let err = run("assert_eq!(1 + 1, 3)", &EvalContext::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "assertion `left == right` failed\n  left: 2\n right: 3"
        );
        assert!(run("assert_ne!(1, 2)", &EvalContext::new()).is_ok());
    }

    #[test]
    fn test_unknown_macro() {
        let err = run("stringify!(x)", &EvalContext::new()).unwrap_err();
        assert_eq!(err.to_string(), "unsupported macro `stringify!`");
    }
}
