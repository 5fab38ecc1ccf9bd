//! Pattern matching logic

use std::cmp::Ordering;

use crate::environment::BindingMode;
use crate::{Environment, EvalError, Value};

use super::path::last_segment;

/// Result of pattern matching: bindings to add to environment.
pub type MatchBindings = Vec<(String, Value, bool)>; // (name, value, mutable)

/// Match a value against a pattern.
///
/// Returns `Ok(Some(bindings))` if the pattern matches,
/// `Ok(None)` if it doesn't match,
/// `Err(...)` if the pattern can't be evaluated.
pub fn match_pattern(pattern: &syn::Pat, value: &Value) -> Result<Option<MatchBindings>, EvalError> {
    match pattern {
        // Wildcard: matches anything, no bindings
        syn::Pat::Wild(_) => Ok(Some(vec![])),

        // Identifier: matches anything, binds the value
        syn::Pat::Ident(pat_ident) => {
            let name = pat_ident.ident.to_string();

            // `None` parses as an identifier pattern
            if name == "None" && pat_ident.subpat.is_none() {
                return Ok(matches!(value, Value::Option(o) if o.is_none()).then(Vec::new));
            }

            let mutable = pat_ident.mutability.is_some();
            match &pat_ident.subpat {
                // `x @ 1..=5`
                Some((_, subpat)) => Ok(match_pattern(subpat, value)?.map(|mut bindings| {
                    bindings.push((name, value.clone(), mutable));
                    bindings
                })),
                None => Ok(Some(vec![(name, value.clone(), mutable)])),
            }
        }

        // Literal pattern: matches exact value
        syn::Pat::Lit(pat_lit) => {
            let lit_value = super::literal::eval_lit(&pat_lit.lit)?;
            Ok((value == &lit_value).then(Vec::new))
        }

        // Or pattern: first matching alternative wins
        syn::Pat::Or(pat_or) => {
            for case in &pat_or.cases {
                if let Some(bindings) = match_pattern(case, value)? {
                    return Ok(Some(bindings));
                }
            }
            Ok(None)
        }

        syn::Pat::Tuple(pat_tuple) => match value {
            Value::Tuple(elements) => match_sequence(&pat_tuple.elems, elements),
            Value::Unit if pat_tuple.elems.is_empty() => Ok(Some(vec![])),
            _ => Ok(None),
        },

        syn::Pat::Slice(pat_slice) => match value {
            Value::Vec(elements) => match_sequence(&pat_slice.elems, elements),
            _ => Ok(None),
        },

        // Struct pattern: `Point { x, y: 0, .. }`
        syn::Pat::Struct(pat_struct) => match value {
            Value::Struct(s) if s.type_name == last_segment(&pat_struct.path) => {
                let mut all_bindings = vec![];
                for field_pat in &pat_struct.fields {
                    let field_name = super::field::member_name(&field_pat.member);
                    let Some(field_value) = s.get(&field_name) else {
                        return Err(EvalError::UndefinedField {
                            type_name: s.type_name.clone(),
                            field: field_name,
                        });
                    };
                    match match_pattern(&field_pat.pat, field_value)? {
                        Some(bindings) => all_bindings.extend(bindings),
                        None => return Ok(None),
                    }
                }
                Ok(Some(all_bindings))
            }
            _ => Ok(None),
        },

        // TupleStruct pattern: `Some(x)`, `Ok(v)`, `Meters(m)`
        syn::Pat::TupleStruct(pat_ts) => {
            let variant = last_segment(&pat_ts.path);
            let single = |inner: &Value| -> Result<Option<MatchBindings>, EvalError> {
                match pat_ts.elems.first() {
                    Some(pat) if pat_ts.elems.len() == 1 => match_pattern(pat, inner),
                    _ => Ok(None),
                }
            };
            match (variant.as_str(), value) {
                ("Some", Value::Option(opt)) => match opt.as_ref() {
                    Some(inner) => single(inner),
                    None => Ok(None),
                },
                ("Ok", Value::Result(res)) => match res.as_ref() {
                    Ok(inner) => single(inner),
                    Err(_) => Ok(None),
                },
                ("Err", Value::Result(res)) => match res.as_ref() {
                    Err(inner) => single(inner),
                    Ok(_) => Ok(None),
                },
                (name, Value::Struct(s)) if s.is_tuple_struct && s.type_name == name => {
                    let elements: Vec<Value> = s.fields.values().cloned().collect();
                    match_sequence(&pat_ts.elems, &elements)
                }
                _ => Ok(None),
            }
        }

        // Path pattern: `None`, `Option::None`, unit structs
        syn::Pat::Path(pat_path) => {
            let name = last_segment(&pat_path.path);
            Ok(match value {
                Value::Option(opt) => (name == "None" && opt.is_none()).then(Vec::new),
                Value::Struct(s) => (s.type_name == name && s.fields.is_empty()).then(Vec::new),
                _ => None,
            })
        }

        // Range pattern: `1..=5`, `'a'..='z'`, `10..`
        syn::Pat::Range(pat_range) => {
            let start = pat_range.start.as_deref().map(eval_const_expr).transpose()?;
            let end = pat_range.end.as_deref().map(eval_const_expr).transpose()?;
            let inclusive = matches!(pat_range.limits, syn::RangeLimits::Closed(_));

            let above_start = match &start {
                Some(s) => matches!(value.compare(s), Some(Ordering::Greater | Ordering::Equal)),
                None => true,
            };
            let below_end = match &end {
                Some(e) => match value.compare(e) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => inclusive,
                    _ => false,
                },
                None => true,
            };
            Ok((above_start && below_end).then(Vec::new))
        }

        // References are transparent
        syn::Pat::Reference(pat_ref) => match_pattern(&pat_ref.pat, value),

        // Rest pattern (..) - handled by sequence patterns
        syn::Pat::Rest(_) => Ok(Some(vec![])),

        syn::Pat::Paren(pat) => match_pattern(&pat.pat, value),

        // Type annotation (x: Type) is ignored
        syn::Pat::Type(pat_type) => match_pattern(&pat_type.pat, value),

        other => Err(EvalError::UnsupportedExpr {
            kind: format!("pattern `{}`", super::source_text(other)),
        }),
    }
}

/// Match the elements of a tuple or slice, honoring one `..`.
fn match_sequence(
    patterns: &syn::punctuated::Punctuated<syn::Pat, syn::Token![,]>,
    elements: &[Value],
) -> Result<Option<MatchBindings>, EvalError> {
    let patterns: Vec<&syn::Pat> = patterns.iter().collect();
    let rest = patterns.iter().position(|p| is_rest(p));

    let (before, after) = match rest {
        Some(pos) => (&patterns[..pos], &patterns[pos + 1..]),
        None => (&patterns[..], &patterns[..0]),
    };
    let fits = match rest {
        Some(_) => elements.len() >= before.len() + after.len(),
        None => elements.len() == before.len(),
    };
    if !fits {
        return Ok(None);
    }

    let mut all_bindings = vec![];
    let tail = &elements[elements.len() - after.len()..];
    let pairs = before
        .iter()
        .zip(elements.iter())
        .chain(after.iter().zip(tail.iter()));
    for (pat, val) in pairs {
        match match_pattern(pat, val)? {
            Some(bindings) => all_bindings.extend(bindings),
            None => return Ok(None),
        }
    }

    // `[first, rest @ ..]` binds the middle as a vector
    if let Some(pos) = rest {
        if let syn::Pat::Ident(ident) = patterns[pos] {
            let middle = elements[before.len()..elements.len() - after.len()].to_vec();
            all_bindings.push((
                ident.ident.to_string(),
                Value::vec(middle),
                ident.mutability.is_some(),
            ));
        }
    }
    Ok(Some(all_bindings))
}

fn is_rest(pat: &syn::Pat) -> bool {
    match pat {
        syn::Pat::Rest(_) => true,
        syn::Pat::Ident(ident) => matches!(&ident.subpat, Some((_, sub)) if matches!(**sub, syn::Pat::Rest(_))),
        _ => false,
    }
}

/// Evaluate a constant expression (for range patterns).
fn eval_const_expr(expr: &syn::Expr) -> Result<Value, EvalError> {
    match expr {
        syn::Expr::Lit(lit) => super::literal::eval_lit(&lit.lit),
        syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => {
            super::unary::eval_neg(eval_const_expr(&unary.expr)?)
        }
        syn::Expr::Path(p) => super::path::resolve_path(&p.path, &Environment::new()),
        _ => Err(EvalError::UnsupportedExpr {
            kind: "non-constant in range pattern".to_string(),
        }),
    }
}

/// Apply match bindings to the environment.
pub fn apply_bindings(env: &mut Environment, bindings: MatchBindings) {
    for (name, value, mutable) in bindings {
        let mode = if mutable {
            BindingMode::Mutable
        } else {
            BindingMode::Immutable
        };
        env.define_with_mode(name, value, mode);
    }
}

/// Names a pattern would bind, in order of appearance.
pub fn bound_names(pattern: &syn::Pat, names: &mut Vec<String>) {
    match pattern {
        syn::Pat::Ident(ident) => {
            let name = ident.ident.to_string();
            if name != "None" && !names.contains(&name) {
                names.push(name);
            }
            if let Some((_, sub)) = &ident.subpat {
                bound_names(sub, names);
            }
        }
        syn::Pat::Tuple(t) => t.elems.iter().for_each(|p| bound_names(p, names)),
        syn::Pat::Slice(s) => s.elems.iter().for_each(|p| bound_names(p, names)),
        syn::Pat::TupleStruct(t) => t.elems.iter().for_each(|p| bound_names(p, names)),
        syn::Pat::Struct(s) => s.fields.iter().for_each(|f| bound_names(&f.pat, names)),
        syn::Pat::Or(o) => o.cases.iter().for_each(|p| bound_names(p, names)),
        syn::Pat::Reference(r) => bound_names(&r.pat, names),
        syn::Pat::Paren(p) => bound_names(&p.pat, names),
        syn::Pat::Type(t) => bound_names(&t.pat, names),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(tokens: proc_macro2::TokenStream) -> syn::Pat {
        syn::parse::Parser::parse2(syn::Pat::parse_multi_with_leading_vert, tokens).unwrap()
    }

    fn names(bindings: Option<MatchBindings>) -> Vec<String> {
        bindings.unwrap().into_iter().map(|(n, _, _)| n).collect()
    }

    #[test]
    fn test_none_is_not_a_binding() {
        let p = pat(quote::quote!(None));
        assert!(match_pattern(&p, &Value::none()).unwrap().is_some());
        assert!(match_pattern(&p, &Value::some(Value::Int(1))).unwrap().is_none());
    }

    #[test]
    fn test_option_and_result() {
        let p = pat(quote::quote!(Some(x)));
        let bindings = match_pattern(&p, &Value::some(Value::Int(3))).unwrap();
        assert_eq!(names(bindings), vec!["x"]);

        let p = pat(quote::quote!(Err(e)));
        assert!(match_pattern(&p, &Value::ok(Value::Int(3))).unwrap().is_none());
    }

    #[test]
    fn test_ranges_and_alternatives() {
        let p = pat(quote::quote!(1..=5 | 10));
        assert!(match_pattern(&p, &Value::Int(5)).unwrap().is_some());
        assert!(match_pattern(&p, &Value::Int(10)).unwrap().is_some());
        assert!(match_pattern(&p, &Value::Int(6)).unwrap().is_none());

        let p = pat(quote::quote!('a'..'c'));
        assert!(match_pattern(&p, &Value::Char('b')).unwrap().is_some());
        assert!(match_pattern(&p, &Value::Char('c')).unwrap().is_none());
    }

    #[test]
    fn test_slice_with_rest() {
        let p = pat(quote::quote!([first, rest @ ..]));
        let bindings = match_pattern(&p, &Value::from(vec![1i64, 2, 3])).unwrap().unwrap();
        assert_eq!(bindings[0].1, Value::Int(1));
        assert_eq!(bindings[1].0, "rest");
        assert_eq!(bindings[1].1, Value::from(vec![2i64, 3]));
    }

    #[test]
    fn test_bound_names() {
        let p = pat(quote::quote!((a, Some(b), _, mut c)));
        let mut out = Vec::new();
        bound_names(&p, &mut out);
        assert_eq!(out, vec!["a", "b", "c"]);
    }
}
