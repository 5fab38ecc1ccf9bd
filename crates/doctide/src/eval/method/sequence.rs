//! Vectors, slices, ranges and the iterator adapters over them
//!
//! Iterators are eager: every adapter produces a vector, so
//! `v.iter().map(f).filter(g).collect()` is three vector passes.

use std::cmp::Ordering;

use crate::error::type_name;
use crate::value::RangeValue;
use crate::{Environment, EvalContext, EvalError, Value};

use super::{compare, expected_arg, predicate, usize_arg, MethodCall};
use crate::eval::binary::apply_binop;
use crate::eval::function::call_value;

/// Non-mutating methods on a sequence.
pub(super) fn call(
    items: Vec<Value>,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "len" | "count" => Value::Int(items.len() as i64),
        "is_empty" => Value::Bool(items.is_empty()),
        "iter" | "into_iter" | "iter_mut" | "cloned" | "copied" | "to_vec" | "as_slice"
        | "peekable" | "by_ref" => Value::vec(items),

        // Adapters
        "rev" => Value::vec(items.into_iter().rev().collect()),
        "enumerate" => Value::vec(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| Value::tuple(vec![Value::Int(i as i64), item]))
                .collect(),
        ),
        "skip" => {
            let [n] = call.args::<1>()?;
            Value::vec(items.into_iter().skip(usize_arg(n, method)?).collect())
        }
        "take" => {
            let [n] = call.args::<1>()?;
            Value::vec(items.into_iter().take(usize_arg(n, method)?).collect())
        }
        "step_by" => {
            let [n] = call.args::<1>()?;
            let step = usize_arg(n, method)?;
            if step == 0 {
                return Err(EvalError::panic("assertion failed: step != 0"));
            }
            Value::vec(items.into_iter().step_by(step).collect())
        }
        "chain" => {
            let [other] = call.args::<1>()?;
            let mut items = items;
            items.extend(iter_items(other)?);
            Value::vec(items)
        }
        "zip" => {
            let [other] = call.args::<1>()?;
            Value::vec(
                items
                    .into_iter()
                    .zip(iter_items(other)?)
                    .map(|(a, b)| Value::tuple(vec![a, b]))
                    .collect(),
            )
        }
        "map" => {
            let [f] = call.args::<1>()?;
            Value::vec(
                items
                    .into_iter()
                    .map(|item| call_value(f, vec![item], env, ctx))
                    .collect::<Result<_, _>>()?,
            )
        }
        "filter" => {
            let [f] = call.args::<1>()?;
            let mut kept = Vec::new();
            for item in items {
                if predicate(f, vec![item.clone()], env, ctx)? {
                    kept.push(item);
                }
            }
            Value::vec(kept)
        }
        "filter_map" => {
            let [f] = call.args::<1>()?;
            let mut kept = Vec::new();
            for item in items {
                match call_value(f, vec![item], env, ctx)? {
                    Value::Option(found) => kept.extend(found.as_ref().clone()),
                    other => return Err(expected_arg("Option", &other, method)),
                }
            }
            Value::vec(kept)
        }
        "flat_map" => {
            let [f] = call.args::<1>()?;
            let mut out = Vec::new();
            for item in items {
                out.extend(iter_items(&call_value(f, vec![item], env, ctx)?)?);
            }
            Value::vec(out)
        }
        "flatten" => {
            let mut out = Vec::new();
            for item in &items {
                out.extend(iter_items(item)?);
            }
            Value::vec(out)
        }
        "take_while" | "skip_while" => {
            let [f] = call.args::<1>()?;
            let mut split = items.len();
            for (i, item) in items.iter().enumerate() {
                if !predicate(f, vec![item.clone()], env, ctx)? {
                    split = i;
                    break;
                }
            }
            let mut items = items;
            let rest = items.split_off(split);
            Value::vec(if method == "take_while" { items } else { rest })
        }
        "inspect" => {
            let [f] = call.args::<1>()?;
            for item in &items {
                call_value(f, vec![item.clone()], env, ctx)?;
            }
            Value::vec(items)
        }
        "for_each" => {
            let [f] = call.args::<1>()?;
            for item in items {
                call_value(f, vec![item], env, ctx)?;
            }
            Value::Unit
        }
        "windows" | "chunks" => {
            let [n] = call.args::<1>()?;
            let size = usize_arg(n, method)?;
            if size == 0 {
                return Err(EvalError::panic(format!("{} size must be non-zero", method)));
            }
            let groups: Vec<Value> = if method == "windows" {
                items.windows(size).map(|w| Value::vec(w.to_vec())).collect()
            } else {
                items.chunks(size).map(|c| Value::vec(c.to_vec())).collect()
            };
            Value::vec(groups)
        }

        // Consumers
        "collect" => collect(items, call.turbofish)?,
        "sum" => total(items, call, syn::BinOp::Add(Default::default()), 0)?,
        "product" => total(items, call, syn::BinOp::Mul(Default::default()), 1)?,
        "max" => Value::from(extreme(items, Ordering::Greater)?),
        "min" => Value::from(extreme(items, Ordering::Less)?),
        "max_by_key" | "min_by_key" => {
            let [f] = call.args::<1>()?;
            let mut keyed = Vec::with_capacity(items.len());
            for item in items {
                keyed.push((call_value(f, vec![item.clone()], env, ctx)?, item));
            }
            let want = if method == "max_by_key" { Ordering::Greater } else { Ordering::Less };
            Value::from(extreme_by(keyed, want, |a, b| compare(a, b))?)
        }
        "max_by" | "min_by" => {
            let [f] = call.args::<1>()?;
            let want = if method == "max_by" { Ordering::Greater } else { Ordering::Less };
            let keyed = items.into_iter().map(|item| (item.clone(), item)).collect();
            Value::from(extreme_by(keyed, want, |a, b| {
                ordering_from(f, a.clone(), b.clone(), env, ctx)
            })?)
        }
        "fold" => {
            let [init, f] = call.args::<2>()?;
            let mut acc = init.clone();
            for item in items {
                acc = call_value(f, vec![acc, item], env, ctx)?;
            }
            acc
        }
        "reduce" => {
            let [f] = call.args::<1>()?;
            let mut iter = items.into_iter();
            match iter.next() {
                Some(first) => {
                    let mut acc = first;
                    for item in iter {
                        acc = call_value(f, vec![acc, item], env, ctx)?;
                    }
                    Value::some(acc)
                }
                None => Value::none(),
            }
        }
        "any" | "all" => {
            let [f] = call.args::<1>()?;
            let want = method == "any";
            let mut result = !want;
            for item in items {
                if predicate(f, vec![item], env, ctx)? == want {
                    result = want;
                    break;
                }
            }
            Value::Bool(result)
        }
        "find" => {
            let [f] = call.args::<1>()?;
            let mut found = None;
            for item in items {
                if predicate(f, vec![item.clone()], env, ctx)? {
                    found = Some(item);
                    break;
                }
            }
            Value::from(found)
        }
        "position" => {
            let [f] = call.args::<1>()?;
            let mut found = None;
            for (i, item) in items.into_iter().enumerate() {
                if predicate(f, vec![item], env, ctx)? {
                    found = Some(Value::Int(i as i64));
                    break;
                }
            }
            Value::from(found)
        }
        "partition" => {
            let [f] = call.args::<1>()?;
            let (mut yes, mut no) = (Vec::new(), Vec::new());
            for item in items {
                if predicate(f, vec![item.clone()], env, ctx)? {
                    yes.push(item);
                } else {
                    no.push(item);
                }
            }
            Value::tuple(vec![Value::vec(yes), Value::vec(no)])
        }
        "unzip" => {
            let (mut left, mut right) = (Vec::new(), Vec::new());
            for item in items {
                match item {
                    Value::Tuple(pair) if pair.len() == 2 => {
                        left.push(pair[0].clone());
                        right.push(pair[1].clone());
                    }
                    other => return Err(expected_arg("(A, B)", &other, method)),
                }
            }
            Value::tuple(vec![Value::vec(left), Value::vec(right)])
        }
        "first" | "next" => Value::from(items.into_iter().next()),
        "last" => Value::from(items.into_iter().last()),
        "nth" => {
            let [n] = call.args::<1>()?;
            Value::from(items.into_iter().nth(usize_arg(n, method)?))
        }
        "get" => {
            let [index] = call.args::<1>()?;
            match index {
                Value::Range(range) => Value::from(
                    range
                        .bounds(items.len())
                        .map(|(start, end)| Value::vec(items[start..end].to_vec())),
                ),
                other => Value::from(items.get(usize_arg(other, method)?).cloned()),
            }
        }
        "contains" => {
            let [needle] = call.args::<1>()?;
            Value::Bool(items.contains(needle))
        }
        "split_at" => {
            let [mid] = call.args::<1>()?;
            let mid = usize_arg(mid, method)?;
            if mid > items.len() {
                return Err(EvalError::panic("mid > len"));
            }
            let mut items = items;
            let right = items.split_off(mid);
            Value::tuple(vec![Value::vec(items), Value::vec(right)])
        }
        "is_sorted" => Value::Bool(
            items
                .windows(2)
                .all(|w| matches!(w[0].compare(&w[1]), Some(Ordering::Less | Ordering::Equal))),
        ),
        "join" => {
            let [sep] = call.args::<1>()?;
            let sep = super::str_arg(sep, method)?;
            Value::string(strings(&items, method)?.join(sep))
        }
        "concat" => match items.first() {
            Some(Value::Vec(_)) => {
                let mut out = Vec::new();
                for item in &items {
                    out.extend(iter_items(item)?);
                }
                Value::vec(out)
            }
            _ => Value::string(strings(&items, method)?.concat()),
        },
        "repeat" => {
            let [n] = call.args::<1>()?;
            let times = usize_arg(n, method)?;
            Value::vec((0..times).flat_map(|_| items.iter().cloned()).collect())
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Methods on a range. Bounded ranges behave like the vector of their
/// elements; unbounded ranges support only what finishes.
pub(super) fn call_range(
    range: &RangeValue,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    if call.method == "contains" {
        let [needle] = call.args::<1>()?;
        let n = super::int_arg(needle, call.method)?;
        let above = range.start.map_or(true, |start| n >= start);
        let below = match range.end {
            Some(end) if range.inclusive => n <= end,
            Some(end) => n < end,
            None => true,
        };
        return Ok(Some(Value::Bool(above && below)));
    }

    match range.to_vec() {
        Some(items) => self::call(items, call, env, ctx),
        None if call.method == "take" => {
            let [n] = call.args::<1>()?;
            let start = range.start.unwrap_or(0);
            let count = usize_arg(n, call.method)?;
            Ok(Some(Value::vec(
                (start..).take(count).map(Value::Int).collect(),
            )))
        }
        None => Err(unbounded(call.method)),
    }
}

/// Mutating methods on a vector.
pub(super) fn mutate(
    items: &mut Vec<Value>,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "push" => {
            let [item] = call.args::<1>()?;
            items.push(item.clone());
            Value::Unit
        }
        "pop" => Value::from(items.pop()),
        "insert" => {
            let [index, item] = call.args::<2>()?;
            let index = usize_arg(index, method)?;
            if index > items.len() {
                return Err(EvalError::panic(format!(
                    "insertion index (is {}) should be <= len (is {})",
                    index,
                    items.len()
                )));
            }
            items.insert(index, item.clone());
            Value::Unit
        }
        "remove" => {
            let [index] = call.args::<1>()?;
            let index = usize_arg(index, method)?;
            if index >= items.len() {
                return Err(EvalError::panic(format!(
                    "removal index (is {}) should be < len (is {})",
                    index,
                    items.len()
                )));
            }
            items.remove(index)
        }
        "swap" => {
            let [a, b] = call.args::<2>()?;
            let (a, b) = (usize_arg(a, method)?, usize_arg(b, method)?);
            let len = items.len();
            for index in [a, b] {
                if index >= len {
                    return Err(EvalError::IndexOutOfBounds {
                        index: index as i64,
                        len,
                    });
                }
            }
            items.swap(a, b);
            Value::Unit
        }
        "clear" => {
            items.clear();
            Value::Unit
        }
        "truncate" => {
            let [len] = call.args::<1>()?;
            items.truncate(usize_arg(len, method)?);
            Value::Unit
        }
        "extend" => {
            let [other] = call.args::<1>()?;
            items.extend(iter_items(other)?);
            Value::Unit
        }
        "reverse" => {
            items.reverse();
            Value::Unit
        }
        "dedup" => {
            items.dedup();
            Value::Unit
        }
        "sort" | "sort_unstable" => {
            sort_values(items, |a, b| compare(a, b))?;
            Value::Unit
        }
        "sort_by" => {
            let [f] = call.args::<1>()?;
            sort_values(items, |a, b| ordering_from(f, a.clone(), b.clone(), env, ctx))?;
            Value::Unit
        }
        "sort_by_key" => {
            let [f] = call.args::<1>()?;
            let mut keyed = Vec::with_capacity(items.len());
            for item in items.iter() {
                keyed.push((call_value(f, vec![item.clone()], env, ctx)?, item.clone()));
            }
            sort_values(&mut keyed, |a, b| compare(&a.0, &b.0))?;
            *items = keyed.into_iter().map(|(_, item)| item).collect();
            Value::Unit
        }
        "retain" => {
            let [f] = call.args::<1>()?;
            let mut kept = Vec::with_capacity(items.len());
            for item in items.iter() {
                if predicate(f, vec![item.clone()], env, ctx)? {
                    kept.push(item.clone());
                }
            }
            *items = kept;
            Value::Unit
        }
        "drain" => {
            let [range] = call.args::<1>()?;
            let Value::Range(range) = range else {
                return Err(expected_arg("range", range, method));
            };
            let (start, end) = range.bounds(items.len()).ok_or_else(|| {
                EvalError::panic(format!("range out of bounds for length {}", items.len()))
            })?;
            Value::vec(items.drain(start..end).collect())
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

/// The elements an iterable value yields.
///
/// `Option` and `Result` iterate over their success value, as they do in
/// `flat_map` and `flatten`.
pub(crate) fn iter_items(value: &Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::Option(opt) => Ok(opt.as_ref().iter().cloned().collect()),
        Value::Result(res) => Ok(res.as_ref().as_ref().ok().into_iter().cloned().collect()),
        Value::Range(range) if range.end.is_none() => Err(unbounded("iterate")),
        other => other.to_items().ok_or_else(|| {
            EvalError::type_error(format!("`{}` is not an iterator", type_name(other)))
        }),
    }
}

/// Build the collection named by `target` (`Vec<_>` when absent).
pub(crate) fn collect(items: Vec<Value>, target: Option<&syn::Type>) -> Result<Value, EvalError> {
    let Some(ty) = target else {
        return Ok(Value::vec(items));
    };
    let syn::Type::Path(path) = ty else {
        return Ok(Value::vec(items));
    };
    let Some(segment) = path.path.segments.last() else {
        return Ok(Value::vec(items));
    };
    let inner = match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    };

    match segment.ident.to_string().as_str() {
        // The first failure short-circuits
        "Result" => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Result(res) => match res.as_ref() {
                        Ok(v) => values.push(v.clone()),
                        Err(e) => return Ok(Value::err(e.clone())),
                    },
                    other => return Err(expected_arg("Result", &other, "collect")),
                }
            }
            Ok(Value::ok(collect(values, inner)?))
        }
        "Option" => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Option(opt) => match opt.as_ref() {
                        Some(v) => values.push(v.clone()),
                        None => return Ok(Value::none()),
                    },
                    other => return Err(expected_arg("Option", &other, "collect")),
                }
            }
            Ok(Value::some(collect(values, inner)?))
        }
        _ => Ok(crate::eval::local::coerce(Value::vec(items), ty)),
    }
}

fn total(
    items: Vec<Value>,
    call: &MethodCall<'_>,
    op: syn::BinOp,
    identity: i64,
) -> Result<Value, EvalError> {
    let float = matches!(items.first(), Some(Value::Float(_)))
        || matches!(call.turbofish_name().as_deref(), Some("f64" | "f32"));
    let start = if float {
        Value::Float(identity as f64)
    } else {
        Value::Int(identity)
    };
    items
        .into_iter()
        .try_fold(start, |acc, item| apply_binop(&op, acc, item))
}

/// Last maximum or first minimum, as `Iterator::max` and `min` pick.
fn extreme(items: Vec<Value>, want: Ordering) -> Result<Option<Value>, EvalError> {
    let keyed = items.into_iter().map(|item| (item.clone(), item)).collect();
    extreme_by(keyed, want, |a, b| compare(a, b))
}

fn extreme_by(
    keyed: Vec<(Value, Value)>,
    want: Ordering,
    mut cmp: impl FnMut(&Value, &Value) -> Result<Ordering, EvalError>,
) -> Result<Option<Value>, EvalError> {
    let mut best: Option<(Value, Value)> = None;
    for (key, item) in keyed {
        best = Some(match best {
            None => (key, item),
            Some(current) => {
                let ord = cmp(&key, &current.0)?;
                if ord == want || (ord == Ordering::Equal && want == Ordering::Greater) {
                    (key, item)
                } else {
                    current
                }
            }
        });
    }
    Ok(best.map(|(_, item)| item))
}

/// Stable sort with a fallible comparison; the first failure is reported.
fn sort_values<T>(
    items: &mut [T],
    mut cmp: impl FnMut(&T, &T) -> Result<Ordering, EvalError>,
) -> Result<(), EvalError> {
    let mut failure = None;
    items.sort_by(|a, b| match cmp(a, b) {
        Ok(ord) => ord,
        Err(e) => {
            failure.get_or_insert(e);
            Ordering::Equal
        }
    });
    failure.map_or(Ok(()), Err)
}

/// Call a comparator closure and read back its `Ordering`.
fn ordering_from(
    f: &Value,
    a: Value,
    b: Value,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Ordering, EvalError> {
    let result = call_value(f, vec![a, b], env, ctx)?;
    result
        .as_ordering()
        .ok_or_else(|| expected_arg("Ordering", &result, "comparator"))
}

fn strings(items: &[Value], method: &str) -> Result<Vec<String>, EvalError> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.as_str().to_string()),
            Value::Char(c) => Ok(c.to_string()),
            other => Err(expected_arg("&str", other, method)),
        })
        .collect()
}

fn unbounded(method: &str) -> EvalError {
    EvalError::type_error(format!(
        "`{}` on an unbounded range would never finish",
        method
    ))
}

#[cfg(test)]
mod tests {
    use crate::eval::stmt::eval_stmts;
    use crate::{Environment, EvalContext, Value};
    use pretty_assertions::assert_eq;

    fn debug(src: &str) -> String {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        let mut env = Environment::with_prelude();
        let value = eval_stmts(&block.stmts, &mut env, &EvalContext::new()).unwrap();
        format!("{:?}", value)
    }

    #[test]
    fn test_adapter_chain() {
        assert_eq!(
            debug("vec![1, 2, 3, 4].iter().map(|x| x * x).filter(|x| *x > 4).collect::<Vec<_>>()"),
            "[9, 16]"
        );
        assert_eq!(debug("(1..=4).sum::<i64>()"), "10");
        assert_eq!(debug("vec![0.5, 1.5].iter().sum::<f64>()"), "2.0");
    }

    #[test]
    fn test_enumerate_and_zip() {
        assert_eq!(
            debug("vec!['a', 'b'].into_iter().enumerate().collect::<Vec<_>>()"),
            "[(0, 'a'), (1, 'b')]"
        );
        assert_eq!(
            debug("vec![1, 2].iter().zip(vec![3, 4]).map(|(a, b)| a * b).sum::<i64>()"),
            "11"
        );
    }

    #[test]
    fn test_max_min_and_keys() {
        assert_eq!(debug("vec![3, 9, 2].into_iter().max()"), "Some(9)");
        assert_eq!(debug("Vec::<i64>::new().into_iter().min()"), "None");
        assert_eq!(
            debug(r#"vec!["aa", "b", "ccc"].into_iter().max_by_key(|s| s.len())"#),
            r#"Some("ccc")"#
        );
    }

    #[test]
    fn test_collect_into_result() {
        assert_eq!(
            debug(r#"vec!["1", "2"].iter().map(|s| s.parse::<i64>()).collect::<Result<Vec<_>, _>>()"#),
            "Ok([1, 2])"
        );
        assert_eq!(
            debug(r#"vec!["1", "x"].iter().map(|s| s.parse::<i64>()).collect::<Result<Vec<i64>, _>>().is_err()"#),
            "true"
        );
    }

    #[test]
    fn test_collect_string_and_map() {
        assert_eq!(
            debug("\"abc\".chars().rev().collect::<String>()"),
            r#""cba""#
        );
        assert_eq!(
            debug("vec![(\"k\", 1)].into_iter().collect::<HashMap<_, _>>()"),
            r#"{"k": 1}"#
        );
    }

    #[test]
    fn test_unbounded_range_take() {
        assert_eq!(debug("(5..).take(3)"), "[5, 6, 7]");
        assert_eq!(debug("(1..10).contains(&10)"), "false");
    }

    #[test]
    fn test_vec_mutators() {
        assert_eq!(
            debug("let mut v = vec![3, 1, 2]; v.sort(); v.insert(0, 0); v.retain(|x| *x != 2); v"),
            "[0, 1, 3]"
        );
        assert_eq!(debug("let mut v = vec![1, 2]; let x = v.pop(); (x, v)"), "(Some(2), [1])");
        assert_eq!(
            debug("let mut v = vec![\"bb\", \"a\"]; v.sort_by_key(|s| s.len()); v"),
            r#"["a", "bb"]"#
        );
    }

    #[test]
    fn test_fold_and_join() {
        assert_eq!(debug("(1..=5).fold(0, |acc, x| acc + x)"), "15");
        assert_eq!(debug("vec![\"a\", \"b\"].join(\"-\")"), r#""a-b""#);
        assert_eq!(debug("vec![1, 2, 3, 4, 5].windows(2).count()"), "4");
    }

    #[test]
    fn test_repeat_clones_items() {
        assert_eq!(debug("vec![1, 2].repeat(3)"), "[1, 2, 1, 2, 1, 2]");
        assert_eq!(debug("vec![\"a\"].repeat(0)"), "[]");
    }

    #[test]
    fn test_bounded_range_uses_sequence_methods() {
        assert_eq!(debug("(1..4).map(|x| x * 10).collect::<Vec<_>>()"), "[10, 20, 30]");
        assert_eq!(debug("(0..=3).rev().collect::<Vec<_>>()"), "[3, 2, 1, 0]");
    }
}
