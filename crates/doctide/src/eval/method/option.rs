//! Methods on `Option` and `Result`

use crate::{Environment, EvalContext, EvalError, Value};

use super::{expected_arg, predicate, str_arg, MethodCall};
use crate::eval::function::call_value;

/// Methods on an `Option`.
pub(super) fn call_option(
    opt: &Option<Value>,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match (method, opt) {
        ("is_some", _) => Value::Bool(opt.is_some()),
        ("is_none", _) => Value::Bool(opt.is_none()),
        ("is_some_and", _) => {
            let [f] = call.args::<1>()?;
            Value::Bool(match opt {
                Some(v) => predicate(f, vec![v.clone()], env, ctx)?,
                None => false,
            })
        }
        ("is_none_or", _) => {
            let [f] = call.args::<1>()?;
            Value::Bool(match opt {
                Some(v) => predicate(f, vec![v.clone()], env, ctx)?,
                None => true,
            })
        }

        // Extracting
        ("unwrap", Some(v)) => v.clone(),
        ("unwrap", None) => {
            return Err(EvalError::panic("called `Option::unwrap()` on a `None` value"))
        }
        ("expect", _) => {
            let [message] = call.args::<1>()?;
            match opt {
                Some(v) => v.clone(),
                None => return Err(EvalError::panic(str_arg(message, method)?)),
            }
        }
        ("unwrap_or", _) => {
            let [default] = call.args::<1>()?;
            opt.clone().unwrap_or_else(|| default.clone())
        }
        ("unwrap_or_else", _) => {
            let [f] = call.args::<1>()?;
            match opt {
                Some(v) => v.clone(),
                None => call_value(f, vec![], env, ctx)?,
            }
        }

        // Transforming
        ("map", _) => {
            let [f] = call.args::<1>()?;
            match opt {
                Some(v) => Value::some(call_value(f, vec![v.clone()], env, ctx)?),
                None => Value::none(),
            }
        }
        ("map_or", _) => {
            let [default, f] = call.args::<2>()?;
            match opt {
                Some(v) => call_value(f, vec![v.clone()], env, ctx)?,
                None => default.clone(),
            }
        }
        ("map_or_else", _) => {
            let [default, f] = call.args::<2>()?;
            match opt {
                Some(v) => call_value(f, vec![v.clone()], env, ctx)?,
                None => call_value(default, vec![], env, ctx)?,
            }
        }
        ("and_then", _) => {
            let [f] = call.args::<1>()?;
            match opt {
                Some(v) => call_value(f, vec![v.clone()], env, ctx)?,
                None => Value::none(),
            }
        }
        ("filter", _) => {
            let [f] = call.args::<1>()?;
            match opt {
                Some(v) if predicate(f, vec![v.clone()], env, ctx)? => Value::some(v.clone()),
                _ => Value::none(),
            }
        }
        ("or", _) => {
            let [other] = call.args::<1>()?;
            match opt {
                Some(v) => Value::some(v.clone()),
                None => other.clone(),
            }
        }
        ("or_else", _) => {
            let [f] = call.args::<1>()?;
            match opt {
                Some(v) => Value::some(v.clone()),
                None => call_value(f, vec![], env, ctx)?,
            }
        }
        ("and", _) => {
            let [other] = call.args::<1>()?;
            match opt {
                Some(_) => other.clone(),
                None => Value::none(),
            }
        }
        ("xor", _) => {
            let [other] = call.args::<1>()?;
            let Value::Option(other) = other else {
                return Err(expected_arg("Option", other, method));
            };
            match (opt, other.as_ref()) {
                (Some(v), None) | (None, Some(v)) => Value::some(v.clone()),
                _ => Value::none(),
            }
        }
        ("zip", _) => {
            let [other] = call.args::<1>()?;
            let Value::Option(other) = other else {
                return Err(expected_arg("Option", other, method));
            };
            match (opt, other.as_ref()) {
                (Some(a), Some(b)) => Value::some(Value::tuple(vec![a.clone(), b.clone()])),
                _ => Value::none(),
            }
        }
        ("ok_or", _) => {
            let [error] = call.args::<1>()?;
            match opt {
                Some(v) => Value::ok(v.clone()),
                None => Value::err(error.clone()),
            }
        }
        ("ok_or_else", _) => {
            let [f] = call.args::<1>()?;
            match opt {
                Some(v) => Value::ok(v.clone()),
                None => Value::err(call_value(f, vec![], env, ctx)?),
            }
        }
        ("flatten", Some(Value::Option(inner))) => Value::Option(inner.clone()),
        ("flatten", None) => Value::none(),
        ("iter" | "into_iter", _) => Value::vec(opt.iter().cloned().collect()),
        ("copied" | "cloned" | "as_ref" | "as_mut" | "as_deref", _) => {
            Value::Option(std::sync::Arc::new(opt.clone()))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Mutating methods on an `Option`.
pub(super) fn mutate(
    opt: &mut Option<Value>,
    call: &MethodCall<'_>,
) -> Result<Option<Value>, EvalError> {
    let value = match call.method {
        "take" => Value::from(opt.take()),
        "replace" => {
            let [new] = call.args::<1>()?;
            Value::from(opt.replace(new.clone()))
        }
        "insert" => {
            let [new] = call.args::<1>()?;
            opt.insert(new.clone()).clone()
        }
        "get_or_insert" => {
            let [new] = call.args::<1>()?;
            opt.get_or_insert_with(|| new.clone()).clone()
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Methods on a `Result`.
pub(super) fn call_result(
    res: &Result<Value, Value>,
    call: &MethodCall<'_>,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match (method, res) {
        ("is_ok", _) => Value::Bool(res.is_ok()),
        ("is_err", _) => Value::Bool(res.is_err()),
        ("is_ok_and", _) => {
            let [f] = call.args::<1>()?;
            Value::Bool(match res {
                Ok(v) => predicate(f, vec![v.clone()], env, ctx)?,
                Err(_) => false,
            })
        }
        ("is_err_and", _) => {
            let [f] = call.args::<1>()?;
            Value::Bool(match res {
                Err(e) => predicate(f, vec![e.clone()], env, ctx)?,
                Ok(_) => false,
            })
        }
        ("ok", _) => Value::from(res.as_ref().ok().cloned()),
        ("err", _) => Value::from(res.as_ref().err().cloned()),

        // Extracting
        ("unwrap", Ok(v)) => v.clone(),
        ("unwrap", Err(e)) => {
            return Err(EvalError::panic(format!(
                "called `Result::unwrap()` on an `Err` value: {:?}",
                e
            )))
        }
        ("unwrap_err", Err(e)) => e.clone(),
        ("unwrap_err", Ok(v)) => {
            return Err(EvalError::panic(format!(
                "called `Result::unwrap_err()` on an `Ok` value: {:?}",
                v
            )))
        }
        ("expect", _) => {
            let [message] = call.args::<1>()?;
            match res {
                Ok(v) => v.clone(),
                Err(e) => {
                    return Err(EvalError::panic(format!(
                        "{}: {:?}",
                        str_arg(message, method)?,
                        e
                    )))
                }
            }
        }
        ("expect_err", _) => {
            let [message] = call.args::<1>()?;
            match res {
                Err(e) => e.clone(),
                Ok(v) => {
                    return Err(EvalError::panic(format!(
                        "{}: {:?}",
                        str_arg(message, method)?,
                        v
                    )))
                }
            }
        }
        ("unwrap_or", _) => {
            let [default] = call.args::<1>()?;
            match res {
                Ok(v) => v.clone(),
                Err(_) => default.clone(),
            }
        }
        ("unwrap_or_else", _) => {
            let [f] = call.args::<1>()?;
            match res {
                Ok(v) => v.clone(),
                Err(e) => call_value(f, vec![e.clone()], env, ctx)?,
            }
        }

        // Transforming
        ("map", _) => {
            let [f] = call.args::<1>()?;
            match res {
                Ok(v) => Value::ok(call_value(f, vec![v.clone()], env, ctx)?),
                Err(e) => Value::err(e.clone()),
            }
        }
        ("map_err", _) => {
            let [f] = call.args::<1>()?;
            match res {
                Ok(v) => Value::ok(v.clone()),
                Err(e) => Value::err(call_value(f, vec![e.clone()], env, ctx)?),
            }
        }
        ("map_or", _) => {
            let [default, f] = call.args::<2>()?;
            match res {
                Ok(v) => call_value(f, vec![v.clone()], env, ctx)?,
                Err(_) => default.clone(),
            }
        }
        ("and_then", _) => {
            let [f] = call.args::<1>()?;
            match res {
                Ok(v) => call_value(f, vec![v.clone()], env, ctx)?,
                Err(e) => Value::err(e.clone()),
            }
        }
        ("or_else", _) => {
            let [f] = call.args::<1>()?;
            match res {
                Ok(v) => Value::ok(v.clone()),
                Err(e) => call_value(f, vec![e.clone()], env, ctx)?,
            }
        }
        ("iter" | "into_iter", _) => Value::vec(res.iter().cloned().collect()),
        ("copied" | "cloned" | "as_ref" | "as_mut" | "as_deref", _) => {
            Value::Result(std::sync::Arc::new(res.clone()))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use crate::eval::stmt::eval_stmts;
    use crate::{Environment, EvalContext, EvalError, Value};
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Result<Value, EvalError> {
        let block: syn::Block = syn::parse_str(&format!("{{ {} }}", src)).unwrap();
        eval_stmts(&block.stmts, &mut Environment::with_prelude(), &EvalContext::new())
    }

    #[test]
    fn test_unwrap_none_panics() {
        let err = run("let x: Option<i64> = None; x.unwrap()").unwrap_err();
        assert_eq!(err.kind(), "Panic");
        assert_eq!(err.to_string(), "called `Option::unwrap()` on a `None` value");
    }

    #[test]
    fn test_result_unwrap_reports_payload() {
        let err = run(r#"let r: Result<i64, String> = Err("boom".to_string()); r.unwrap()"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"called `Result::unwrap()` on an `Err` value: "boom""#
        );
    }

    #[test]
    fn test_expect_message() {
        let err = run(r#"None::<i64>.expect("value present")"#).unwrap_err();
        assert_eq!(err.to_string(), "value present");
    }

    #[test]
    fn test_combinators() {
        assert_eq!(run("Some(2).map(|x| x + 1).unwrap_or(0)").unwrap(), Value::Int(3));
        assert_eq!(
            run("Some(2).filter(|x| *x > 5).ok_or(\"small\")").unwrap(),
            Value::err(Value::string("small"))
        );
        assert_eq!(
            run("Ok::<i64, i64>(1).and_then(|x| Err::<i64, i64>(x * 10)).map_err(|e| e + 1)")
                .unwrap(),
            Value::err(Value::Int(11))
        );
    }

    #[test]
    fn test_take_leaves_none() {
        assert_eq!(
            format!("{:?}", run("let mut slot = Some(1); let old = slot.take(); (old, slot)").unwrap()),
            "(Some(1), None)"
        );
    }
}
