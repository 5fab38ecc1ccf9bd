//! Methods on strings and chars

use crate::value::StructValue;
use crate::{EvalError, Value};

use super::{expected_arg, int_arg, str_arg, usize_arg, MethodCall};

/// A `&str` or `char` pattern argument.
enum Pattern {
    Str(String),
    Char(char),
}

impl Pattern {
    fn from_arg(value: &Value, method: &str) -> Result<Self, EvalError> {
        match value {
            Value::String(s) => Ok(Pattern::Str(s.as_str().to_string())),
            Value::Char(c) => Ok(Pattern::Char(*c)),
            other => Err(expected_arg("&str", other, method)),
        }
    }
}

// std's `Pattern` trait is unstable, so each call site dispatches
macro_rules! with_pattern {
    ($pattern:expr, |$p:ident| $body:expr) => {
        match $pattern {
            Pattern::Str(text) => {
                let $p = text.as_str();
                $body
            }
            Pattern::Char(ch) => {
                let $p = ch;
                $body
            }
        }
    };
}

fn strings<'a>(parts: impl Iterator<Item = &'a str>) -> Value {
    Value::vec(parts.map(Value::string).collect())
}

/// Non-mutating methods on a string.
pub(super) fn call(s: &str, call: &MethodCall<'_>) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "len" => Value::Int(s.len() as i64),
        "is_empty" => Value::Bool(s.is_empty()),
        "as_str" | "as_mut_str" => Value::string(s),
        "chars" => Value::vec(s.chars().map(Value::Char).collect()),
        "bytes" | "as_bytes" | "into_bytes" => {
            Value::vec(s.bytes().map(|b| Value::Int(b.into())).collect())
        }
        "char_indices" => Value::vec(
            s.char_indices()
                .map(|(i, c)| Value::tuple(vec![Value::Int(i as i64), Value::Char(c)]))
                .collect(),
        ),
        "lines" => strings(s.lines()),
        "split_whitespace" => strings(s.split_whitespace()),
        "split" => {
            let [pattern] = call.args::<1>()?;
            with_pattern!(Pattern::from_arg(pattern, method)?, |p| strings(s.split(p)))
        }
        "rsplit" => {
            let [pattern] = call.args::<1>()?;
            with_pattern!(Pattern::from_arg(pattern, method)?, |p| strings(s.rsplit(p)))
        }
        "split_terminator" => {
            let [pattern] = call.args::<1>()?;
            with_pattern!(Pattern::from_arg(pattern, method)?, |p| {
                strings(s.split_terminator(p))
            })
        }
        "splitn" => {
            let [n, pattern] = call.args::<2>()?;
            let n = usize_arg(n, method)?;
            with_pattern!(Pattern::from_arg(pattern, method)?, |p| strings(s.splitn(n, p)))
        }
        "split_once" | "rsplit_once" => {
            let [pattern] = call.args::<1>()?;
            let found = with_pattern!(Pattern::from_arg(pattern, method)?, |p| {
                if method == "split_once" {
                    s.split_once(p)
                } else {
                    s.rsplit_once(p)
                }
            });
            Value::from(found.map(|(a, b)| Value::tuple(vec![Value::string(a), Value::string(b)])))
        }
        "trim" => Value::string(s.trim()),
        "trim_start" => Value::string(s.trim_start()),
        "trim_end" => Value::string(s.trim_end()),
        "trim_matches" => {
            let [pattern] = call.args::<1>()?;
            with_pattern!(Pattern::from_arg(pattern, method)?, |p| Value::string(
                s.trim_start_matches(p).trim_end_matches(p)
            ))
        }
        "strip_prefix" => {
            let [pattern] = call.args::<1>()?;
            let stripped = with_pattern!(Pattern::from_arg(pattern, method)?, |p| s
                .strip_prefix(p));
            Value::from(stripped.map(Value::string))
        }
        "strip_suffix" => {
            let [pattern] = call.args::<1>()?;
            let stripped = with_pattern!(Pattern::from_arg(pattern, method)?, |p| s
                .strip_suffix(p));
            Value::from(stripped.map(Value::string))
        }
        "to_uppercase" => Value::string(s.to_uppercase()),
        "to_lowercase" => Value::string(s.to_lowercase()),
        "to_ascii_uppercase" => Value::string(s.to_ascii_uppercase()),
        "to_ascii_lowercase" => Value::string(s.to_ascii_lowercase()),
        "contains" => {
            let [pattern] = call.args::<1>()?;
            Value::Bool(with_pattern!(Pattern::from_arg(pattern, method)?, |p| s.contains(p)))
        }
        "starts_with" => {
            let [pattern] = call.args::<1>()?;
            Value::Bool(with_pattern!(Pattern::from_arg(pattern, method)?, |p| s
                .starts_with(p)))
        }
        "ends_with" => {
            let [pattern] = call.args::<1>()?;
            Value::Bool(with_pattern!(Pattern::from_arg(pattern, method)?, |p| s.ends_with(p)))
        }
        "find" | "rfind" => {
            let [pattern] = call.args::<1>()?;
            let found = with_pattern!(Pattern::from_arg(pattern, method)?, |p| {
                if method == "find" {
                    s.find(p)
                } else {
                    s.rfind(p)
                }
            });
            Value::from(found.map(|i| Value::Int(i as i64)))
        }
        "matches" => {
            let [pattern] = call.args::<1>()?;
            with_pattern!(Pattern::from_arg(pattern, method)?, |p| strings(s.matches(p)))
        }
        "replace" => {
            let [from, to] = call.args::<2>()?;
            let to = str_arg(to, method)?;
            Value::string(with_pattern!(Pattern::from_arg(from, method)?, |p| s.replace(p, to)))
        }
        "repeat" => {
            let [n] = call.args::<1>()?;
            Value::string(s.repeat(usize_arg(n, method)?))
        }
        "eq_ignore_ascii_case" => {
            let [other] = call.args::<1>()?;
            Value::Bool(s.eq_ignore_ascii_case(str_arg(other, method)?))
        }
        "is_char_boundary" => {
            let [index] = call.args::<1>()?;
            Value::Bool(s.is_char_boundary(usize_arg(index, method)?))
        }
        "get" => {
            let [index] = call.args::<1>()?;
            let Value::Range(range) = index else {
                return Err(expected_arg("range", index, method));
            };
            Value::from(
                range
                    .bounds(s.len())
                    .and_then(|(start, end)| s.get(start..end))
                    .map(Value::string),
            )
        }
        "parse" => parse(s, call.turbofish_name().as_deref()),
        // A string collected from chars collects to itself
        "collect" => Value::string(s),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Mutating methods on a string.
pub(super) fn mutate(s: &mut String, call: &MethodCall<'_>) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "push" => {
            let [c] = call.args::<1>()?;
            s.push(char_arg(c, method)?);
            Value::Unit
        }
        "push_str" => {
            let [other] = call.args::<1>()?;
            s.push_str(str_arg(other, method)?);
            Value::Unit
        }
        "pop" => Value::from(s.pop()),
        "clear" => {
            s.clear();
            Value::Unit
        }
        "insert" => {
            let [index, c] = call.args::<2>()?;
            let index = boundary(s, index, method)?;
            s.insert(index, char_arg(c, method)?);
            Value::Unit
        }
        "insert_str" => {
            let [index, other] = call.args::<2>()?;
            let index = boundary(s, index, method)?;
            s.insert_str(index, str_arg(other, method)?);
            Value::Unit
        }
        "truncate" => {
            let [len] = call.args::<1>()?;
            let len = usize_arg(len, method)?;
            if len < s.len() {
                let len = boundary(s, &Value::Int(len as i64), method)?;
                s.truncate(len);
            }
            Value::Unit
        }
        "remove" => {
            let [index] = call.args::<1>()?;
            let index = boundary(s, index, method)?;
            if index >= s.len() {
                return Err(EvalError::panic("cannot remove a char from the end of a string"));
            }
            Value::Char(s.remove(index))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn char_arg(value: &Value, method: &str) -> Result<char, EvalError> {
    match value {
        Value::Char(c) => Ok(*c),
        other => Err(expected_arg("char", other, method)),
    }
}

/// A byte index that must fall on a char boundary.
fn boundary(s: &str, index: &Value, method: &str) -> Result<usize, EvalError> {
    let index = usize_arg(index, method)?;
    if index > s.len() || !s.is_char_boundary(index) {
        return Err(EvalError::panic(format!(
            "byte index {} is not a char boundary",
            index
        )));
    }
    Ok(index)
}

/// `str::parse`, with the error values std produces.
fn parse(s: &str, target: Option<&str>) -> Value {
    match target {
        Some("f64" | "f32") => match s.parse::<f64>() {
            Ok(x) => Value::ok(Value::Float(x)),
            Err(_) => Value::err(error_kind(
                "ParseFloatError",
                if s.is_empty() { "Empty" } else { "Invalid" },
            )),
        },
        Some("bool") => match s.parse::<bool>() {
            Ok(b) => Value::ok(Value::Bool(b)),
            Err(_) => Value::err(Value::structure(StructValue::new("ParseBoolError"))),
        },
        Some("char") => match s.parse::<char>() {
            Ok(c) => Value::ok(Value::Char(c)),
            Err(_) => Value::err(error_kind(
                "ParseCharError",
                if s.is_empty() { "EmptyString" } else { "TooManyChars" },
            )),
        },
        Some("String") => Value::ok(Value::string(s)),
        // Integers, and unannotated calls
        _ => match (s.parse::<i64>(), target) {
            (Ok(n), _) => Value::ok(Value::Int(n)),
            (Err(e), None) => match s.parse::<f64>() {
                Ok(x) => Value::ok(Value::Float(x)),
                Err(_) => Value::err(error_kind("ParseIntError", &format!("{:?}", e.kind()))),
            },
            (Err(e), Some(_)) => {
                Value::err(error_kind("ParseIntError", &format!("{:?}", e.kind())))
            }
        },
    }
}

fn error_kind(type_name: &str, kind: &str) -> Value {
    Value::structure(
        StructValue::new(type_name).with_field("kind", Value::structure(StructValue::new(kind))),
    )
}

/// Methods on a char.
pub(super) fn call_char(c: char, call: &MethodCall<'_>) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "is_alphabetic" => Value::Bool(c.is_alphabetic()),
        "is_numeric" => Value::Bool(c.is_numeric()),
        "is_alphanumeric" => Value::Bool(c.is_alphanumeric()),
        "is_whitespace" => Value::Bool(c.is_whitespace()),
        "is_uppercase" => Value::Bool(c.is_uppercase()),
        "is_lowercase" => Value::Bool(c.is_lowercase()),
        "is_control" => Value::Bool(c.is_control()),
        "is_ascii" => Value::Bool(c.is_ascii()),
        "is_ascii_digit" => Value::Bool(c.is_ascii_digit()),
        "is_ascii_alphabetic" => Value::Bool(c.is_ascii_alphabetic()),
        "is_ascii_alphanumeric" => Value::Bool(c.is_ascii_alphanumeric()),
        "is_ascii_uppercase" => Value::Bool(c.is_ascii_uppercase()),
        "is_ascii_lowercase" => Value::Bool(c.is_ascii_lowercase()),
        "is_ascii_punctuation" => Value::Bool(c.is_ascii_punctuation()),
        "is_ascii_whitespace" => Value::Bool(c.is_ascii_whitespace()),
        "is_digit" => {
            let [radix] = call.args::<1>()?;
            Value::Bool(c.is_digit(radix_arg(radix, method)?))
        }
        "to_digit" => {
            let [radix] = call.args::<1>()?;
            Value::from(c.to_digit(radix_arg(radix, method)?).map(|d| Value::Int(d.into())))
        }
        "to_ascii_uppercase" => Value::Char(c.to_ascii_uppercase()),
        "to_ascii_lowercase" => Value::Char(c.to_ascii_lowercase()),
        // These yield iterators in std; their text is what examples print
        "to_uppercase" => Value::string(c.to_uppercase().to_string()),
        "to_lowercase" => Value::string(c.to_lowercase().to_string()),
        "len_utf8" => Value::Int(c.len_utf8() as i64),
        "eq_ignore_ascii_case" => {
            let [other] = call.args::<1>()?;
            Value::Bool(c.eq_ignore_ascii_case(&char_arg(other, method)?))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn radix_arg(value: &Value, method: &str) -> Result<u32, EvalError> {
    let radix = int_arg(value, method)?;
    match u32::try_from(radix) {
        Ok(radix @ 2..=36) => Ok(radix),
        _ => Err(EvalError::panic(format!(
            "{}: radix is too high (maximum 36)",
            method
        ))),
    }
}
