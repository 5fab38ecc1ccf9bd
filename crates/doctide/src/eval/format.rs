//! `format!`-style string formatting
//!
//! Supports the std format-spec grammar that examples use in practice:
//! positional, explicit, named and captured arguments, fill/alignment,
//! sign, `#`, zero padding, width and precision (literal, `n$` or `.*`),
//! and the `?`, `x`, `X`, `b`, `o`, `e`, `E` traits.

use crate::value::pretty::pretty;
use crate::{Environment, EvalError, Value};

/// One parsed piece of a format string.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    /// Text copied as is (`{{` and `}}` already unescaped)
    Literal(String),
    /// A `{...}` placeholder
    Placeholder(Placeholder),
}

/// Which argument a placeholder or count refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgRef {
    /// `{}`: the next positional argument
    Next,
    /// `{0}`
    Index(usize),
    /// `{name}`: a named argument or a captured variable
    Name(String),
}

/// A width or precision.
#[derive(Debug, Clone, PartialEq)]
pub enum Count {
    /// `5`
    Literal(usize),
    /// `1$` or `name$`
    Arg(ArgRef),
    /// `.*`: the next positional argument, taken before the value
    Star,
}

/// Text alignment within the field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `<`
    Left,
    /// `^`
    Center,
    /// `>`
    Right,
}

/// The formatting trait a placeholder selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trait {
    /// `{}`
    Display,
    /// `{:?}`
    Debug,
    /// `{:x}`
    LowerHex,
    /// `{:X}`
    UpperHex,
    /// `{:b}`
    Binary,
    /// `{:o}`
    Octal,
    /// `{:e}`
    LowerExp,
    /// `{:E}`
    UpperExp,
}

/// A placeholder with its parsed format spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// The value to format
    pub arg: ArgRef,
    /// Padding character
    pub fill: char,
    /// Explicit alignment, if any
    pub align: Option<Align>,
    /// `+`
    pub sign_plus: bool,
    /// `#`
    pub alternate: bool,
    /// `0`
    pub zero_pad: bool,
    /// Minimum width
    pub width: Option<Count>,
    /// Precision
    pub precision: Option<Count>,
    /// Formatting trait
    pub format: Trait,
}

/// Evaluated macro arguments.
#[derive(Debug, Clone, Default)]
pub struct FormatArgs {
    /// Arguments in order
    pub positional: Vec<Value>,
    /// `name = value` arguments
    pub named: Vec<(String, Value)>,
}

fn invalid(message: impl std::fmt::Display) -> EvalError {
    EvalError::Syntax {
        message: format!("invalid format string: {}", message),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════

/// Parse a format string into pieces.
pub fn parse(template: &str) -> Result<Vec<Piece>, EvalError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => inner.push(c),
                        None => return Err(invalid("expected `}` but string was terminated")),
                    }
                }
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Placeholder(parse_placeholder(&inner)?));
            }
            '}' => return Err(invalid("unmatched `}` found")),
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

fn parse_arg_ref(text: &str) -> Result<ArgRef, EvalError> {
    let text = text.trim();
    if text.is_empty() {
        Ok(ArgRef::Next)
    } else if let Ok(index) = text.parse::<usize>() {
        Ok(ArgRef::Index(index))
    } else if is_identifier(text) {
        Ok(ArgRef::Name(text.to_string()))
    } else {
        Err(invalid(format!("invalid argument name `{}`", text)))
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '^' => Some(Align::Center),
        '>' => Some(Align::Right),
        _ => None,
    }
}

fn parse_placeholder(inner: &str) -> Result<Placeholder, EvalError> {
    let (arg, spec) = match inner.split_once(':') {
        Some((arg, spec)) => (arg, spec),
        None => (inner, ""),
    };
    let mut placeholder = Placeholder {
        arg: parse_arg_ref(arg)?,
        fill: ' ',
        align: None,
        sign_plus: false,
        alternate: false,
        zero_pad: false,
        width: None,
        precision: None,
        format: Trait::Display,
    };

    let chars: Vec<char> = spec.chars().collect();
    let mut i = 0;

    if let Some(align) = chars.get(1).copied().and_then(align_of) {
        placeholder.fill = chars[0];
        placeholder.align = Some(align);
        i = 2;
    } else if let Some(align) = chars.first().copied().and_then(align_of) {
        placeholder.align = Some(align);
        i = 1;
    }

    match chars.get(i) {
        Some('+') => {
            placeholder.sign_plus = true;
            i += 1;
        }
        Some('-') => i += 1,
        _ => {}
    }
    if chars.get(i) == Some(&'#') {
        placeholder.alternate = true;
        i += 1;
    }
    if chars.get(i) == Some(&'0') && chars.get(i + 1) != Some(&'$') {
        placeholder.zero_pad = true;
        i += 1;
    }

    placeholder.width = parse_count(&chars, &mut i)?;
    if chars.get(i) == Some(&'.') {
        i += 1;
        if chars.get(i) == Some(&'*') {
            i += 1;
            placeholder.precision = Some(Count::Star);
        } else {
            placeholder.precision = Some(
                parse_count(&chars, &mut i)?
                    .ok_or_else(|| invalid("expected precision after `.`"))?,
            );
        }
    }

    let rest: String = chars[i..].iter().collect();
    placeholder.format = match rest.as_str() {
        "" => Trait::Display,
        "?" | "x?" | "X?" => Trait::Debug,
        "x" => Trait::LowerHex,
        "X" => Trait::UpperHex,
        "b" => Trait::Binary,
        "o" => Trait::Octal,
        "e" => Trait::LowerExp,
        "E" => Trait::UpperExp,
        other => return Err(invalid(format!("unknown format trait `{}`", other))),
    };
    Ok(placeholder)
}

/// A count is digits, or an argument reference followed by `$`.
fn parse_count(chars: &[char], i: &mut usize) -> Result<Option<Count>, EvalError> {
    let start = *i;
    let mut end = start;
    while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
        end += 1;
    }
    let token: String = chars[start..end].iter().collect();

    if chars.get(end) == Some(&'$') {
        *i = end + 1;
        return Ok(Some(Count::Arg(parse_arg_ref(&token)?)));
    }
    let digits = chars[start..end]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits > 0 {
        *i = start + digits;
        let text: String = chars[start..start + digits].iter().collect();
        let n = text
            .parse()
            .map_err(|_| invalid(format!("width `{}` is too large", text)))?;
        return Ok(Some(Count::Literal(n)));
    }
    // Not a count: what follows is the format trait
    Ok(None)
}

// ═══════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════

/// Format `template` with `args`. Names that are not named arguments are
/// looked up in `env`, as inline captures (`{x}`) are in Rust.
pub fn format(template: &str, args: &FormatArgs, env: &Environment) -> Result<String, EvalError> {
    let pieces = parse(template)?;
    let mut out = String::new();
    let mut next = 0;

    for piece in &pieces {
        let placeholder = match piece {
            Piece::Literal(text) => {
                out.push_str(text);
                continue;
            }
            Piece::Placeholder(placeholder) => placeholder,
        };

        // `.*` consumes its argument before the value
        let precision = match &placeholder.precision {
            Some(Count::Star) => {
                let value = positional(args, next)?;
                next += 1;
                Some(count_value(&value)?)
            }
            Some(Count::Arg(arg)) => Some(count_value(&resolve(arg, args, env, &mut next)?)?),
            Some(Count::Literal(n)) => Some(*n),
            None => None,
        };
        let value = resolve(&placeholder.arg, args, env, &mut next)?;
        let width = match &placeholder.width {
            Some(Count::Arg(arg)) => Some(count_value(&resolve(arg, args, env, &mut next)?)?),
            Some(Count::Literal(n)) => Some(*n),
            Some(Count::Star) | None => None,
        };

        let body = format_value(&value, placeholder, precision)?;
        out.push_str(&pad(body, placeholder, width, is_numeric(&value)));
    }
    Ok(out)
}

fn positional(args: &FormatArgs, index: usize) -> Result<Value, EvalError> {
    args.positional.get(index).cloned().ok_or_else(|| {
        invalid(format!(
            "invalid reference to positional argument {} ({})",
            index,
            match args.positional.len() {
                0 => "no arguments were given".to_string(),
                1 => "there is 1 argument".to_string(),
                n => format!("there are {} arguments", n),
            }
        ))
    })
}

fn resolve(
    arg: &ArgRef,
    args: &FormatArgs,
    env: &Environment,
    next: &mut usize,
) -> Result<Value, EvalError> {
    match arg {
        ArgRef::Next => {
            let value = positional(args, *next)?;
            *next += 1;
            Ok(value)
        }
        ArgRef::Index(index) => positional(args, *index),
        ArgRef::Name(name) => args
            .named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .or_else(|| env.get(name).cloned())
            .ok_or_else(|| EvalError::UndefinedVariable { name: name.clone() }),
    }
}

fn count_value(value: &Value) -> Result<usize, EvalError> {
    value.as_usize().ok_or_else(|| {
        EvalError::type_error(format!(
            "expected `usize` for width or precision, found `{}`",
            crate::error::type_name(value)
        ))
    })
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

fn format_value(
    value: &Value,
    spec: &Placeholder,
    precision: Option<usize>,
) -> Result<String, EvalError> {
    let unsupported = |name: &str| {
        EvalError::type_error(format!(
            "`{}` does not implement `{}`",
            crate::error::type_name(value),
            name
        ))
    };

    let body = match (spec.format, value) {
        (Trait::Display, Value::Float(x)) => match precision {
            Some(p) => format!("{:.*}", p, x),
            None => x.to_string(),
        },
        (Trait::Display, Value::String(s)) => match precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.as_str().to_string(),
        },
        (Trait::Display, other) => other.to_string(),

        (Trait::Debug, Value::Float(x)) => match precision {
            Some(p) => format!("{:.*?}", p, x),
            None => format!("{:?}", x),
        },
        (Trait::Debug, other) if spec.alternate => {
            pretty(other, 0).unwrap_or_else(|_| format!("{:#?}", other))
        }
        (Trait::Debug, other) => format!("{:?}", other),

        (Trait::LowerHex, Value::Int(n)) => radix(spec.alternate, "0x", format!("{:x}", n)),
        (Trait::UpperHex, Value::Int(n)) => radix(spec.alternate, "0x", format!("{:X}", n)),
        (Trait::Binary, Value::Int(n)) => radix(spec.alternate, "0b", format!("{:b}", n)),
        (Trait::Octal, Value::Int(n)) => radix(spec.alternate, "0o", format!("{:o}", n)),
        (Trait::LowerExp, Value::Float(x)) => match precision {
            Some(p) => format!("{:.*e}", p, x),
            None => format!("{:e}", x),
        },
        (Trait::LowerExp, Value::Int(n)) => format!("{:e}", n),
        (Trait::UpperExp, Value::Float(x)) => match precision {
            Some(p) => format!("{:.*E}", p, x),
            None => format!("{:E}", x),
        },
        (Trait::UpperExp, Value::Int(n)) => format!("{:E}", n),
        (Trait::LowerHex, _) => return Err(unsupported("LowerHex")),
        (Trait::UpperHex, _) => return Err(unsupported("UpperHex")),
        (Trait::Binary, _) => return Err(unsupported("Binary")),
        (Trait::Octal, _) => return Err(unsupported("Octal")),
        (Trait::LowerExp, _) => return Err(unsupported("LowerExp")),
        (Trait::UpperExp, _) => return Err(unsupported("UpperExp")),
    };

    let positive = match value {
        Value::Int(n) => *n >= 0,
        Value::Float(x) => x.is_sign_positive(),
        _ => false,
    };
    if spec.sign_plus && positive && is_numeric(value) {
        Ok(format!("+{}", body))
    } else {
        Ok(body)
    }
}

/// Negative numbers print their two's complement, as std does for `i64`.
fn radix(alternate: bool, prefix: &str, digits: String) -> String {
    if alternate {
        format!("{}{}", prefix, digits)
    } else {
        digits
    }
}

fn pad(body: String, spec: &Placeholder, width: Option<usize>, numeric: bool) -> String {
    let len = body.chars().count();
    let Some(width) = width.filter(|w| *w > len) else {
        return body;
    };
    let missing = width - len;

    // Sign-aware zero padding ignores fill and alignment
    if spec.zero_pad && numeric {
        let sign_len = usize::from(body.starts_with(['-', '+']));
        let prefix_len = if spec.alternate
            && ["0x", "0b", "0o"].iter().any(|p| body[sign_len..].starts_with(p))
        {
            sign_len + 2
        } else {
            sign_len
        };
        let (prefix, digits) = body.split_at(prefix_len);
        return format!("{}{}{}", prefix, "0".repeat(missing), digits);
    }

    let align = spec
        .align
        .unwrap_or(if numeric { Align::Right } else { Align::Left });
    let (before, after) = match align {
        Align::Left => (0, missing),
        Align::Right => (missing, 0),
        Align::Center => (missing / 2, missing - missing / 2),
    };
    let fill = |n: usize| spec.fill.to_string().repeat(n);
    format!("{}{}{}", fill(before), body, fill(after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(template: &str, positional: Vec<Value>) -> String {
        let args = FormatArgs {
            positional,
            named: Vec::new(),
        };
        format(template, &args, &Environment::new()).unwrap()
    }

    #[test]
    fn test_plain_and_escapes() {
        assert_eq!(fmt("{} + {} = {}", vec![Value::Int(1), Value::Int(2), Value::Int(3)]), "1 + 2 = 3");
        assert_eq!(fmt("{{literal}}", vec![]), "{literal}");
        assert_eq!(fmt("{1}{0}", vec!["a".into(), "b".into()]), "ba");
    }

    #[test]
    fn test_debug_and_pretty() {
        let v = Value::vec(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(fmt("{:?}", vec![v.clone()]), "[1, 2]");
        assert_eq!(fmt("{:#?}", vec![v]), "[\n    1,\n    2,\n]");
        assert_eq!(fmt("{:?}", vec!["hi".into()]), "\"hi\"");
    }

    #[test]
    fn test_width_align_fill() {
        assert_eq!(fmt("[{:5}]", vec![Value::Int(42)]), "[   42]");
        assert_eq!(fmt("[{:5}]", vec!["ab".into()]), "[ab   ]");
        assert_eq!(fmt("[{:*^7}]", vec!["mid".into()]), "[**mid**]");
        assert_eq!(fmt("[{:<4}]", vec![Value::Int(7)]), "[7   ]");
    }

    #[test]
    fn test_numeric_flags() {
        assert_eq!(fmt("{:05}", vec![Value::Int(-42)]), "-0042");
        assert_eq!(fmt("{:+}", vec![Value::Int(3)]), "+3");
        assert_eq!(fmt("{:.2}", vec![Value::Float(3.14159)]), "3.14");
        assert_eq!(fmt("{:#x}", vec![Value::Int(255)]), "0xff");
        assert_eq!(fmt("{:#010b}", vec![Value::Int(5)]), "0b00000101");
        assert_eq!(fmt("{:e}", vec![Value::Float(1234.5)]), "1.2345e3");
    }

    #[test]
    fn test_counts_from_arguments() {
        assert_eq!(fmt("{:1$}|", vec![Value::Int(7), Value::Int(4)]), "   7|");
        assert_eq!(fmt("{:.*}", vec![Value::Int(3), Value::Float(3.14159)]), "3.142");
        assert_eq!(fmt("{:.3}", vec!["abcdef".into()]), "abc");
    }

    #[test]
    fn test_named_and_captured() {
        let mut env = Environment::new();
        env.define("who", Value::string("world"));
        let args = FormatArgs {
            positional: Vec::new(),
            named: vec![("greeting".to_string(), Value::string("hello"))],
        };
        assert_eq!(format("{greeting}, {who}!", &args, &env).unwrap(), "hello, world!");
        assert_eq!(
            format("{nobody}", &args, &env).unwrap_err().kind(),
            "UndefinedVariable"
        );
    }

    #[test]
    fn test_invalid_templates() {
        let args = FormatArgs::default();
        let env = Environment::new();
        assert!(format("{", &args, &env).is_err());
        assert!(format("}", &args, &env).is_err());
        assert!(format("{}", &args, &env).is_err());
        assert!(format("{:q}", &args, &env).is_err());
    }
}
