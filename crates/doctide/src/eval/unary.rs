//! Unary operations and `as` casts

use crate::error::type_name;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprUnary {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let operand = self.expr.eval(env, ctx)?;

        match &self.op {
            syn::UnOp::Neg(_) => eval_neg(operand),
            syn::UnOp::Not(_) => eval_not(operand),
            // References are transparent, so is dereferencing them
            syn::UnOp::Deref(_) => Ok(operand),
            _ => Err(EvalError::UnsupportedExpr {
                kind: "unary operator".to_string(),
            }),
        }
    }
}

/// Evaluate unary negation (`-x`).
pub(crate) fn eval_neg(operand: Value) -> Result<Value, EvalError> {
    match operand {
        Value::Int(n) => n.checked_neg().map(Value::Int).ok_or(EvalError::IntegerOverflow {
            op: "-".to_string(),
        }),
        Value::Float(n) => Ok(Value::Float(-n)),
        other => Err(EvalError::type_error(format!(
            "cannot apply unary operator `-` to type `{}`",
            type_name(&other)
        ))),
    }
}

/// Evaluate logical/bitwise NOT (`!x`).
fn eval_not(operand: Value) -> Result<Value, EvalError> {
    match operand {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::Int(n) => Ok(Value::Int(!n)),
        other => Err(EvalError::type_error(format!(
            "cannot apply unary operator `!` to type `{}`",
            type_name(&other)
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Casts
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for syn::ExprCast {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let value = self.expr.eval(env, ctx)?;
        let target = match self.ty.as_ref() {
            syn::Type::Path(p) => super::path::last_segment(&p.path),
            other => {
                return Err(EvalError::UnsupportedExpr {
                    kind: format!("cast to `{}`", super::source_text(other)),
                })
            }
        };
        cast(value, &target)
    }
}

/// Convert a value the way `value as target` does.
pub fn cast(value: Value, target: &str) -> Result<Value, EvalError> {
    let as_int = |value: &Value| -> Option<i64> {
        match value {
            Value::Int(n) => Some(*n),
            // Float to int saturates, NaN becomes 0
            Value::Float(f) => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    };

    let result = match target {
        "f64" | "f32" => match value {
            Value::Int(n) => Some(Value::Float(n as f64)),
            Value::Float(f) if target == "f32" => Some(Value::Float(f64::from(f as f32))),
            Value::Float(f) => Some(Value::Float(f)),
            _ => None,
        },
        "char" => match value {
            Value::Int(n) => u8::try_from(n).ok().map(|b| Value::Char(char::from(b))),
            Value::Char(c) => Some(Value::Char(c)),
            _ => None,
        },
        "bool" => match value {
            Value::Bool(b) => Some(Value::Bool(b)),
            _ => None,
        },
        int => as_int(&value).and_then(|n| narrow(n, int)).map(Value::Int),
    };

    result.ok_or_else(|| {
        EvalError::type_error(format!(
            "non-primitive cast: `{}` as `{}`",
            type_name(&value),
            target
        ))
    })
}

/// Truncate to the width of an integer type, as `as` does.
fn narrow(n: i64, ty: &str) -> Option<i64> {
    Some(match ty {
        "i8" => (n as i8).into(),
        "i16" => (n as i16).into(),
        "i32" => (n as i32).into(),
        "u8" => (n as u8).into(),
        "u16" => (n as u16).into(),
        "u32" => (n as u32).into(),
        "i64" | "isize" | "u64" | "usize" | "i128" | "u128" => n,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: syn::Expr) -> Result<Value, EvalError> {
        expr.eval(&mut Environment::new(), &EvalContext::new())
    }

    #[test]
    fn test_negation() {
        assert_eq!(eval(syn::parse_quote!(-5)).unwrap(), Value::Int(-5));
        assert_eq!(eval(syn::parse_quote!(-2.5)).unwrap(), Value::Float(-2.5));
        assert!(matches!(
            eval_neg(Value::Int(i64::MIN)),
            Err(EvalError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_not() {
        assert_eq!(eval(syn::parse_quote!(!true)).unwrap(), Value::Bool(false));
        assert_eq!(eval(syn::parse_quote!(!0)).unwrap(), Value::Int(-1));
        assert!(eval(syn::parse_quote!(!"x")).is_err());
    }

    #[test]
    fn test_casts() {
        assert_eq!(eval(syn::parse_quote!(3 as f64)).unwrap(), Value::Float(3.0));
        assert_eq!(eval(syn::parse_quote!(3.9 as i32)).unwrap(), Value::Int(3));
        assert_eq!(eval(syn::parse_quote!(300 as u8)).unwrap(), Value::Int(44));
        assert_eq!(eval(syn::parse_quote!('a' as u32)).unwrap(), Value::Int(97));
        assert_eq!(eval(syn::parse_quote!(97u8 as char)).unwrap(), Value::Char('a'));
        assert!(eval(syn::parse_quote!("x" as i32)).is_err());
    }
}
