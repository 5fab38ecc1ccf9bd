//! Binary operation evaluation

use std::cmp::Ordering;

use crate::error::type_name;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprBinary {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        // Short-circuit evaluation for && and ||
        match &self.op {
            syn::BinOp::And(_) => return eval_logical(self, false, env, ctx),
            syn::BinOp::Or(_) => return eval_logical(self, true, env, ctx),
            _ => {}
        }

        // x += y  →  x = x + y, against the place named by `x`
        if let Some(base) = compound_base(&self.op) {
            let right = self.right.eval(env, ctx)?;
            return super::assign::update_place(&self.left, env, ctx, |current| {
                apply_binop(&base, current, right)
            });
        }

        let left = self.left.eval(env, ctx)?;
        let right = self.right.eval(env, ctx)?;
        apply_binop(&self.op, left, right)
    }
}

/// The plain operator behind a compound assignment operator.
fn compound_base(op: &syn::BinOp) -> Option<syn::BinOp> {
    Some(match op {
        syn::BinOp::AddAssign(_) => syn::BinOp::Add(Default::default()),
        syn::BinOp::SubAssign(_) => syn::BinOp::Sub(Default::default()),
        syn::BinOp::MulAssign(_) => syn::BinOp::Mul(Default::default()),
        syn::BinOp::DivAssign(_) => syn::BinOp::Div(Default::default()),
        syn::BinOp::RemAssign(_) => syn::BinOp::Rem(Default::default()),
        syn::BinOp::BitAndAssign(_) => syn::BinOp::BitAnd(Default::default()),
        syn::BinOp::BitOrAssign(_) => syn::BinOp::BitOr(Default::default()),
        syn::BinOp::BitXorAssign(_) => syn::BinOp::BitXor(Default::default()),
        syn::BinOp::ShlAssign(_) => syn::BinOp::Shl(Default::default()),
        syn::BinOp::ShrAssign(_) => syn::BinOp::Shr(Default::default()),
        _ => return None,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Short-Circuit Logical Operators
// ═══════════════════════════════════════════════════════════════════════

/// `&&` stops at the first `false`, `||` at the first `true`.
fn eval_logical(
    expr: &syn::ExprBinary,
    short_circuit_on: bool,
    env: &mut Environment,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let op = if short_circuit_on { "||" } else { "&&" };
    for side in [&expr.left, &expr.right] {
        match side.eval(env, ctx)? {
            Value::Bool(b) if b == short_circuit_on => return Ok(Value::Bool(b)),
            Value::Bool(_) => {}
            other => {
                return Err(EvalError::type_error(format!(
                    "`{}` expects `bool` operands, found `{}`",
                    op,
                    type_name(&other)
                )))
            }
        }
    }
    Ok(Value::Bool(!short_circuit_on))
}

// ═══════════════════════════════════════════════════════════════════════
// Operators on Values
// ═══════════════════════════════════════════════════════════════════════

/// Apply a non-assigning binary operator to two evaluated operands.
pub fn apply_binop(op: &syn::BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        syn::BinOp::Add(_) => eval_add(left, right),
        syn::BinOp::Sub(_) => int_or_float(left, right, "-", i64::checked_sub, |a, b| a - b),
        syn::BinOp::Mul(_) => int_or_float(left, right, "*", i64::checked_mul, |a, b| a * b),
        syn::BinOp::Div(_) => {
            if matches!(right, Value::Int(0)) && matches!(left, Value::Int(_)) {
                return Err(EvalError::DivisionByZero);
            }
            int_or_float(left, right, "/", i64::checked_div, |a, b| a / b)
        }
        syn::BinOp::Rem(_) => {
            if matches!(right, Value::Int(0)) && matches!(left, Value::Int(_)) {
                return Err(EvalError::DivisionByZero);
            }
            int_or_float(left, right, "%", i64::checked_rem, |a, b| a % b)
        }

        // Comparison
        syn::BinOp::Eq(_) => Ok(Value::Bool(left == right)),
        syn::BinOp::Ne(_) => Ok(Value::Bool(left != right)),
        syn::BinOp::Lt(_) => compare(left, right, "<", |o| o == Ordering::Less),
        syn::BinOp::Le(_) => compare(left, right, "<=", |o| o != Ordering::Greater),
        syn::BinOp::Gt(_) => compare(left, right, ">", |o| o == Ordering::Greater),
        syn::BinOp::Ge(_) => compare(left, right, ">=", |o| o != Ordering::Less),

        // Bitwise
        syn::BinOp::BitAnd(_) => bitwise(left, right, "&", |a, b| a & b, |a, b| a & b),
        syn::BinOp::BitOr(_) => bitwise(left, right, "|", |a, b| a | b, |a, b| a | b),
        syn::BinOp::BitXor(_) => bitwise(left, right, "^", |a, b| a ^ b, |a, b| a ^ b),
        syn::BinOp::Shl(_) => shift(left, right, "<<", i64::checked_shl),
        syn::BinOp::Shr(_) => shift(left, right, ">>", i64::checked_shr),

        _ => Err(EvalError::UnsupportedExpr {
            kind: format!("binary operator `{}`", super::source_text(op)),
        }),
    }
}

fn mismatch(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::type_error(format!(
        "cannot apply `{}` to `{}` and `{}`",
        op,
        type_name(left),
        type_name(right)
    ))
}

fn eval_add(left: Value, right: Value) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => {
            let mut s = a.as_ref().clone();
            s.push_str(b);
            Ok(Value::string(s))
        }
        _ => int_or_float(left, right, "+", i64::checked_add, |a, b| a + b),
    }
}

fn int_or_float(
    left: Value,
    right: Value,
    op: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            int_op(*a, *b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::IntegerOverflow { op: op.to_string() })
        }
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(*a, *b))),
        _ => Err(mismatch(op, &left, &right)),
    }
}

fn compare(
    left: Value,
    right: Value,
    op: &str,
    test: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    match left.compare(&right) {
        Some(ordering) => Ok(Value::Bool(test(ordering))),
        // NaN compares false against everything
        None if matches!((&left, &right), (Value::Float(_), Value::Float(_))) => {
            Ok(Value::Bool(false))
        }
        None => Err(mismatch(op, &left, &right)),
    }
}

fn bitwise(
    left: Value,
    right: Value,
    op: &str,
    int_op: fn(i64, i64) -> i64,
    bool_op: fn(bool, bool) -> bool,
) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(bool_op(*a, *b))),
        _ => Err(mismatch(op, &left, &right)),
    }
}

fn shift(
    left: Value,
    right: Value,
    op: &str,
    int_op: fn(i64, u32) -> Option<i64>,
) -> Result<Value, EvalError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => u32::try_from(*b)
            .ok()
            .and_then(|b| int_op(*a, b))
            .map(Value::Int)
            .ok_or_else(|| EvalError::IntegerOverflow { op: op.to_string() }),
        _ => Err(mismatch(op, &left, &right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::BindingMode;

    fn eval(expr: syn::Expr) -> Result<Value, EvalError> {
        expr.eval(&mut Environment::new(), &EvalContext::new())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(syn::parse_quote!(1 + 2 * 3)).unwrap(), Value::Int(7));
        assert_eq!(eval(syn::parse_quote!(7 / 2)).unwrap(), Value::Int(3));
        assert_eq!(eval(syn::parse_quote!(-7 % 3)).unwrap(), Value::Int(-1));
        assert_eq!(eval(syn::parse_quote!(1.5 * 2.0)).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn test_checked_errors() {
        assert!(matches!(
            eval(syn::parse_quote!(1 / 0)),
            Err(EvalError::DivisionByZero)
        ));
        assert!(matches!(
            eval(syn::parse_quote!(9223372036854775807 + 1)),
            Err(EvalError::IntegerOverflow { .. })
        ));
        assert!(matches!(
            eval(syn::parse_quote!(1 + 1.0)),
            Err(EvalError::TypeError { .. })
        ));
    }

    #[test]
    fn test_string_concat_and_compare() {
        assert_eq!(
            eval(syn::parse_quote!("ab" + "cd")).unwrap(),
            Value::string("abcd")
        );
        assert_eq!(eval(syn::parse_quote!("a" < "b")).unwrap(), Value::Bool(true));
        assert_eq!(eval(syn::parse_quote!((1, 2) >= (1, 3))).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_short_circuit() {
        // The right side would fail if evaluated
        assert_eq!(
            eval(syn::parse_quote!(false && undefined)).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            eval(syn::parse_quote!(true || undefined)).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_compound_assignment() {
        let mut env = Environment::new();
        env.define_with_mode("x", Value::Int(10), BindingMode::Mutable);
        let expr: syn::Expr = syn::parse_quote!(x -= 3);
        expr.eval(&mut env, &EvalContext::new()).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(7)));
    }
}
