//! Methods on integers and floats

use crate::{EvalError, Value};

use super::{expected_arg, int_arg, usize_arg, MethodCall};

fn overflow(op: &str) -> EvalError {
    EvalError::IntegerOverflow { op: op.to_string() }
}

fn exponent(value: &Value, method: &str) -> Result<u32, EvalError> {
    let n = usize_arg(value, method)?;
    u32::try_from(n).map_err(|_| expected_arg("u32", value, method))
}

/// Methods on an integer.
pub(super) fn call_int(n: i64, call: &MethodCall<'_>) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let value = match method {
        "abs" => Value::Int(n.checked_abs().ok_or_else(|| overflow("abs"))?),
        "signum" => Value::Int(n.signum()),
        "is_positive" => Value::Bool(n.is_positive()),
        "is_negative" => Value::Bool(n.is_negative()),
        "pow" => {
            let [exp] = call.args::<1>()?;
            Value::Int(n.checked_pow(exponent(exp, method)?).ok_or_else(|| overflow("pow"))?)
        }
        "checked_pow" => {
            let [exp] = call.args::<1>()?;
            Value::from(n.checked_pow(exponent(exp, method)?))
        }
        "checked_add" | "checked_sub" | "checked_mul" | "checked_div" | "checked_rem" => {
            let [other] = call.args::<1>()?;
            let m = int_arg(other, method)?;
            Value::from(match method {
                "checked_add" => n.checked_add(m),
                "checked_sub" => n.checked_sub(m),
                "checked_mul" => n.checked_mul(m),
                "checked_div" => n.checked_div(m),
                _ => n.checked_rem(m),
            })
        }
        "saturating_add" | "saturating_sub" | "saturating_mul" => {
            let [other] = call.args::<1>()?;
            let m = int_arg(other, method)?;
            Value::Int(match method {
                "saturating_add" => n.saturating_add(m),
                "saturating_sub" => n.saturating_sub(m),
                _ => n.saturating_mul(m),
            })
        }
        "wrapping_add" | "wrapping_sub" | "wrapping_mul" => {
            let [other] = call.args::<1>()?;
            let m = int_arg(other, method)?;
            Value::Int(match method {
                "wrapping_add" => n.wrapping_add(m),
                "wrapping_sub" => n.wrapping_sub(m),
                _ => n.wrapping_mul(m),
            })
        }
        "rem_euclid" | "div_euclid" => {
            let [other] = call.args::<1>()?;
            let m = int_arg(other, method)?;
            if m == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Value::Int(if method == "rem_euclid" {
                n.rem_euclid(m)
            } else {
                n.div_euclid(m)
            })
        }
        "abs_diff" => {
            let [other] = call.args::<1>()?;
            let diff = n.abs_diff(int_arg(other, method)?);
            Value::Int(i64::try_from(diff).map_err(|_| overflow("abs_diff"))?)
        }
        "clamp" => {
            let [lo, hi] = call.args::<2>()?;
            let (lo, hi) = (int_arg(lo, method)?, int_arg(hi, method)?);
            if lo > hi {
                return Err(EvalError::panic("assertion failed: min <= max"));
            }
            Value::Int(n.clamp(lo, hi))
        }
        "count_ones" => Value::Int(n.count_ones().into()),
        "count_zeros" => Value::Int(n.count_zeros().into()),
        "leading_zeros" => Value::Int(n.leading_zeros().into()),
        "trailing_zeros" => Value::Int(n.trailing_zeros().into()),
        "is_power_of_two" => Value::Bool(n > 0 && (n & (n - 1)) == 0),
        "isqrt" => {
            if n < 0 {
                return Err(EvalError::panic("argument of integer square root cannot be negative"));
            }
            Value::Int((n as f64).sqrt() as i64)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn float_arg(value: &Value, method: &str) -> Result<f64, EvalError> {
    match value {
        Value::Float(x) => Ok(*x),
        other => Err(expected_arg("f64", other, method)),
    }
}

/// Methods on a float.
pub(super) fn call_float(x: f64, call: &MethodCall<'_>) -> Result<Option<Value>, EvalError> {
    let method = call.method;
    let unary: Option<fn(f64) -> f64> = match method {
        "abs" => Some(f64::abs),
        "sqrt" => Some(f64::sqrt),
        "cbrt" => Some(f64::cbrt),
        "exp" => Some(f64::exp),
        "ln" => Some(f64::ln),
        "log10" => Some(f64::log10),
        "log2" => Some(f64::log2),
        "floor" => Some(f64::floor),
        "ceil" => Some(f64::ceil),
        "round" => Some(f64::round),
        "trunc" => Some(f64::trunc),
        "fract" => Some(f64::fract),
        "sin" => Some(f64::sin),
        "cos" => Some(f64::cos),
        "tan" => Some(f64::tan),
        "asin" => Some(f64::asin),
        "acos" => Some(f64::acos),
        "atan" => Some(f64::atan),
        "signum" => Some(f64::signum),
        "recip" => Some(f64::recip),
        "to_degrees" => Some(f64::to_degrees),
        "to_radians" => Some(f64::to_radians),
        _ => None,
    };
    if let Some(f) = unary {
        return Ok(Some(Value::Float(f(x))));
    }

    let value = match method {
        "powi" => {
            let [exp] = call.args::<1>()?;
            let exp = i32::try_from(int_arg(exp, method)?).map_err(|_| overflow("powi"))?;
            Value::Float(x.powi(exp))
        }
        "powf" | "log" | "atan2" | "hypot" | "max" | "min" => {
            let [other] = call.args::<1>()?;
            let y = float_arg(other, method)?;
            Value::Float(match method {
                "powf" => x.powf(y),
                "log" => x.log(y),
                "atan2" => x.atan2(y),
                "hypot" => x.hypot(y),
                "max" => x.max(y),
                _ => x.min(y),
            })
        }
        "mul_add" => {
            let [a, b] = call.args::<2>()?;
            Value::Float(x.mul_add(float_arg(a, method)?, float_arg(b, method)?))
        }
        "clamp" => {
            let [lo, hi] = call.args::<2>()?;
            let (lo, hi) = (float_arg(lo, method)?, float_arg(hi, method)?);
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(EvalError::panic(format!(
                    "min > max, or either was NaN. min = {:?}, max = {:?}",
                    lo, hi
                )));
            }
            Value::Float(x.clamp(lo, hi))
        }
        "is_nan" => Value::Bool(x.is_nan()),
        "is_finite" => Value::Bool(x.is_finite()),
        "is_infinite" => Value::Bool(x.is_infinite()),
        "is_sign_positive" => Value::Bool(x.is_sign_positive()),
        "is_sign_negative" => Value::Bool(x.is_sign_negative()),
        _ => return Ok(None),
    };
    Ok(Some(value))
}
