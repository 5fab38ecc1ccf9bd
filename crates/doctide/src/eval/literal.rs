//! Literal evaluation

use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprLit {
    fn eval(&self, _env: &mut Environment, _ctx: &EvalContext) -> Result<Value, EvalError> {
        eval_lit(&self.lit)
    }
}

/// Evaluate a literal to a Value.
///
/// Integer and float suffixes are accepted but do not change the runtime
/// representation.
pub fn eval_lit(lit: &syn::Lit) -> Result<Value, EvalError> {
    match lit {
        syn::Lit::Str(s) => Ok(Value::string(s.value())),

        syn::Lit::ByteStr(bs) => Ok(Value::vec(
            bs.value().into_iter().map(|b| Value::Int(b.into())).collect(),
        )),

        syn::Lit::Byte(b) => Ok(Value::Int(b.value().into())),

        syn::Lit::Char(c) => Ok(Value::Char(c.value())),

        syn::Lit::Int(i) => i
            .base10_parse::<i64>()
            .map(Value::Int)
            .map_err(|_| EvalError::type_error(format!("integer literal `{}` is too large", i))),

        syn::Lit::Float(f) => f
            .base10_parse::<f64>()
            .map(Value::Float)
            .map_err(|e| EvalError::type_error(format!("invalid float literal: {}", e))),

        syn::Lit::Bool(b) => Ok(Value::Bool(b.value)),

        syn::Lit::CStr(_) => Err(EvalError::UnsupportedExpr {
            kind: "C string literal".to_string(),
        }),

        _ => Err(EvalError::UnsupportedExpr {
            kind: "literal".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(expr: syn::ExprLit) -> Value {
        expr.eval(&mut Environment::new(), &EvalContext::new()).unwrap()
    }

    #[test]
    fn test_suffixes_are_erased() {
        assert_eq!(lit(syn::parse_quote!(7u8)), Value::Int(7));
        assert_eq!(lit(syn::parse_quote!(1_000i32)), Value::Int(1000));
        assert_eq!(lit(syn::parse_quote!(2.5f32)), Value::Float(2.5));
    }

    #[test]
    fn test_text_literals() {
        assert_eq!(lit(syn::parse_quote!("hi")), Value::string("hi"));
        assert_eq!(lit(syn::parse_quote!('x')), Value::Char('x'));
        assert_eq!(lit(syn::parse_quote!(b'a')), Value::Int(97));
    }

    #[test]
    fn test_oversized_integer() {
        let expr: syn::ExprLit = syn::parse_quote!(99999999999999999999);
        assert!(expr.eval(&mut Environment::new(), &EvalContext::new()).is_err());
    }
}
