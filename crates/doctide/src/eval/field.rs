//! Field expression evaluation

use crate::error::type_name;
use crate::{Environment, EvalContext, EvalError, Value};

use super::Evaluate;

impl Evaluate for syn::ExprField {
    fn eval(&self, env: &mut Environment, ctx: &EvalContext) -> Result<Value, EvalError> {
        let base = self.base.eval(env, ctx)?;
        get_field(&base, &member_name(&self.member))
    }
}

/// `name` for named members, `0`, `1`, ... for positional ones.
pub fn member_name(member: &syn::Member) -> String {
    match member {
        syn::Member::Named(ident) => ident.to_string(),
        syn::Member::Unnamed(index) => index.index.to_string(),
    }
}

/// Read a field of a struct or tuple.
pub fn get_field(base: &Value, field: &str) -> Result<Value, EvalError> {
    let found = match base {
        Value::Struct(s) => s.get(field).cloned(),
        Value::Tuple(items) => field.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    };
    found.ok_or_else(|| EvalError::UndefinedField {
        type_name: match base {
            Value::Struct(s) => s.type_name.clone(),
            other => type_name(other).to_string(),
        },
        field: field.to_string(),
    })
}
