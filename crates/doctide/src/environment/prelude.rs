//! Standard prelude with built-in functions

use std::cmp::Ordering;
use std::time::Duration;

use super::Environment;
use crate::context::EvalContext;
use crate::error::type_name;
use crate::value::{BuiltinFn, FutureValue, Value};

impl Environment {
    /// Create an environment with standard built-in functions.
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        env.load_prelude();
        env
    }

    /// Load the standard prelude into this environment.
    pub fn load_prelude(&mut self) {
        // Printing
        self.define_builtin(BuiltinFn::new("print", -1, builtin_print));
        self.define_builtin(BuiltinFn::new("println", -1, builtin_println));

        // Type inspection
        self.define_builtin(BuiltinFn::new("type_of", 1, builtin_type_of));

        // Futures
        self.define_builtin(BuiltinFn::new("sleep", 1, builtin_sleep));
        self.define_builtin(BuiltinFn::new("ready", 1, builtin_ready));

        // Constructors
        self.define_builtin(BuiltinFn::new("String::new", 0, |_, _| Ok(Value::string(""))));
        self.define_builtin(BuiltinFn::new("String::from", 1, builtin_string_from));
        self.define_builtin(BuiltinFn::new("Vec::new", 0, |_, _| Ok(Value::vec(Vec::new()))));
        self.define_builtin(BuiltinFn::new("Vec::with_capacity", 1, |_, _| {
            Ok(Value::vec(Vec::new()))
        }));
        self.define_builtin(BuiltinFn::new("HashMap::new", 0, |_, _| Ok(Value::map())));
        self.define_builtin(BuiltinFn::new("Some", 1, |args, _| Ok(Value::some(args[0].clone()))));
        self.define_builtin(BuiltinFn::new("Ok", 1, |args, _| Ok(Value::ok(args[0].clone()))));
        self.define_builtin(BuiltinFn::new("Err", 1, |args, _| Ok(Value::err(args[0].clone()))));
        self.define("None", Value::none());
        self.define("Ordering::Less", Value::ordering(Ordering::Less));
        self.define("Ordering::Equal", Value::ordering(Ordering::Equal));
        self.define("Ordering::Greater", Value::ordering(Ordering::Greater));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn builtin_print(args: &[Value], ctx: &EvalContext) -> Result<Value, String> {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    ctx.stdout.write_str(&line);
    Ok(Value::Unit)
}

fn builtin_println(args: &[Value], ctx: &EvalContext) -> Result<Value, String> {
    builtin_print(args, ctx)?;
    ctx.stdout.write_str("\n");
    Ok(Value::Unit)
}

fn builtin_type_of(args: &[Value], _ctx: &EvalContext) -> Result<Value, String> {
    match &args[0] {
        Value::Struct(s) => Ok(Value::string(s.type_name.as_str())),
        other => Ok(Value::string(type_name(other))),
    }
}

fn builtin_sleep(args: &[Value], _ctx: &EvalContext) -> Result<Value, String> {
    let millis = args[0]
        .as_i64()
        .and_then(|ms| u64::try_from(ms).ok())
        .ok_or_else(|| format!("sleep expects a non-negative integer, got {:?}", args[0]))?;
    // The timer is created on first poll, inside the driver's runtime.
    let future = async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(Value::Unit)
    };
    Ok(Value::Future(FutureValue::native("sleep", future)))
}

fn builtin_ready(args: &[Value], _ctx: &EvalContext) -> Result<Value, String> {
    let value = args[0].clone();
    Ok(Value::Future(FutureValue::native("ready", async move {
        Ok(value)
    })))
}

fn builtin_string_from(args: &[Value], _ctx: &EvalContext) -> Result<Value, String> {
    match &args[0] {
        Value::String(_) => Ok(args[0].clone()),
        Value::Char(c) => Ok(Value::string(c.to_string())),
        other => Err(format!(
            "the trait `From<{}>` is not implemented for `String`",
            type_name(other)
        )),
    }
}
