//! Running examples in a persistent session
//!
//! Each example runs as one unit: its statements are evaluated in a fresh
//! frame on top of the session's globals, and the names the unit binds at
//! its top level are promoted into the globals afterwards, so later
//! examples see them.

use std::sync::Arc;

use crate::config::Options;
use crate::context::{Driver, Interrupt};
use crate::eval::function::catch_return;
use crate::eval::path::last_segment;
use crate::eval::pattern::bound_names;
use crate::eval::stmt::eval_stmts;
use crate::value::pretty::{pretty, DEFAULT_WIDTH};
use crate::{Environment, EvalContext, EvalError, Value};

/// Header of an error annotation.
pub const TRACEBACK_HEADER: &str = "Traceback (most recent call last):\n    ...\n";

/// Result of running one example to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Printed output followed by the rendered result, newline terminated if non-empty
    pub captured: String,
    /// Error summary; present iff the example failed
    pub error: Option<String>,
}

impl Outcome {
    fn failed(error: &EvalError) -> Self {
        Self {
            captured: String::new(),
            error: Some(format!("{}{}: {}\n", TRACEBACK_HEADER, error.kind(), error)),
        }
    }

    /// Whether the example ran without error.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// The error summary when failed, the captured output otherwise.
    pub fn text(&self) -> &str {
        self.error.as_deref().unwrap_or(&self.captured)
    }
}

/// What happened to an example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// The example ran, successfully or not
    Completed(Outcome),
    /// The run was interrupted; nothing about the example is known
    Cancelled,
}

/// Evaluation state shared by the examples of one document.
pub struct Session {
    env: Environment,
    ctx: EvalContext,
}

impl Session {
    /// Create a session with default options.
    pub fn new() -> std::io::Result<Self> {
        Self::from_options(&Options::default())
    }

    /// Create a session with its own async driver.
    pub fn from_options(options: &Options) -> std::io::Result<Self> {
        Self::with_interrupt(options, Interrupt::new())
    }

    /// Create a session cancelled by a shared `interrupt`.
    pub fn with_interrupt(options: &Options, interrupt: Interrupt) -> std::io::Result<Self> {
        let driver = Arc::new(Driver::new()?);
        let ctx = EvalContext::new()
            .with_driver(driver)
            .with_interrupt(interrupt)
            .with_await_timeout(options.await_timeout());

        let mut env = Environment::with_max_call_depth(options.max_call_depth);
        env.load_prelude();
        Ok(Self { env, ctx })
    }

    /// Handle that cancels the running example when tripped.
    pub fn interrupt(&self) -> &Interrupt {
        &self.ctx.interrupt
    }

    /// The session's bindings.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Run one example's source.
    pub fn execute(&mut self, source: &str) -> Execution {
        match self.run(source) {
            Ok(captured) => Execution::Completed(Outcome {
                captured,
                error: None,
            }),
            Err(EvalError::Interrupted) => Execution::Cancelled,
            Err(error) => {
                tracing::debug!(kind = error.kind(), %error, "example failed");
                Execution::Completed(Outcome::failed(&error))
            }
        }
    }

    fn run(&mut self, source: &str) -> Result<String, EvalError> {
        let unit = parse_unit(source)?;
        let names = unit_bindings(&unit);

        let capture = self.ctx.stdout.capture();
        self.env.push_frame();
        let result = catch_return(eval_stmts(&unit, &mut self.env, &self.ctx));
        // Bindings made before a failure still persist
        self.env.pop_frame_promoting(&names);
        let value = result?;

        let mut captured = capture.finish();
        if !value.is_unit() {
            captured.push_str(&render_value(&value));
            captured.push('\n');
        }
        if !captured.is_empty() && !captured.ends_with('\n') {
            captured.push('\n');
        }
        Ok(captured)
    }
}

/// Pretty form of a result, or its `Debug` text when it has none.
fn render_value(value: &Value) -> String {
    pretty(value, DEFAULT_WIDTH).unwrap_or_else(|_| format!("{:?}", value))
}

/// Parse example source as a block body, turning a trailing expression into
/// an explicit `return` so the unit yields its value.
pub fn parse_unit(source: &str) -> Result<Vec<syn::Stmt>, EvalError> {
    let block: syn::Block =
        syn::parse_str(&format!("{{\n{}\n}}", source)).map_err(|e| EvalError::Syntax {
            message: e.to_string(),
        })?;
    let mut stmts = block.stmts;

    let tail = match stmts.last() {
        Some(syn::Stmt::Expr(expr, None)) => Some(expr.clone()),
        Some(syn::Stmt::Macro(stmt)) if stmt.semi_token.is_none() => {
            Some(syn::Expr::Macro(syn::ExprMacro {
                attrs: stmt.attrs.clone(),
                mac: stmt.mac.clone(),
            }))
        }
        _ => None,
    };
    if let (Some(expr), Some(last)) = (tail, stmts.last_mut()) {
        *last = syn::parse_quote!(return #expr;);
    }
    Ok(stmts)
}

/// Names a unit binds at its top level.
pub fn unit_bindings(stmts: &[syn::Stmt]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        match stmt {
            syn::Stmt::Local(local) => bound_names(&local.pat, &mut names),
            syn::Stmt::Item(item) => item_bindings(item, &mut names),
            _ => {}
        }
    }
    names
}

fn item_bindings(item: &syn::Item, names: &mut Vec<String>) {
    match item {
        syn::Item::Fn(item) => names.push(item.sig.ident.to_string()),
        syn::Item::Const(item) => names.push(item.ident.to_string()),
        syn::Item::Static(item) => names.push(item.ident.to_string()),
        syn::Item::Struct(item) => names.push(item.ident.to_string()),
        syn::Item::Impl(item) => {
            let syn::Type::Path(self_ty) = item.self_ty.as_ref() else {
                return;
            };
            let type_name = last_segment(&self_ty.path);
            for impl_item in &item.items {
                match impl_item {
                    syn::ImplItem::Fn(method) => {
                        names.push(format!("{}::{}", type_name, method.sig.ident));
                    }
                    syn::ImplItem::Const(constant) => {
                        names.push(format!("{}::{}", type_name, constant.ident));
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
