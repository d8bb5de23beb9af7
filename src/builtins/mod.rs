//! The builtin function table (spec §6). Registered once into the global
//! environment before a script runs. Most builtins are pure functions of
//! their arguments; the handful that touch the outside world (`print`,
//! file I/O) close over a [`PrintSink`] instead of reaching for a
//! process-global, so `run_capture` and the CLI binary can each wire up
//! their own destination.

mod core;
pub mod methods;

use std::rc::Rc;

use crate::diagnostics::VlError;
use crate::environment::EnvRef;
use crate::span::Span;
use crate::value::{Arity, BuiltinValue, Value};

/// What a builtin sees at a call site: its already-evaluated arguments
/// and the span of the call, for `ArgumentError`/`TypeError` messages.
pub struct Call<'a> {
    pub args: &'a [Value],
    pub span: Span,
}

impl<'a> Call<'a> {
    pub fn arg(&self, i: usize) -> &Value {
        &self.args[i]
    }

    pub fn type_error(&self, message: impl Into<String>) -> VlError {
        VlError::type_(message, self.span)
    }

    pub fn argument_error(&self, message: impl Into<String>) -> VlError {
        VlError::argument(message, self.span)
    }
}

/// Where `print` and file-writing builtins send their output. A plain
/// `Fn`, not `FnMut`, so it can be freely cloned into every closure that
/// needs it; callers that need to accumulate text use interior
/// mutability (`Rc<RefCell<String>>`) inside the closure itself.
pub type PrintSink = Rc<dyn Fn(&str)>;

fn register(env: &EnvRef, name: &str, arity: Arity, func: impl Fn(&Call) -> Result<Value, VlError> + 'static) {
    env.define(
        name,
        Value::Builtin(Rc::new(BuiltinValue { name: name.to_string(), arity, func: Box::new(func) })),
    );
}

pub fn register_all(env: &EnvRef, sink: PrintSink) {
    core::register(env, sink);
}

/// Human-readable form used by `str(x)` and `print(x)`: strings render
/// without surrounding quotes.
pub fn display(v: &Value) -> String {
    match v {
        Value::Str(s) => s.to_string(),
        // `print(e)` on a caught exception yields its message, not its
        // kind tag (spec §4.5: "print(e) yields the message").
        Value::Exception(e) => e.display_message().to_string(),
        other => repr(other),
    }
}

/// Form used for container elements, where strings need to stay
/// distinguishable from identifiers/numbers (`["a", 1]`, not `[a, 1]`).
pub fn repr(v: &Value) -> String {
    match v {
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Str(s) => format!("\"{}\"", escape_for_repr(s)),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::List(l) => {
            let items: Vec<String> = l.borrow().iter().map(repr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Tuple(t) => {
            let items: Vec<String> = t.iter().map(repr).collect();
            format!("({})", items.join(", "))
        }
        Value::Dict(d) => {
            let d = d.borrow();
            let items: Vec<String> =
                d.iter().map(|(k, v)| format!("{}: {}", repr(&k.clone().into_value()), repr(v))).collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Set(s) => {
            let s = s.borrow();
            let items: Vec<String> = s.iter().map(|k| repr(&k.clone().into_value())).collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Function(f) => format!("<function {}>", f.name),
        Value::Builtin(b) => format!("<builtin {}>", b.name),
        Value::Task(_) => "<task>".to_string(),
        Value::Exception(e) => format!("{}: {}", e.kind, e.message),
    }
}

/// VirtoLang prints whole-valued floats with one decimal place so `6 / 2`
/// reads as `3.0`, never silently collapsing back to the int `3` (spec
/// §3.1, integer division promotes to float).
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if f == f.trunc() && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn escape_for_repr(s: &str) -> String {
    s.chars().flat_map(|c| match c {
        '"' => vec!['\\', '"'],
        '\\' => vec!['\\', '\\'],
        '\n' => vec!['\\', 'n'],
        other => vec![other],
    }).collect()
}
