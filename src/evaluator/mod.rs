//! Tree-walking evaluator (spec §4.3). Statement evaluation returns a
//! [`Signal`] — the vocabulary the glossary calls a "control-flow
//! signal" — so `return`/`raise` can unwind through nested blocks
//! without Rust-level panics or a separate exception mechanism.
//! Expression evaluation returns a plain `Result`, since expressions
//! can't `return`; a `raise`-worthy failure simply surfaces as `Err`.

pub(crate) mod ops;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Expr, Param, Stmt};
use crate::diagnostics::{ErrorKind, VlError};
use crate::environment::{Env, EnvRef};
use crate::loader::Loader;
use crate::runtime::{Task, TaskBody, TaskRef};
use crate::span::Span;
use crate::value::{Arity, BuiltinValue, FunctionValue, Value};

/// What running a statement produced: either it fell through normally,
/// it unwound with a `return` value, or it unwound with a raised
/// exception still looking for a handler.
pub enum Signal {
    Normal,
    Return(Value),
    Raised(VlError),
}

pub fn eval_program(stmts: &[Stmt], env: &EnvRef, loader: &Loader) -> Signal {
    eval_block(stmts, env, loader)
}

/// Blocks never push a new frame (spec §3.3): `if`/`while`/`for` bodies
/// and `{ ... }` all run against the same `env` their enclosing
/// statement already has.
pub fn eval_block(stmts: &[Stmt], env: &EnvRef, loader: &Loader) -> Signal {
    for stmt in stmts {
        match eval_stmt(stmt, env, loader) {
            Signal::Normal => continue,
            other => return other,
        }
    }
    Signal::Normal
}

pub fn eval_stmt(stmt: &Stmt, env: &EnvRef, loader: &Loader) -> Signal {
    match stmt {
        Stmt::Assign { name, value, .. } => match eval_expr(value, env, loader) {
            Ok(v) => {
                env.assign(name, v);
                Signal::Normal
            }
            Err(e) => Signal::Raised(e),
        },

        Stmt::Expr(expr) => match eval_expr(expr, env, loader) {
            Ok(_) => Signal::Normal,
            Err(e) => Signal::Raised(e),
        },

        Stmt::If { branches, else_branch, .. } => {
            for (cond, body) in branches {
                match eval_expr(cond, env, loader) {
                    Ok(v) => {
                        if v.is_truthy() {
                            return eval_block(body, env, loader);
                        }
                    }
                    Err(e) => return Signal::Raised(e),
                }
            }
            match else_branch {
                Some(body) => eval_block(body, env, loader),
                None => Signal::Normal,
            }
        }

        Stmt::While { cond, body, .. } => loop {
            match eval_expr(cond, env, loader) {
                Ok(v) => {
                    if !v.is_truthy() {
                        return Signal::Normal;
                    }
                }
                Err(e) => return Signal::Raised(e),
            }
            match eval_block(body, env, loader) {
                Signal::Normal => continue,
                other => return other,
            }
        },

        Stmt::For { var, iter, body, span } => {
            let items = match eval_expr(iter, env, loader).and_then(|v| ops::iterate(&v, *span)) {
                Ok(items) => items,
                Err(e) => return Signal::Raised(e),
            };
            for item in items {
                env.define(var.clone(), item);
                match eval_block(body, env, loader) {
                    Signal::Normal => continue,
                    other => return other,
                }
            }
            Signal::Normal
        }

        Stmt::Return { value, .. } => match value {
            Some(expr) => match eval_expr(expr, env, loader) {
                Ok(v) => Signal::Return(v),
                Err(e) => Signal::Raised(e),
            },
            None => Signal::Return(Value::Null),
        },

        Stmt::Raise { value, span } => match eval_expr(value, env, loader) {
            Ok(Value::Exception(e)) => Signal::Raised(tag_user_error((*e).clone(), value)),
            Ok(other) => Signal::Raised(VlError::type_(
                format!("can only raise an exception, found '{}'", other.type_name()),
                *span,
            )),
            Err(e) => Signal::Raised(e),
        },

        Stmt::Try { body, handlers, finally, .. } => {
            let result = eval_block(body, env, loader);
            let after_handlers = match result {
                Signal::Raised(e) => dispatch_handlers(e, handlers, env, loader),
                other => other,
            };
            match finally {
                Some(block) => match eval_block(block, env, loader) {
                    Signal::Normal => after_handlers,
                    overriding => overriding,
                },
                None => after_handlers,
            }
        }

        Stmt::Import { path, span } => match loader.import(path, *span, env) {
            Ok(()) => Signal::Normal,
            Err(e) => Signal::Raised(e),
        },

        Stmt::FuncDef { name, params, body, is_async, .. } => {
            let func = Value::Function(Rc::new(FunctionValue {
                name: name.clone(),
                params: params.clone(),
                body: body.clone(),
                closure: env.clone(),
                is_async: *is_async,
            }));
            env.define(name.clone(), func);
            Signal::Normal
        }

        Stmt::Block(stmts) => eval_block(stmts, env, loader),
    }
}

/// Run a `try`'s handlers against a raised error: the first clause whose
/// declared name matches (spec §4.3/§9, `Error` is the universal
/// super-tag) runs with its optional `as name` binding in the same
/// frame the `try` itself runs in, since handler bodies are blocks too.
fn dispatch_handlers(err: VlError, handlers: &[crate::ast::ExceptClause], env: &EnvRef, loader: &Loader) -> Signal {
    for handler in handlers {
        if err.matches_except(&handler.name) {
            if let Some(binding) = &handler.binding {
                env.define(binding.clone(), Value::Exception(Rc::new(err)));
            }
            return eval_block(&handler.body, env, loader);
        }
    }
    Signal::Raised(err)
}

/// Re-tag a raised value produced by calling a user-defined "exception
/// class" function (spec §4.3/§9): `raise ValueTooSmall(msg)` where
/// `ValueTooSmall` is a plain function returning `Error(msg)` is
/// indistinguishable, at the `Error(...)` call site, from a raw
/// `raise Error(msg)`. The distinguishing signal is only visible here,
/// at the `raise` site, by looking at the AST shape of what was raised.
fn tag_user_error(err: VlError, raised: &Expr) -> VlError {
    if err.kind != ErrorKind::Error {
        return err;
    }
    if let Expr::Call { callee, .. } = raised {
        if let Expr::Ident(name, _) = callee.as_ref() {
            if name != "Error" {
                let mut err = err;
                err.kind = ErrorKind::User(name.clone());
                return err;
            }
        }
    }
    err
}

pub fn eval_expr(expr: &Expr, env: &EnvRef, loader: &Loader) -> Result<Value, VlError> {
    match expr {
        Expr::Int(n, _) => Ok(Value::Int(*n)),
        Expr::Float(f, _) => Ok(Value::Float(*f)),
        Expr::Str(s, _) => Ok(Value::Str(s.clone())),
        Expr::Bool(b, _) => Ok(Value::Bool(*b)),
        Expr::Null(_) => Ok(Value::Null),

        Expr::Ident(name, span) => env.get(name).ok_or_else(|| VlError::name(format!("name '{name}' is not defined"), *span)),

        Expr::List(items, _) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, env, loader)?);
            }
            Ok(Value::List(Rc::new(RefCell::new(values))))
        }

        Expr::Call { callee, args, span } => eval_call(callee, args, *span, env, loader),

        Expr::Index { target, index, span } => {
            let target = eval_expr(target, env, loader)?;
            let index = eval_expr(index, env, loader)?;
            ops::index(&target, &index, *span)
        }

        Expr::Attribute { target, name, span } => {
            let receiver = eval_expr(target, env, loader)?;
            bind_method(receiver, name.clone(), *span)
        }

        Expr::Unary { op, operand, span } => {
            let v = eval_expr(operand, env, loader)?;
            ops::unary(*op, v, *span)
        }

        Expr::Binary { op, lhs, rhs, span } => eval_binary(*op, lhs, rhs, *span, env, loader),

        Expr::Await { value, span: _ } => match eval_expr(value, env, loader)? {
            Value::Task(task) => await_value(&task, loader),
            other => Ok(other),
        },

        Expr::Run { path, span } => {
            let path = expect_str(eval_expr(path, env, loader)?, *span)?;
            loader.run_file_value(&path, *span)
        }

        Expr::RunAsync { path, span } => {
            let path = expect_str(eval_expr(path, env, loader)?, *span)?;
            loader.spawn_run_async(&path, *span)
        }

        Expr::Lambda { params, body, span: _ } => Ok(Value::Function(Rc::new(FunctionValue {
            name: "<lambda>".to_string(),
            params: params.iter().map(|name| Param { name: name.clone() }).collect(),
            body: body.clone(),
            closure: env.clone(),
            is_async: false,
        }))),

        Expr::Assign { name, value, .. } => {
            let v = eval_expr(value, env, loader)?;
            env.assign(name, v.clone());
            Ok(v)
        }
    }
}

fn expect_str(v: Value, span: Span) -> Result<String, VlError> {
    match v {
        Value::Str(s) => Ok(s.to_string()),
        other => Err(VlError::type_(format!("expected a str path, found '{}'", other.type_name()), span)),
    }
}

/// `and`/`or` short-circuit (spec §4.3), so they're special-cased here
/// rather than in `ops::binary`, which only ever sees two already-
/// evaluated operands.
fn eval_binary(op: crate::ast::BinaryOp, lhs: &Expr, rhs: &Expr, span: Span, env: &EnvRef, loader: &Loader) -> Result<Value, VlError> {
    use crate::ast::BinaryOp;
    match op {
        BinaryOp::And => {
            let l = eval_expr(lhs, env, loader)?;
            if !l.is_truthy() {
                return Ok(l);
            }
            eval_expr(rhs, env, loader)
        }
        BinaryOp::Or => {
            let l = eval_expr(lhs, env, loader)?;
            if l.is_truthy() {
                return Ok(l);
            }
            eval_expr(rhs, env, loader)
        }
        op => {
            let l = eval_expr(lhs, env, loader)?;
            let r = eval_expr(rhs, env, loader)?;
            ops::binary(op, l, r, span)
        }
    }
}

/// `target.method(args)` is dispatched directly through
/// [`crate::builtins::methods::call`] rather than going through
/// `bind_method` + `call_value`, since `Value` has no vtable and
/// re-allocating a closure for every method call would be wasteful on
/// the hot path.
fn eval_call(callee: &Expr, args: &[Expr], span: Span, env: &EnvRef, loader: &Loader) -> Result<Value, VlError> {
    if let Expr::Attribute { target, name, .. } = callee {
        let receiver = eval_expr(target, env, loader)?;
        let args = eval_args(args, env, loader)?;
        return crate::builtins::methods::call(&receiver, name, &args, span);
    }
    let callee = eval_expr(callee, env, loader)?;
    let args = eval_args(args, env, loader)?;
    call_value(callee, args, span, loader)
}

fn eval_args(args: &[Expr], env: &EnvRef, loader: &Loader) -> Result<Vec<Value>, VlError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval_expr(arg, env, loader)?);
    }
    Ok(values)
}

/// A standalone `target.name` (not immediately called) produces a
/// zero-argument-capable bound method: a `Value::Builtin` closure that
/// captures the receiver and redispatches through the same method
/// table `target.name(args)` uses.
fn bind_method(receiver: Value, name: String, span: Span) -> Result<Value, VlError> {
    if !crate::builtins::methods::exists(&receiver, &name) {
        return Err(VlError::type_(format!("'{}' object has no attribute '{name}'", receiver.type_name()), span));
    }
    let bound = BuiltinValue {
        name: name.clone(),
        arity: Arity::at_least(0),
        func: Box::new(move |call: &crate::builtins::Call| crate::builtins::methods::call(&receiver, &name, call.args, call.span)),
    };
    Ok(Value::Builtin(Rc::new(bound)))
}

pub fn call_value(callee: Value, args: Vec<Value>, span: Span, loader: &Loader) -> Result<Value, VlError> {
    match callee {
        Value::Function(f) => {
            if f.params.len() != args.len() {
                return Err(VlError::argument(
                    format!("{}() takes {} argument(s) but {} were given", f.name, f.params.len(), args.len()),
                    span,
                ));
            }
            if f.is_async {
                let task = Task::new(TaskBody::Call { func: f, args });
                loader.scheduler_spawn(task.clone());
                Ok(Value::Task(task))
            } else {
                call_sync(&f, args, span, loader)
            }
        }
        Value::Builtin(b) => {
            if !b.arity.contains(args.len()) {
                return Err(VlError::argument(arity_message(&b.name, &b.arity, args.len()), span));
            }
            (b.func)(&crate::builtins::Call { args: &args, span })
        }
        other => Err(VlError::type_(format!("'{}' object is not callable", other.type_name()), span)),
    }
}

fn arity_message(name: &str, arity: &Arity, got: usize) -> String {
    let expected = match arity.max {
        Some(max) if max == arity.min => format!("{max}"),
        Some(max) => format!("{}..{max}", arity.min),
        None => format!("at least {}", arity.min),
    };
    format!("{name}() expects {expected} argument(s), got {got}")
}

/// Run a non-async function's body to completion immediately, in a
/// fresh frame parented to the function's *defining* environment (spec
/// §3.3): the call site's environment never becomes the new frame's
/// parent.
pub fn call_sync(f: &FunctionValue, args: Vec<Value>, call_span: Span, loader: &Loader) -> Result<Value, VlError> {
    let frame = Env::child(&f.closure);
    for (param, arg) in f.params.iter().zip(args) {
        frame.define(param.name.clone(), arg);
    }
    match eval_block(&f.body, &frame, loader) {
        Signal::Return(v) => Ok(v),
        Signal::Raised(e) => Err(e.push_trace(call_span)),
        Signal::Normal => Ok(Value::Null),
    }
}

/// `await task` (spec §4.7/§5): a task is a factory, not a future —
/// calling an `async def` only produces it, and it does not run until
/// something awaits it (or the program drains it unawaited at exit).
/// Re-awaiting an already-finished task is idempotent and returns the
/// cached result without running the body again.
pub fn await_value(task: &TaskRef, loader: &Loader) -> Result<Value, VlError> {
    if task.is_done() {
        return task.result();
    }
    let body = task.take_body().expect("a not-done task still holds its body");
    let result = run_task_body(body, loader);
    task.finish(result.clone());
    result
}

/// Drive one task body to completion. `sleep`'s body blocks the single
/// interpreter thread for its duration rather than polling a deadline,
/// since nothing else can make progress concurrently on a single-
/// threaded scheduler anyway.
pub fn run_task_body(body: TaskBody, loader: &Loader) -> Result<Value, VlError> {
    match body {
        TaskBody::Call { func, args } => call_sync(&func, args, Span::synthetic(), loader),
        TaskBody::Sleep { duration } => {
            std::thread::sleep(duration);
            Ok(Value::Null)
        }
        TaskBody::Module { stmts, env, base_dir } => {
            loader.push_dir(base_dir);
            let signal = eval_block(&stmts, &env, loader);
            loader.pop_dir();
            match signal {
                Signal::Raised(e) => Err(e),
                _ => Ok(Value::Null),
            }
        }
    }
}
