//! Free-standing builtins: I/O, construction, introspection, numeric
//! helpers (spec §6).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::{display, register, Call, PrintSink};
use crate::diagnostics::VlError;
use crate::environment::EnvRef;
use crate::runtime::{Task, TaskBody};
use crate::value::{Arity, DictKey, Value, VlDict, VlSet};

pub fn register(env: &EnvRef, sink: PrintSink) {
    register_io(env, sink);
    register_construction(env);
    register_introspection(env);
    register_numeric(env);
    register_containers(env);
}

fn register_io(env: &EnvRef, sink: PrintSink) {
    self::register(env, "print", Arity::at_least(0), move |call: &Call| {
        let line = call.args.iter().map(display).collect::<Vec<_>>().join(" ");
        sink(&line);
        Ok(Value::Null)
    });
}

fn register_construction(env: &EnvRef) {
    self::register(env, "Error", Arity::exact(1), |call: &Call| {
        let Value::Str(msg) = call.arg(0) else {
            return Err(call.type_error("Error(message) expects a str"));
        };
        Ok(Value::Exception(Rc::new(VlError::new(crate::diagnostics::ErrorKind::Error, msg.to_string(), call.span))))
    });

    self::register(env, "assert", Arity::range(1, 2), |call: &Call| {
        if call.arg(0).is_truthy() {
            Ok(Value::Null)
        } else {
            let message = match call.args.get(1) {
                Some(Value::Str(s)) => s.to_string(),
                Some(other) => display(other),
                None => "assertion failed".to_string(),
            };
            Err(VlError::runtime(message, call.span))
        }
    });

    self::register(env, "sleep", Arity::exact(1), |call: &Call| {
        let seconds = match call.arg(0) {
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            _ => return Err(call.type_error("sleep(seconds) expects a number")),
        };
        if seconds < 0.0 {
            return Err(call.argument_error("sleep(seconds) expects a non-negative number"));
        }
        let task = Task::new(TaskBody::Sleep { duration: Duration::from_secs_f64(seconds) });
        Ok(Value::Task(task))
    });
}

fn register_introspection(env: &EnvRef) {
    self::register(env, "str", Arity::exact(1), |call: &Call| Ok(Value::Str(display(call.arg(0)).into())));

    self::register(env, "type", Arity::exact(1), |call: &Call| Ok(Value::Str(call.arg(0).type_name().into())));

    self::register(env, "len", Arity::exact(1), |call: &Call| {
        let n = match call.arg(0) {
            Value::Str(s) => s.chars().count(),
            Value::List(l) => l.borrow().len(),
            Value::Tuple(t) => t.len(),
            Value::Dict(d) => d.borrow().len(),
            Value::Set(s) => s.borrow().len(),
            other => return Err(call.type_error(format!("object of type '{}' has no len()", other.type_name()))),
        };
        Ok(Value::Int(n as i64))
    });
}

fn register_numeric(env: &EnvRef) {
    self::register(env, "abs", Arity::exact(1), |call: &Call| match call.arg(0) {
        Value::Int(n) => Ok(Value::Int(n.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(call.type_error(format!("abs() expects a number, found {}", other.type_name()))),
    });

    self::register(env, "min", Arity::at_least(1), |call: &Call| reduce_numeric(call, |a, b| if a < b { a } else { b }));
    self::register(env, "max", Arity::at_least(1), |call: &Call| reduce_numeric(call, |a, b| if a > b { a } else { b }));

    self::register(env, "range", Arity::range(1, 3), |call: &Call| {
        let as_int = |v: &Value| match v {
            Value::Int(n) => Ok(*n),
            other => Err(VlError::type_(format!("range() expects int arguments, found {}", other.type_name()), call.span)),
        };
        let (start, stop, step) = match call.args {
            [stop] => (0, as_int(stop)?, 1),
            [start, stop] => (as_int(start)?, as_int(stop)?, 1),
            [start, stop, step] => (as_int(start)?, as_int(stop)?, as_int(step)?),
            _ => unreachable!("arity checked by caller"),
        };
        if step == 0 {
            return Err(call.argument_error("range() step must not be zero"));
        }
        let mut values = Vec::new();
        let mut i = start;
        if step > 0 {
            while i < stop {
                values.push(Value::Int(i));
                i += step;
            }
        } else {
            while i > stop {
                values.push(Value::Int(i));
                i += step;
            }
        }
        Ok(Value::List(Rc::new(RefCell::new(values))))
    });
}

fn reduce_numeric(call: &Call, pick: impl Fn(f64, f64) -> f64) -> Result<Value, VlError> {
    let values: Vec<&Value> = if call.args.len() == 1 {
        match &call.args[0] {
            Value::List(l) => return reduce_owned(l.borrow().clone(), call.span, pick),
            single => vec![single],
        }
    } else {
        call.args.iter().collect()
    };
    let mut all_int = true;
    let mut best: Option<f64> = None;
    for v in values {
        let n = match v {
            Value::Int(n) => *n as f64,
            Value::Float(f) => {
                all_int = false;
                *f
            }
            other => return Err(VlError::type_(format!("expected a number, found {}", other.type_name()), call.span)),
        };
        best = Some(match best {
            Some(b) => pick(b, n),
            None => n,
        });
    }
    let best = best.expect("arity >= 1 guarantees at least one value");
    Ok(if all_int { Value::Int(best as i64) } else { Value::Float(best) })
}

fn reduce_owned(items: Vec<Value>, span: crate::span::Span, pick: impl Fn(f64, f64) -> f64) -> Result<Value, VlError> {
    if items.is_empty() {
        return Err(VlError::argument("min()/max() arg is an empty sequence", span));
    }
    let call = Call { args: &items, span };
    reduce_numeric(&call, pick)
}

fn register_containers(env: &EnvRef) {
    self::register(env, "list", Arity::range(0, 1), |call: &Call| {
        Ok(Value::List(Rc::new(RefCell::new(iterable_to_vec(call)?))))
    });

    self::register(env, "tuple", Arity::range(0, 1), |call: &Call| {
        Ok(Value::Tuple(Rc::new(iterable_to_vec(call)?)))
    });

    self::register(env, "set", Arity::range(0, 1), |call: &Call| {
        let mut set = VlSet::new();
        for v in iterable_to_vec(call)? {
            let key = DictKey::from_value(&v).ok_or_else(|| call.type_error(format!("unhashable type: '{}'", v.type_name())))?;
            set.insert(key);
        }
        Ok(Value::Set(Rc::new(RefCell::new(set))))
    });

    self::register(env, "dict", Arity::at_least(0), |call: &Call| {
        if call.args.len() % 2 != 0 {
            return Err(call.argument_error("dict() expects alternating key, value arguments"));
        }
        let mut dict = VlDict::new();
        for pair in call.args.chunks(2) {
            let key = DictKey::from_value(&pair[0])
                .ok_or_else(|| call.type_error(format!("unhashable type: '{}'", pair[0].type_name())))?;
            dict.insert(key, pair[1].clone());
        }
        Ok(Value::Dict(Rc::new(RefCell::new(dict))))
    });

    self::register(env, "push", Arity::exact(2), |call: &Call| match call.arg(0) {
        Value::List(l) => {
            l.borrow_mut().push(call.arg(1).clone());
            Ok(Value::Null)
        }
        other => Err(call.type_error(format!("push() expects a list, found {}", other.type_name()))),
    });

    self::register(env, "keys", Arity::exact(1), |call: &Call| match call.arg(0) {
        Value::Dict(d) => Ok(Value::List(Rc::new(RefCell::new(
            d.borrow().iter().map(|(k, _)| k.clone().into_value()).collect(),
        )))),
        other => Err(call.type_error(format!("keys() expects a dict, found {}", other.type_name()))),
    });

    self::register(env, "values", Arity::exact(1), |call: &Call| match call.arg(0) {
        Value::Dict(d) => Ok(Value::List(Rc::new(RefCell::new(d.borrow().iter().map(|(_, v)| v.clone()).collect())))),
        other => Err(call.type_error(format!("values() expects a dict, found {}", other.type_name()))),
    });
}

fn iterable_to_vec(call: &Call) -> Result<Vec<Value>, VlError> {
    let Some(source) = call.args.first() else {
        return Ok(Vec::new());
    };
    match source {
        Value::List(l) => Ok(l.borrow().clone()),
        Value::Tuple(t) => Ok((**t).clone()),
        Value::Set(s) => Ok(s.borrow().iter().map(|k| k.clone().into_value()).collect()),
        Value::Dict(d) => Ok(d.borrow().iter().map(|(k, _)| k.clone().into_value()).collect()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string().into())).collect()),
        other => Err(call.type_error(format!("'{}' object is not iterable", other.type_name()))),
    }
}
