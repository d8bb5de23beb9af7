//! Dot-method dispatch for container/string "methods" (spec §3.2 attribute
//! access, §6). `Value` has no vtable, so `target.method(args)` and the
//! standalone attribute form both funnel through [`call`], dispatching on
//! the receiver's runtime type tag the same way `builtins::core` dispatches
//! on argument types.

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagnostics::VlError;
use crate::span::Span;
use crate::value::{DictKey, Value, VlDict, VlSet};

/// Whether `receiver.name` names a known method, used by the standalone
/// (non-call) attribute form to raise `TypeError` eagerly rather than
/// waiting for a call that never comes.
pub fn exists(receiver: &Value, name: &str) -> bool {
    let names: &[&str] = match receiver {
        Value::List(_) => &["push", "pop", "len", "contains", "index", "reverse", "sort"],
        Value::Str(_) => &["upper", "lower", "trim", "split", "replace", "starts_with", "ends_with", "len"],
        Value::Dict(_) => &["keys", "values", "get", "contains", "remove", "len"],
        Value::Set(_) => &["add", "remove", "contains", "len"],
        Value::Tuple(_) => &["len"],
        _ => &[],
    };
    names.contains(&name)
}

pub fn call(receiver: &Value, name: &str, args: &[Value], span: Span) -> Result<Value, VlError> {
    match receiver {
        Value::List(list) => list_method(list, name, args, span),
        Value::Str(s) => str_method(s, name, args, span),
        Value::Dict(dict) => dict_method(dict, name, args, span),
        Value::Set(set) => set_method(set, name, args, span),
        Value::Tuple(t) => match name {
            "len" => Ok(Value::Int(t.len() as i64)),
            other => unknown(receiver, other, span),
        },
        other => unknown(other, name, span),
    }
}

fn unknown(receiver: &Value, name: &str, span: Span) -> Result<Value, VlError> {
    Err(VlError::type_(format!("'{}' object has no attribute '{name}'", receiver.type_name()), span))
}

fn expect_arity(name: &str, args: &[Value], n: usize, span: Span) -> Result<(), VlError> {
    if args.len() != n {
        return Err(VlError::argument(format!("{name}() expects {n} argument(s), got {}", args.len()), span));
    }
    Ok(())
}

fn list_method(list: &Rc<RefCell<Vec<Value>>>, name: &str, args: &[Value], span: Span) -> Result<Value, VlError> {
    match name {
        "push" => {
            expect_arity(name, args, 1, span)?;
            list.borrow_mut().push(args[0].clone());
            Ok(Value::Null)
        }
        "pop" => {
            expect_arity(name, args, 0, span)?;
            list.borrow_mut().pop().ok_or_else(|| VlError::runtime("pop from empty list", span))
        }
        "len" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Int(list.borrow().len() as i64))
        }
        "contains" => {
            expect_arity(name, args, 1, span)?;
            Ok(Value::Bool(list.borrow().iter().any(|v| crate::evaluator::ops::values_equal(v, &args[0]))))
        }
        "index" => {
            expect_arity(name, args, 1, span)?;
            list.borrow()
                .iter()
                .position(|v| crate::evaluator::ops::values_equal(v, &args[0]))
                .map(|i| Value::Int(i as i64))
                .ok_or_else(|| VlError::runtime("value not found in list", span))
        }
        "reverse" => {
            expect_arity(name, args, 0, span)?;
            list.borrow_mut().reverse();
            Ok(Value::Null)
        }
        "sort" => {
            expect_arity(name, args, 0, span)?;
            sort_values(&mut list.borrow_mut(), span)?;
            Ok(Value::Null)
        }
        other => unknown(&Value::List(list.clone()), other, span),
    }
}

fn sort_values(items: &mut [Value], span: Span) -> Result<(), VlError> {
    let mut err = None;
    items.sort_by(|a, b| match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Float(_) | Value::Int(_), Value::Float(_) | Value::Int(_)) => {
            let fx = as_f64(a);
            let fy = as_f64(b);
            fx.partial_cmp(&fy).unwrap_or(std::cmp::Ordering::Equal)
        }
        _ => {
            if err.is_none() {
                err = Some(VlError::type_("sort() requires comparable elements of a single type", span));
            }
            std::cmp::Ordering::Equal
        }
    });
    match err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => 0.0,
    }
}

fn str_method(s: &Rc<str>, name: &str, args: &[Value], span: Span) -> Result<Value, VlError> {
    match name {
        "upper" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Str(s.to_uppercase().into()))
        }
        "lower" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Str(s.to_lowercase().into()))
        }
        "trim" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Str(s.trim().into()))
        }
        "len" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Int(s.chars().count() as i64))
        }
        "split" => {
            expect_arity(name, args, 1, span)?;
            let Value::Str(sep) = &args[0] else {
                return Err(VlError::type_("split() expects a str separator", span));
            };
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::Str(c.to_string().into())).collect()
            } else {
                s.split(sep.as_ref()).map(|part| Value::Str(part.into())).collect()
            };
            Ok(Value::List(Rc::new(RefCell::new(parts))))
        }
        "replace" => {
            expect_arity(name, args, 2, span)?;
            let (Value::Str(from), Value::Str(to)) = (&args[0], &args[1]) else {
                return Err(VlError::type_("replace() expects two str arguments", span));
            };
            Ok(Value::Str(s.replace(from.as_ref(), to).into()))
        }
        "starts_with" => {
            expect_arity(name, args, 1, span)?;
            let Value::Str(prefix) = &args[0] else {
                return Err(VlError::type_("starts_with() expects a str", span));
            };
            Ok(Value::Bool(s.starts_with(prefix.as_ref())))
        }
        "ends_with" => {
            expect_arity(name, args, 1, span)?;
            let Value::Str(suffix) = &args[0] else {
                return Err(VlError::type_("ends_with() expects a str", span));
            };
            Ok(Value::Bool(s.ends_with(suffix.as_ref())))
        }
        other => unknown(&Value::Str(s.clone()), other, span),
    }
}

fn dict_method(dict: &Rc<RefCell<VlDict>>, name: &str, args: &[Value], span: Span) -> Result<Value, VlError> {
    match name {
        "keys" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::List(Rc::new(RefCell::new(dict.borrow().iter().map(|(k, _)| k.clone().into_value()).collect()))))
        }
        "values" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::List(Rc::new(RefCell::new(dict.borrow().iter().map(|(_, v)| v.clone()).collect()))))
        }
        "get" => {
            if args.is_empty() || args.len() > 2 {
                return Err(VlError::argument("get() expects 1 or 2 arguments", span));
            }
            let key = DictKey::from_value(&args[0]).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", args[0].type_name()), span))?;
            match dict.borrow().get(&key) {
                Some(v) => Ok(v.clone()),
                None => Ok(args.get(1).cloned().unwrap_or(Value::Null)),
            }
        }
        "contains" => {
            expect_arity(name, args, 1, span)?;
            let key = DictKey::from_value(&args[0]).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", args[0].type_name()), span))?;
            Ok(Value::Bool(dict.borrow().contains_key(&key)))
        }
        "remove" => {
            expect_arity(name, args, 1, span)?;
            let key = DictKey::from_value(&args[0]).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", args[0].type_name()), span))?;
            Ok(dict.borrow_mut().remove(&key).unwrap_or(Value::Null))
        }
        "len" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Int(dict.borrow().len() as i64))
        }
        other => unknown(&Value::Dict(dict.clone()), other, span),
    }
}

fn set_method(set: &Rc<RefCell<VlSet>>, name: &str, args: &[Value], span: Span) -> Result<Value, VlError> {
    match name {
        "add" => {
            expect_arity(name, args, 1, span)?;
            let key = DictKey::from_value(&args[0]).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", args[0].type_name()), span))?;
            set.borrow_mut().insert(key);
            Ok(Value::Null)
        }
        "remove" => {
            expect_arity(name, args, 1, span)?;
            let key = DictKey::from_value(&args[0]).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", args[0].type_name()), span))?;
            Ok(Value::Bool(set.borrow_mut().remove(&key)))
        }
        "contains" => {
            expect_arity(name, args, 1, span)?;
            let key = DictKey::from_value(&args[0]).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", args[0].type_name()), span))?;
            Ok(Value::Bool(set.borrow().contains(&key)))
        }
        "len" => {
            expect_arity(name, args, 0, span)?;
            Ok(Value::Int(set.borrow().len() as i64))
        }
        other => unknown(&Value::Set(set.clone()), other, span),
    }
}
