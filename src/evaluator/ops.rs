//! Operator and indexing semantics (spec §4.3 "Operator semantics").
//!
//! `and`/`or` are short-circuiting and therefore handled in `mod.rs`
//! where both sides aren't unconditionally evaluated; everything else
//! lands here as a plain function of two already-evaluated [`Value`]s.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{BinaryOp, UnaryOp};
use crate::diagnostics::VlError;
use crate::span::Span;
use crate::value::{DictKey, Value};

pub fn unary(op: UnaryOp, v: Value, span: Span) -> Result<Value, VlError> {
    match (op, v) {
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(-n)),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, other) => {
            Err(VlError::type_(format!("bad operand type for unary -: '{}'", other.type_name()), span))
        }
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
    }
}

/// `and`/`or` are excluded: the evaluator short-circuits them before
/// either side reaches here.
pub fn binary(op: BinaryOp, l: Value, r: Value, span: Span) -> Result<Value, VlError> {
    use BinaryOp::*;
    match op {
        Add => add(l, r, span),
        Sub => arith(l, r, span, "-", |a, b| a - b, |a, b| a - b),
        Mul => arith(l, r, span, "*", |a, b| a * b, |a, b| a * b),
        Div => div(l, r, span),
        Mod => modulo(l, r, span),
        Eq => Ok(Value::Bool(values_equal(&l, &r))),
        NotEq => Ok(Value::Bool(!values_equal(&l, &r))),
        Lt => compare(l, r, span, |o| o == std::cmp::Ordering::Less),
        Gt => compare(l, r, span, |o| o == std::cmp::Ordering::Greater),
        Le => compare(l, r, span, |o| o != std::cmp::Ordering::Greater),
        Ge => compare(l, r, span, |o| o != std::cmp::Ordering::Less),
        In => Ok(Value::Bool(contains(&l, &r, span)?)),
        NotIn => Ok(Value::Bool(!contains(&l, &r, span)?)),
        Is => Ok(Value::Bool(identical(&l, &r))),
        IsNot => Ok(Value::Bool(!identical(&l, &r))),
        And | Or => unreachable!("and/or short-circuit before reaching ops::binary"),
    }
}

fn add(l: Value, r: Value, span: Span) -> Result<Value, VlError> {
    match (&l, &r) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}").into())),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::List(Rc::new(RefCell::new(items))))
        }
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
        _ => {
            let (a, b) = as_f64_pair(&l, &r, span, "+")?;
            Ok(Value::Float(a + b))
        }
    }
}

fn arith(l: Value, r: Value, span: Span, op: &str, fi: fn(i64, i64) -> i64, ff: fn(f64, f64) -> f64) -> Result<Value, VlError> {
    match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(fi(*a, *b))),
        _ => {
            let (a, b) = as_f64_pair(&l, &r, span, op)?;
            Ok(Value::Float(ff(a, b)))
        }
    }
}

/// Division always promotes to float, even for two ints (spec §3.1/§8:
/// `6/2 == 3.0`), so there is no integer-preserving branch here.
fn div(l: Value, r: Value, span: Span) -> Result<Value, VlError> {
    let (a, b) = as_f64_pair(&l, &r, span, "/")?;
    if b == 0.0 {
        return Err(VlError::runtime("division by zero", span));
    }
    Ok(Value::Float(a / b))
}

/// Remainder follows the dividend's sign (spec §4.3), matching Rust's `%`.
fn modulo(l: Value, r: Value, span: Span) -> Result<Value, VlError> {
    match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(VlError::runtime("modulo by zero", span));
            }
            Ok(Value::Int(a % b))
        }
        _ => {
            let (a, b) = as_f64_pair(&l, &r, span, "%")?;
            if b == 0.0 {
                return Err(VlError::runtime("modulo by zero", span));
            }
            Ok(Value::Float(a % b))
        }
    }
}

fn compare(l: Value, r: Value, span: Span, pred: impl Fn(std::cmp::Ordering) -> bool) -> Result<Value, VlError> {
    let ord = match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => a.as_ref().cmp(b.as_ref()),
        _ => {
            let (a, b) = as_f64_pair(&l, &r, span, "comparison")?;
            a.partial_cmp(&b).ok_or_else(|| VlError::runtime("cannot compare NaN", span))?
        }
    };
    Ok(Value::Bool(pred(ord)))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn as_f64_pair(l: &Value, r: &Value, span: Span, op: &str) -> Result<(f64, f64), VlError> {
    let a = as_f64(l).ok_or_else(|| type_err(l, op, span))?;
    let b = as_f64(r).ok_or_else(|| type_err(r, op, span))?;
    Ok((a, b))
}

fn type_err(v: &Value, op: &str, span: Span) -> VlError {
    VlError::type_(format!("unsupported operand type for {op}: '{}'", v.type_name()), span)
}

/// Structural equality for `==`/`!=` and for container membership (spec
/// §3.1/§4.3): containers compare element-by-element rather than by
/// reference, unlike `is`.
pub fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        (Value::List(a), Value::List(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Tuple(a), Value::Tuple(b)) => a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y)),
        (Value::Dict(a), Value::Dict(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        (Value::Set(a), Value::Set(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            a.len() == b.len() && a.iter().all(|k| b.contains(k))
        }
        _ => false,
    }
}

/// `is`/`is not` (spec §3.1): identity for shared heap values, value
/// equality for primitives (so `5 is 5` is true without a dedicated
/// small-int cache).
fn identical(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
        (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
        (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
        (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
        (Value::Task(a), Value::Task(b)) => Rc::ptr_eq(a, b),
        _ => values_equal(l, r),
    }
}

fn contains(needle: &Value, haystack: &Value, span: Span) -> Result<bool, VlError> {
    match haystack {
        Value::List(l) => Ok(l.borrow().iter().any(|v| values_equal(v, needle))),
        Value::Tuple(t) => Ok(t.iter().any(|v| values_equal(v, needle))),
        Value::Set(s) => Ok(DictKey::from_value(needle).is_some_and(|k| s.borrow().contains(&k))),
        Value::Dict(d) => Ok(DictKey::from_value(needle).is_some_and(|k| d.borrow().contains_key(&k))),
        Value::Str(s) => match needle {
            Value::Str(sub) => Ok(s.contains(sub.as_ref())),
            other => Err(VlError::type_(
                format!("'in <str>' requires string as left operand, not '{}'", other.type_name()),
                span,
            )),
        },
        other => Err(VlError::type_(format!("argument of type '{}' is not iterable", other.type_name()), span)),
    }
}

/// Indexing (spec §3.2 "index"; SPEC_FULL §3 negative-index supplement):
/// lists/tuples/strings accept Python-style negative indices counting
/// from the end; out-of-range access of either sign is a `RuntimeError`.
pub fn index(target: &Value, idx: &Value, span: Span) -> Result<Value, VlError> {
    match target {
        Value::List(l) => {
            let l = l.borrow();
            let i = normalize_index(idx, l.len(), span)?;
            l.get(i).cloned().ok_or_else(|| VlError::runtime("list index out of range", span))
        }
        Value::Tuple(t) => {
            let i = normalize_index(idx, t.len(), span)?;
            t.get(i).cloned().ok_or_else(|| VlError::runtime("tuple index out of range", span))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = normalize_index(idx, chars.len(), span)?;
            chars
                .get(i)
                .map(|c| Value::Str(c.to_string().into()))
                .ok_or_else(|| VlError::runtime("string index out of range", span))
        }
        Value::Dict(d) => {
            let key = DictKey::from_value(idx).ok_or_else(|| VlError::type_(format!("unhashable type: '{}'", idx.type_name()), span))?;
            d.borrow()
                .get(&key)
                .cloned()
                .ok_or_else(|| VlError::runtime(format!("key {} not found", crate::builtins::repr(idx)), span))
        }
        other => Err(VlError::type_(format!("'{}' object is not subscriptable", other.type_name()), span)),
    }
}

fn normalize_index(idx: &Value, len: usize, span: Span) -> Result<usize, VlError> {
    let Value::Int(n) = idx else {
        return Err(VlError::type_(format!("indices must be integers, found '{}'", idx.type_name()), span));
    };
    let n = if *n < 0 { *n + len as i64 } else { *n };
    if n < 0 || n as usize >= len {
        return Err(VlError::runtime("index out of range", span));
    }
    Ok(n as usize)
}

/// Values the `for (x in e)` loop and the `list()`/`tuple()`/`set()`
/// constructors accept as a source sequence (spec §4.3 "for (x in e)").
pub fn iterate(v: &Value, span: Span) -> Result<Vec<Value>, VlError> {
    match v {
        Value::List(l) => Ok(l.borrow().clone()),
        Value::Tuple(t) => Ok((**t).clone()),
        Value::Set(s) => Ok(s.borrow().iter().map(|k| k.clone().into_value()).collect()),
        Value::Dict(d) => Ok(d.borrow().iter().map(|(k, _)| k.clone().into_value()).collect()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string().into())).collect()),
        other => Err(VlError::type_(format!("'{}' object is not iterable", other.type_name()), span)),
    }
}
