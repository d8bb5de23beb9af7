//! Runtime values (spec §3.1). Containers are reference types: lists,
//! dicts and sets share structure through `Rc<RefCell<_>>` so that two
//! bindings to "the same" list observe each other's mutations, matching
//! the data model's aliasing rules. Strings and tuples are immutable and
//! so need no interior mutability.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{Param, Stmt};
use crate::diagnostics::VlError;
use crate::environment::EnvRef;
use crate::runtime::TaskRef;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Bool(bool),
    Null,
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<Vec<Value>>),
    Dict(Rc<RefCell<VlDict>>),
    Set(Rc<RefCell<VlSet>>),
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinValue>),
    Task(TaskRef),
    /// A first-class exception value, as produced by `Error(msg)` or bound
    /// by `except ... as e` (spec §4.3/§9).
    Exception(Rc<VlError>),
}

pub struct FunctionValue {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: EnvRef,
    pub is_async: bool,
}

/// A builtin's arity contract: `max` of `None` means variadic above `min`.
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub fn exact(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    pub fn at_least(n: usize) -> Self {
        Arity { min: n, max: None }
    }

    pub fn range(min: usize, max: usize) -> Self {
        Arity { min, max: Some(max) }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

pub type BuiltinFn = dyn Fn(&crate::builtins::Call) -> Result<Value, VlError>;

pub struct BuiltinValue {
    pub name: String,
    pub arity: Arity,
    pub func: Box<BuiltinFn>,
}

/// The subset of values VirtoLang accepts as dict keys / set members:
/// primitives with well-defined equality (spec §3.1 glossary "hashable").
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Int(i64),
    Str(Rc<str>),
    Bool(bool),
    Null,
}

impl DictKey {
    pub fn from_value(v: &Value) -> Option<DictKey> {
        match v {
            Value::Int(n) => Some(DictKey::Int(*n)),
            Value::Str(s) => Some(DictKey::Str(s.clone())),
            Value::Bool(b) => Some(DictKey::Bool(*b)),
            Value::Null => Some(DictKey::Null),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            DictKey::Int(n) => Value::Int(n),
            DictKey::Str(s) => Value::Str(s),
            DictKey::Bool(b) => Value::Bool(b),
            DictKey::Null => Value::Null,
        }
    }
}

/// Insertion-ordered map, so iteration and `str(d)` are deterministic.
#[derive(Default)]
pub struct VlDict {
    order: Vec<DictKey>,
    values: HashMap<DictKey, Value>,
}

impl VlDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DictKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: DictKey, value: Value) {
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value);
    }

    pub fn remove(&mut self, key: &DictKey) -> Option<Value> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DictKey, &Value)> {
        self.order.iter().map(move |k| (k, self.values.get(k).expect("key in order is in map")))
    }

    pub fn contains_key(&self, key: &DictKey) -> bool {
        self.values.contains_key(key)
    }
}

/// Insertion-ordered unique collection backing `set(...)`.
#[derive(Default)]
pub struct VlSet {
    order: Vec<DictKey>,
    members: std::collections::HashSet<DictKey>,
}

impl VlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: DictKey) -> bool {
        if self.members.insert(key.clone()) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, key: &DictKey) -> bool {
        if self.members.remove(key) {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, key: &DictKey) -> bool {
        self.members.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DictKey> {
        self.order.iter()
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Function(_) => "function",
            Value::Builtin(_) => "function",
            Value::Task(_) => "task",
            Value::Exception(_) => "error",
        }
    }

    /// Truthiness for `if`/`while`/`and`/`or` (spec §3.1): `0`, `0.0`, `""`,
    /// `null`, `false` and empty containers are falsy; everything else is
    /// truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::List(l) => !l.borrow().is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::Dict(d) => d.borrow().len() != 0,
            Value::Set(s) => s.borrow().len() != 0,
            Value::Function(_) | Value::Builtin(_) | Value::Task(_) => true,
            Value::Exception(_) => true,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::builtins::display(self))
    }
}
