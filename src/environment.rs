//! Lexical scoping (spec §3.3). Blocks — `if`, `while`, `for` bodies —
//! do **not** introduce a new frame; only a function call does, and the
//! new frame's parent is the function's *defining* (closure) environment,
//! never the caller's frame. Plain assignment walks outward from the
//! current frame looking for the nearest frame that already defines the
//! name; if none does, the binding is created in the global frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub struct Env {
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<EnvRef>,
}

pub type EnvRef = Rc<Env>;

impl Env {
    pub fn global() -> EnvRef {
        Rc::new(Env { vars: RefCell::new(HashMap::new()), parent: None })
    }

    /// A new call frame parented to `closure` — the environment the
    /// function was *defined* in, not the one it is being *called* from.
    pub fn child(closure: &EnvRef) -> EnvRef {
        Rc::new(Env { vars: RefCell::new(HashMap::new()), parent: Some(closure.clone()) })
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.vars.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.borrow().contains_key(name) || self.parent.as_ref().is_some_and(|p| p.contains(name))
    }

    /// Bind `name` in *this* frame directly — used for function parameters
    /// and for the loop variable at each `for` iteration.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    /// `name = value`: update the nearest enclosing frame that already
    /// defines `name`, or create it in the outermost (global) frame if no
    /// frame does (spec §3.3, "nearest-defining-frame-or-global").
    pub fn assign(&self, name: &str, value: Value) {
        let mut cur: &Env = self;
        loop {
            if cur.vars.borrow().contains_key(name) {
                cur.vars.borrow_mut().insert(name.to_string(), value);
                return;
            }
            match &cur.parent {
                Some(parent) => cur = &*parent,
                None => {
                    cur.vars.borrow_mut().insert(name.to_string(), value);
                    return;
                }
            }
        }
    }

    /// Snapshot of every name visible in this frame or an ancestor,
    /// innermost first — used to build a module's exported namespace.
    pub fn own_names(&self) -> Vec<String> {
        self.vars.borrow().keys().cloned().collect()
    }
}
