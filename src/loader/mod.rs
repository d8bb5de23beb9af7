//! The interpreter context (spec §4.8/§9's "one top-level frame, one
//! module cache, one built-in registry, one scheduler per instance").
//!
//! Grounded on the source project's `loader/mod.rs`: a module cache keyed
//! by canonicalized absolute path, and `FileLoadError`/`ImportError`-style
//! diagnostics with a `(file, line, col)` position. Unlike the source
//! project — a statically typed ahead-of-time compiler with a separate
//! "extract exports" pass — a VirtoLang module's exports are simply every
//! binding left in its top-level frame once it finishes running (spec
//! §4.8), so there is no analogue of `typechecker::extract_exports` here.

mod resolve;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, error, trace};

use crate::builtins::{self, PrintSink};
use crate::diagnostics::VlError;
use crate::environment::{Env, EnvRef};
use crate::evaluator::{self, Signal};
use crate::runtime::{Scheduler, Task, TaskBody, TaskRef};
use crate::span::{SourceMap, Span};
use crate::value::Value;

pub use resolve::resolve_import_path;

/// A loaded module's parsed body, cached by canonical path so a second
/// `import` of the same file reuses both the AST and the already-run
/// environment instead of re-parsing and re-executing it.
struct ModuleRecord {
    env: EnvRef,
}

pub struct Loader {
    pub sources: SourceMap,
    global: EnvRef,
    modules: RefCell<HashMap<PathBuf, ModuleRecord>>,
    /// Stack of "current directory" entries, one pushed per nested
    /// `import`/`run`/`run_async`, so relative paths resolve against the
    /// file that's actually doing the importing, not the process cwd.
    dirs: RefCell<Vec<PathBuf>>,
    scheduler: RefCell<Scheduler>,
}

impl Loader {
    pub fn new(sources: SourceMap, sink: PrintSink) -> Self {
        let global = Env::global();
        builtins::register_all(&global, sink);
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Loader {
            sources,
            global,
            modules: RefCell::new(HashMap::new()),
            dirs: RefCell::new(vec![cwd]),
            scheduler: RefCell::new(Scheduler::new()),
        }
    }

    pub fn global(&self) -> &EnvRef {
        &self.global
    }

    pub(crate) fn scheduler_spawn(&self, task: TaskRef) {
        self.scheduler.borrow_mut().spawn(task);
    }

    pub(crate) fn push_dir(&self, dir: PathBuf) {
        self.dirs.borrow_mut().push(dir);
    }

    pub(crate) fn pop_dir(&self) {
        self.dirs.borrow_mut().pop();
    }

    fn current_dir(&self) -> PathBuf {
        self.dirs.borrow().last().cloned().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Parse and run a script's top-level statements against the global
    /// frame directly — used for the toplevel program, not for a module
    /// loaded via `import`, which gets its own child frame.
    fn run_top_level(&self, name: &str, source: &str) -> Result<(), VlError> {
        let file = self.sources.add(name.to_string(), source.to_string());
        let stmts = crate::parser::parse_source(source, file)?;
        debug!("running {} top-level statements from {name}", stmts.len());
        match evaluator::eval_program(&stmts, &self.global, self) {
            Signal::Raised(e) => Err(e),
            _ => self.drain_pending(),
        }
    }

    pub fn run_source(&self, name: &str, source: &str) -> Result<(), VlError> {
        self.run_top_level(name, source)
    }

    pub fn run_path(&self, path: &Path) -> Result<(), VlError> {
        let source = fs::read_to_string(path)
            .map_err(|e| VlError::import(format!("could not read '{}': {e}", path.display()), Span::synthetic()))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        self.push_dir(dir);
        let result = self.run_top_level(&path.display().to_string(), &source);
        self.pop_dir();
        result
    }

    /// `import name` (spec §4.8): load (or reuse the cached copy of) the
    /// named module and bind every one of its top-level names into
    /// `into`. The module cache is seeded with the module's frame
    /// *before* the module's body runs, so two modules that import each
    /// other (spec §9, open question resolved: allow circular imports,
    /// with whatever names are bound-so-far visible to the partner) don't
    /// recurse forever.
    pub fn import(&self, path: &str, site: Span, into: &EnvRef) -> Result<(), VlError> {
        let resolved = resolve_import_path(&self.current_dir(), path)
            .ok_or_else(|| VlError::import(format!("module '{path}' not found"), site))?;

        if let Some(record) = self.modules.borrow().get(&resolved) {
            bind_exports(&record.env, into);
            return Ok(());
        }

        trace!("loading module '{path}' from {}", resolved.display());
        let source = fs::read_to_string(&resolved)
            .map_err(|e| VlError::import(format!("could not read '{}': {e}", resolved.display()), site))?;
        let file = self.sources.add(resolved.display().to_string(), source.clone());
        let stmts = crate::parser::parse_source(&source, file).map_err(|e| e.push_trace(site))?;

        let module_env = Env::child(&self.global);
        self.modules.borrow_mut().insert(resolved.clone(), ModuleRecord { env: module_env.clone() });

        let dir = resolved.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        self.push_dir(dir);
        let signal = evaluator::eval_program(&stmts, &module_env, self);
        self.pop_dir();

        if let Signal::Raised(e) = signal {
            self.modules.borrow_mut().remove(&resolved);
            error!("import of '{path}' failed: {}", e.display_message());
            return Err(VlError::import(format!("error while importing '{path}': {}", e.display_message()), site));
        }

        bind_exports(&module_env, into);
        Ok(())
    }

    /// `run(path)` (spec §3.2/§6): execute another file's top-level
    /// statements synchronously, in a fresh frame parented to the same
    /// global frame as any other module, for its side effects. Unlike
    /// `import`, its bindings are never copied anywhere.
    pub fn run_file_value(&self, path: &str, site: Span) -> Result<Value, VlError> {
        let resolved = resolve_import_path(&self.current_dir(), path)
            .ok_or_else(|| VlError::import(format!("module '{path}' not found"), site))?;
        let source = fs::read_to_string(&resolved)
            .map_err(|e| VlError::import(format!("could not read '{}': {e}", resolved.display()), site))?;
        let file = self.sources.add(resolved.display().to_string(), source.clone());
        let stmts = crate::parser::parse_source(&source, file).map_err(|e| e.push_trace(site))?;

        let env = Env::child(&self.global);
        let dir = resolved.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        self.push_dir(dir);
        let signal = evaluator::eval_program(&stmts, &env, self);
        self.pop_dir();

        match signal {
            Signal::Raised(e) => Err(e.push_trace(site)),
            _ => Ok(Value::Null),
        }
    }

    /// `run_async(path)` (spec §5/§6): produce a task whose continuation
    /// is the parsed file's top-level statements, run only once something
    /// awaits it (or the program drains it unawaited at exit).
    pub fn spawn_run_async(&self, path: &str, site: Span) -> Result<Value, VlError> {
        let resolved = resolve_import_path(&self.current_dir(), path)
            .ok_or_else(|| VlError::import(format!("module '{path}' not found"), site))?;
        let source = fs::read_to_string(&resolved)
            .map_err(|e| VlError::import(format!("could not read '{}': {e}", resolved.display()), site))?;
        let file = self.sources.add(resolved.display().to_string(), source.clone());
        let stmts = crate::parser::parse_source(&source, file).map_err(|e| e.push_trace(site))?;

        let env = Env::child(&self.global);
        let dir = resolved.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        let task = Task::new(TaskBody::Module { stmts: Rc::new(stmts), env, base_dir: dir });
        self.scheduler_spawn(task.clone());
        Ok(Value::Task(task))
    }

    /// Drain every task spawned via `run_async` that nothing ever
    /// awaited. A task that fails here still gets logged before the
    /// interpreter exits non-zero (spec §5), even though nothing in the
    /// script itself observed the failure via `await`.
    fn drain_pending(&self) -> Result<(), VlError> {
        let mut first_error = None;
        loop {
            let task = self.scheduler.borrow_mut().pop_ready();
            let Some(task) = task else { break };
            if task.is_done() {
                continue;
            }
            if let Err(e) = evaluator::await_value(&task, self) {
                error!("unawaited task failed: {}", e.display_message());
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Copy every name bound in a finished module's top-level frame into the
/// importing scope (spec §4.8: "bind every top-level name from that
/// frame into the importing scope").
fn bind_exports(module_env: &EnvRef, into: &EnvRef) {
    for name in module_env.own_names() {
        if let Some(value) = module_env.get(&name) {
            into.define(name, value);
        }
    }
}
