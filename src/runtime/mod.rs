//! Cooperative, single-threaded task runtime (spec §5).
//!
//! Calling an `async def` function does not run its body; it produces a
//! [`Task`] — a factory for the call, not its result. A task only runs
//! when something `await`s it, which happens in `evaluator::await_value`:
//! that is where the actual driving loop lives, since it needs both the
//! scheduler's ready queue and the evaluator's ability to call a
//! function. This module only holds the queue and task bookkeeping.
//! Re-awaiting a finished task is idempotent: it returns the cached
//! result without running the body again. `sleep(seconds)` produces a
//! task whose body blocks the thread for the given duration when it
//! finally runs, rather than polling a deadline — nothing else can make
//! progress concurrently on a single-threaded scheduler either way.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::ast::Stmt;
use crate::diagnostics::VlError;
use crate::environment::EnvRef;
use crate::value::{FunctionValue, Value};

pub enum TaskBody {
    Call { func: Rc<FunctionValue>, args: Vec<Value> },
    Sleep { duration: Duration },
    /// Continuation for `run_async(path)`: the parsed file's top-level
    /// statements, executed against the interpreter's global frame (same
    /// as `run`) once something awaits this task.
    Module { stmts: Rc<Vec<Stmt>>, env: EnvRef, base_dir: PathBuf },
}

enum TaskStatus {
    NotStarted,
    Done(Result<Value, VlError>),
}

pub struct Task {
    body: RefCell<Option<TaskBody>>,
    status: RefCell<TaskStatus>,
}

pub type TaskRef = Rc<Task>;

impl Task {
    pub fn new(body: TaskBody) -> TaskRef {
        Rc::new(Task { body: RefCell::new(Some(body)), status: RefCell::new(TaskStatus::NotStarted) })
    }

    pub fn is_done(&self) -> bool {
        matches!(&*self.status.borrow(), TaskStatus::Done(_))
    }

    pub fn result(&self) -> Result<Value, VlError> {
        match &*self.status.borrow() {
            TaskStatus::Done(result) => result.clone(),
            TaskStatus::NotStarted => unreachable!("result() called on a task that never ran"),
        }
    }

    /// Take this task's body to run it, leaving `None` behind so a second
    /// call (idempotent re-await, or a task drained twice off the ready
    /// queue) is a no-op rather than running the body again.
    pub fn take_body(&self) -> Option<TaskBody> {
        self.body.borrow_mut().take()
    }

    pub fn finish(&self, result: Result<Value, VlError>) {
        *self.status.borrow_mut() = TaskStatus::Done(result);
    }
}

/// Tasks spawned via `run_async` that have not yet been awaited. Drained
/// in FIFO order whenever something awaits a *different* task, so a
/// spawned task still gets to make progress even if the script never
/// awaits it by name.
#[derive(Default)]
pub struct Scheduler {
    ready: VecDeque<TaskRef>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, task: TaskRef) {
        self.ready.push_back(task);
    }

    pub fn pop_ready(&mut self) -> Option<TaskRef> {
        self.ready.pop_front()
    }

    pub fn push_ready(&mut self, task: TaskRef) {
        self.ready.push_back(task);
    }
}
