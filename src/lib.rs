pub mod ast;
pub mod builtins;
pub mod diagnostics;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod runtime;
pub mod span;
pub mod value;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use diagnostics::VlError;
use loader::Loader;
use span::SourceMap;

/// Parse and run a complete program, returning everything it wrote to
/// stdout. Used by the CLI and by the integration tests alike so test
/// behavior always matches what a user sees on the terminal.
pub fn run_capture(source: &str) -> Result<String, VlError> {
    let out = Rc::new(RefCell::new(String::new()));
    let sink = out.clone();
    let loader = Loader::new(SourceMap::new(), Rc::new(move |line: &str| {
        sink.borrow_mut().push_str(line);
        sink.borrow_mut().push('\n');
    }));
    let result = loader.run_source("<script>", source);
    drop(loader);
    result?;
    // A top-level closure keeps a strong `Rc` back to the global frame
    // (and so to `sink`), so `out` isn't necessarily uniquely owned here;
    // read through the `RefCell` rather than `Rc::try_unwrap`.
    Ok(out.borrow().clone())
}

/// Parse and run a file from disk, resolving `import`/`run` relative to
/// its directory.
pub fn run_file(path: &Path) -> Result<String, VlError> {
    let out = Rc::new(RefCell::new(String::new()));
    let sink = out.clone();
    let loader = Loader::new(SourceMap::new(), Rc::new(move |line: &str| {
        sink.borrow_mut().push_str(line);
        sink.borrow_mut().push('\n');
    }));
    let result = loader.run_path(path);
    drop(loader);
    result?;
    Ok(out.borrow().clone())
}
