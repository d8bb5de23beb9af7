//! Source locations threaded from the lexer through to runtime diagnostics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identifies a loaded source file within a [`SourceMap`].
pub type FileId = u32;

/// A byte range within a single source file, plus the line/column of its start.
///
/// Cheap to copy; every token and AST node carries one so that lexer, parser
/// and evaluator errors can all point back at the same source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: FileId, line: u32, col: u32, start: u32, end: u32) -> Self {
        Self {
            file,
            line,
            col,
            start,
            end,
        }
    }

    /// A span with no useful location, used for synthetic/host-constructed values.
    pub fn synthetic() -> Self {
        Self {
            file: 0,
            line: 0,
            col: 0,
            start: 0,
            end: 0,
        }
    }

    pub fn to(self, other: Span) -> Span {
        Span {
            file: self.file,
            line: self.line,
            col: self.col,
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Default)]
struct SourceMapInner {
    files: Vec<(String, String)>,
    ids_by_path: HashMap<String, FileId>,
}

/// Registry of loaded source files, keyed by [`FileId`], so diagnostics can
/// recover the file path and the exact source line for a span without
/// threading the text itself through every token and AST node.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    inner: Rc<RefCell<SourceMapInner>>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file's contents, returning its id. Re-registering the same
    /// path replaces its contents and reuses the same id.
    pub fn add(&self, path: impl Into<String>, contents: impl Into<String>) -> FileId {
        let path = path.into();
        let mut inner = self.inner.borrow_mut();
        if let Some(&id) = inner.ids_by_path.get(&path) {
            inner.files[id as usize] = (path, contents.into());
            return id;
        }
        let id = inner.files.len() as FileId;
        inner.files.push((path.clone(), contents.into()));
        inner.ids_by_path.insert(path, id);
        id
    }

    pub fn path(&self, file: FileId) -> String {
        self.inner
            .borrow()
            .files
            .get(file as usize)
            .map(|(p, _)| p.clone())
            .unwrap_or_else(|| "<unknown>".to_owned())
    }

    /// The text of the given 1-indexed line, if present.
    pub fn line_text(&self, file: FileId, line: u32) -> Option<String> {
        let inner = self.inner.borrow();
        let (_, contents) = inner.files.get(file as usize)?;
        contents.lines().nth(line.saturating_sub(1) as usize).map(str::to_owned)
    }
}
