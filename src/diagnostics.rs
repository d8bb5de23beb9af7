//! Error kinds and the caret-style formatter used by the CLI and by
//! `print(e)` on a caught exception.
//!
//! Grounded on the source project's `ParseError`/`TypeError`/`FileLoadError`
//! shape (one flat struct, a `message`, a position, a hand-written
//! `Display`), generalized into a single [`VlError`] so every component (L,
//! P, E, I) can raise through the same type and user code can catch it
//! uniformly via `except`.

use std::error::Error;
use std::fmt;

use crate::span::{SourceMap, Span};

/// The short symbolic category of an error, used for `except` matching
/// (spec §4.5/§7). `User(tag)` is produced when a user-defined "exception
/// class" function (e.g. `def ValueTooSmall(msg) { return Error(msg) }`)
/// is called at a `raise` site; see [`crate::evaluator::tag_user_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Name,
    Type,
    Argument,
    Runtime,
    Import,
    Error,
    User(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => f.write_str("SyntaxError"),
            ErrorKind::Name => f.write_str("NameError"),
            ErrorKind::Type => f.write_str("TypeError"),
            ErrorKind::Argument => f.write_str("ArgumentError"),
            ErrorKind::Runtime => f.write_str("RuntimeError"),
            ErrorKind::Import => f.write_str("ImportError"),
            ErrorKind::Error => f.write_str("Error"),
            ErrorKind::User(tag) => f.write_str(tag),
        }
    }
}

/// A raised VirtoLang error: a kind tag, a message, the span where it was
/// raised, and the call-trace accumulated while unwinding (spec §4.5).
#[derive(Debug, Clone)]
pub struct VlError {
    pub kind: ErrorKind,
    pub message: String,
    pub origin: Span,
    pub trace: Vec<Span>,
    pub hint: Option<String>,
}

impl VlError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, origin: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            origin,
            trace: Vec::new(),
            hint: None,
        }
    }

    pub fn syntax(message: impl Into<String>, origin: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, origin)
    }

    pub fn name(message: impl Into<String>, origin: Span) -> Self {
        Self::new(ErrorKind::Name, message, origin)
    }

    pub fn type_(message: impl Into<String>, origin: Span) -> Self {
        Self::new(ErrorKind::Type, message, origin)
    }

    pub fn argument(message: impl Into<String>, origin: Span) -> Self {
        Self::new(ErrorKind::Argument, message, origin)
    }

    pub fn runtime(message: impl Into<String>, origin: Span) -> Self {
        Self::new(ErrorKind::Runtime, message, origin)
    }

    pub fn import(message: impl Into<String>, origin: Span) -> Self {
        Self::new(ErrorKind::Import, message, origin)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Push a call-site span onto the trace as the error unwinds a frame.
    pub fn push_trace(mut self, site: Span) -> Self {
        self.trace.push(site);
        self
    }

    /// Does the name in an `except NAME` clause match this error's kind?
    /// `Error` is the universal super-tag (spec §4.3/§9).
    pub fn matches_except(&self, declared: &str) -> bool {
        declared == "Error" || self.kind.to_string() == declared
    }

    /// Render the message the way `print(e)` does for a bound `as e`.
    pub fn display_message(&self) -> &str {
        &self.message
    }

    /// Format this error the way the CLI prints an uncaught exception
    /// (spec §4.6): kind, message, a `File "...", line L, col C` stanza,
    /// the source line, and a caret under the offending span, followed by
    /// one stanza per trace frame and a trailing hint line if present.
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}: {}", self.kind, self.message));
        if let Some(hint) = &self.hint {
            out.push_str(&format!(" ({hint})"));
        }
        out.push('\n');
        out.push_str(&render_frame(sources, self.origin));
        for site in self.trace.iter().rev() {
            out.push_str(&render_frame(sources, *site));
        }
        out
    }
}

fn render_frame(sources: &SourceMap, span: Span) -> String {
    let path = sources.path(span.file);
    let mut frame = format!("  File \"{path}\", line {}, col {}\n", span.line, span.col);
    if let Some(line) = sources.line_text(span.file, span.line) {
        frame.push_str(&format!("    {line}\n"));
        let col = span.col.saturating_sub(1) as usize;
        let caret_line: String = std::iter::repeat(' ').take(col).chain(std::iter::once('^')).collect();
        frame.push_str(&format!("    {caret_line}\n"));
    }
    frame
}

impl fmt::Display for VlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for VlError {}
