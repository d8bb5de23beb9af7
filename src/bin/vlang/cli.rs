//! CLI argument surface for `vlang` (spec §6). Mirrors the source
//! project's `Cli`/`LogLevel` split: a derived `Parser` struct plus a
//! `ValueEnum` for `--verbosity`, converted into a `log::Level` the same
//! way.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Exactly one of `file` / `--code` must be supplied; `clap`'s own
/// `ArgGroup` enforcement means a CLI misuse here is reported — and
/// exits with clap's usage-error code — before `main` ever runs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["file", "code"])))]
pub struct Cli {
    /// Path to a `.vlang` source file to run.
    #[arg(index = 1)]
    pub file: Option<PathBuf>,

    /// Run a snippet passed directly on the command line.
    #[arg(short = 'C', long)]
    pub code: Option<String>,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
