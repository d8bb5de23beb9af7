//! `vlang` — the VirtoLang interpreter CLI (spec §6).
mod cli;

use std::rc::Rc;

use cli::Cli;
use log::error;
use virtolang::loader::Loader;
use virtolang::span::SourceMap;

fn main() {
    let args = Cli::init();
    simple_logger::init_with_level((&args.verbosity).into()).expect("logger already initialized");

    let sources = SourceMap::new();
    let sink = Rc::new(|line: &str| println!("{line}"));
    let loader = Loader::new(sources.clone(), sink);

    let result = match (&args.file, &args.code) {
        (Some(path), None) => loader.run_path(path),
        (None, Some(code)) => loader.run_source("<command-line>", code),
        _ => unreachable!("clap's ArgGroup guarantees exactly one of file/code"),
    };

    if let Err(err) = result {
        error!("{}", err.display_message());
        eprint!("{}", err.render(&sources));
        std::process::exit(1);
    }
}
