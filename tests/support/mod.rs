//! Shared helper for the per-feature integration tests: run a program
//! in-process and return everything it wrote to stdout, the way
//! `run_capture` is meant to be used by both unit and integration tests.

#[allow(dead_code)]
pub fn run(source: &str) -> String {
    virtolang::run_capture(source).unwrap_or_else(|e| panic!("unexpected error: {}", e.display_message()))
}
