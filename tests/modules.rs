//! Import/module-loading behavior, exercised against real files on disk
//! since `import`/`run` resolve paths relative to the importing file.

use std::fs;
use std::path::PathBuf;

fn scratch_dir(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("virtolang-test-{tag}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn import_binds_the_modules_top_level_names() {
    let dir = scratch_dir("import-basic");
    fs::write(dir.join("util.vlang"), "def double(x){ return x * 2 }\nanswer = 42").unwrap();
    fs::write(dir.join("main.vlang"), "import util\nprint(double(10))\nprint(answer)").unwrap();

    let out = virtolang::run_file(&dir.join("main.vlang")).expect("runs");
    assert_eq!(out, "20\n42\n");
}

#[test]
fn importing_the_same_module_twice_reuses_the_cached_copy() {
    let dir = scratch_dir("import-cache");
    fs::write(dir.join("counted.vlang"), "loads = 1").unwrap();
    fs::write(
        dir.join("main.vlang"),
        "import counted\nimport counted\nprint(loads)",
    )
    .unwrap();

    let out = virtolang::run_file(&dir.join("main.vlang")).expect("runs");
    assert_eq!(out, "1\n");
}

#[test]
fn circular_imports_see_whatever_the_partner_has_bound_so_far() {
    let dir = scratch_dir("import-circular");
    fs::write(dir.join("a.vlang"), "import b\nvalue_a = 1").unwrap();
    fs::write(dir.join("b.vlang"), "import a\nvalue_b = 2").unwrap();
    fs::write(
        dir.join("main.vlang"),
        "import a\nimport b\nprint(value_a)\nprint(value_b)",
    )
    .unwrap();

    let out = virtolang::run_file(&dir.join("main.vlang")).expect("runs");
    assert_eq!(out, "1\n2\n");
}

#[test]
fn run_executes_another_files_top_level_statements_without_binding_them() {
    let dir = scratch_dir("run-no-bind");
    fs::write(dir.join("greet.vlang"), "print(\"hi from greet\")").unwrap();
    fs::write(dir.join("main.vlang"), "run(\"greet.vlang\")").unwrap();

    let out = virtolang::run_file(&dir.join("main.vlang")).expect("runs");
    assert_eq!(out, "hi from greet\n");
}

#[test]
fn importing_a_nonexistent_module_is_an_import_error() {
    let dir = scratch_dir("import-missing");
    fs::write(dir.join("main.vlang"), "import nope_at_all").unwrap();

    let err = virtolang::run_file(&dir.join("main.vlang")).unwrap_err();
    assert_eq!(err.kind, virtolang::diagnostics::ErrorKind::Import);
}
