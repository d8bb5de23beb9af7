mod support;

use virtolang::diagnostics::ErrorKind;

#[test]
fn undefined_identifier_is_a_name_error() {
    let err = virtolang::run_capture("print(nope)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Name);
}

#[test]
fn adding_a_number_to_a_list_is_a_type_error() {
    let err = virtolang::run_capture("print(1 + list())").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn wrong_builtin_arity_is_an_argument_error() {
    let err = virtolang::run_capture("print(len())").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Argument);
}

#[test]
fn importing_a_missing_module_is_an_import_error() {
    let err = virtolang::run_capture("import does_not_exist").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Import);
}

#[test]
fn uncaught_error_renders_with_a_caret_under_the_offending_span() {
    let source = "x = 1 + nope";
    let sources = virtolang::span::SourceMap::new();
    let loader = virtolang::loader::Loader::new(sources, std::rc::Rc::new(|_: &str| {}));
    let err = loader.run_source("<script>", source).unwrap_err();
    let rendered = err.render(&loader.sources);

    assert!(rendered.contains("NameError"), "expected a NameError stanza, got:\n{rendered}");
    assert!(rendered.contains('^'), "expected a caret line, got:\n{rendered}");
    assert!(rendered.contains("line 1"), "expected a line-1 location, got:\n{rendered}");
}
