mod support;
use support::run;

#[test]
fn integer_division_promotes_to_float() {
    assert_eq!(run("print(6 / 2)"), "3.0\n");
}

#[test]
fn float_division_stays_float() {
    assert_eq!(run("print(7.0 / 2)"), "3.5\n");
}

#[test]
fn modulo_follows_the_dividend_sign() {
    assert_eq!(run("print(-7 % 3)"), "-1\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run_capture_err("print(1 / 0)");
    assert_eq!(err.kind, virtolang::diagnostics::ErrorKind::Runtime);
}

#[test]
fn string_concatenation_and_list_concatenation() {
    let out = run(r#"
        print("foo" + "bar")
        print([1, 2] + [3])
    "#);
    assert_eq!(out, "foobar\n[1, 2, 3]\n");
}

fn run_capture_err(source: &str) -> virtolang::diagnostics::VlError {
    virtolang::run_capture(source).unwrap_err()
}
