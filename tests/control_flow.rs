mod support;
use support::run;

#[test]
fn try_except_finally_runs_handler_and_finally() {
    let source = r#"try { raise Error("fail!") } except Error as e { print(e) } finally { print("done") }"#;
    assert_eq!(run(source), "fail!\ndone\n");
}

#[test]
fn finally_runs_on_the_normal_path_too() {
    let source = r#"try { print("body") } except Error as e { print(e) } finally { print("done") }"#;
    assert_eq!(run(source), "body\ndone\n");
}

#[test]
fn an_unmatched_except_clause_lets_the_error_propagate() {
    let source = r#"try { raise Error("boom") } except ValueTooSmall as e { print(e) }"#;
    let err = virtolang::run_capture(source).unwrap_err();
    assert_eq!(err.display_message(), "boom");
}

#[test]
fn custom_exception_class_tag_by_function_name() {
    let source = r#"
        def ValueTooSmall(msg){ return Error(msg) }
        try {
            raise ValueTooSmall("too small")
        } except ValueTooSmall as e {
            print(e)
        }
    "#;
    assert_eq!(run(source), "too small\n");
}

#[test]
fn except_error_catches_any_kind_as_the_universal_super_tag() {
    let source = r#"
        def Oops(msg){ return Error(msg) }
        try {
            raise Oops("specific")
        } except Error as e {
            print(e)
        }
    "#;
    assert_eq!(run(source), "specific\n");
}

#[test]
fn is_not_distinguishes_identity_from_equality() {
    assert_eq!(run("if (5 is not 3) { print(\"yes\") }"), "yes\n");
}

#[test]
fn dangling_is_not_operand_is_a_syntax_error_with_exit_relevant_kind() {
    let err = virtolang::run_capture("if (5 is not) { print(\"no\") }").unwrap_err();
    assert_eq!(err.kind, virtolang::diagnostics::ErrorKind::Syntax);
    assert_eq!(err.hint.as_deref(), Some("did you mean 'not in' or 'is not'?"));
}

#[test]
fn and_or_short_circuit() {
    let source = r#"
        def boom(){ raise Error("should not run") }
        print(false and boom())
        print(true or boom())
    "#;
    assert_eq!(run(source), "false\ntrue\n");
}

#[test]
fn truthiness_of_falsy_values() {
    let source = r#"
        if (0) { print("bad") } else { print("zero falsy") }
        if ("") { print("bad") } else { print("empty str falsy") }
        if (list()) { print("bad") } else { print("empty list falsy") }
        if (null) { print("bad") } else { print("null falsy") }
    "#;
    assert_eq!(run(source), "zero falsy\nempty str falsy\nempty list falsy\nnull falsy\n");
}

#[test]
fn while_loop_reevaluates_its_condition_each_time() {
    let source = r#"
        i = 0
        while (i < 3) {
            print(i)
            i = i + 1
        }
    "#;
    assert_eq!(run(source), "0\n1\n2\n");
}
