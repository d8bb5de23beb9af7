mod support;
use support::run;

#[test]
fn lists_are_reference_shared() {
    let source = r#"
        a = list()
        push(a, 1)
        b = a
        push(b, 2)
        print(len(a))
    "#;
    assert_eq!(run(source), "2\n");
}

#[test]
fn list_indexing_supports_negative_indices() {
    let source = r#"
        xs = [10, 20, 30]
        print(xs[-1])
        print(xs[0])
    "#;
    assert_eq!(run(source), "30\n10\n");
}

#[test]
fn out_of_range_index_is_a_runtime_error() {
    let err = virtolang::run_capture("xs = [1]\nprint(xs[5])").unwrap_err();
    assert_eq!(err.kind, virtolang::diagnostics::ErrorKind::Runtime);
}

#[test]
fn string_methods_and_indexing() {
    let source = r#"
        s = "Hello"
        print(s.upper())
        print(s.len())
        print(s[0])
    "#;
    assert_eq!(run(source), "HELLO\n5\nH\n");
}

#[test]
fn dict_and_set_membership() {
    let source = r#"
        d = dict("a", 1, "b", 2)
        print(d.get("a"))
        print("a" in d)
        s = set(list(1, 2, 3))
        print(2 in s)
    "#;
    assert_eq!(run(source), "1\ntrue\ntrue\n");
}

#[test]
fn tuples_are_immutable_and_equal_structurally() {
    let source = r#"
        t = tuple(list(1, 2))
        print(t == tuple(list(1, 2)))
        print(t.len())
    "#;
    assert_eq!(run(source), "true\n2\n");
}

#[test]
fn equality_is_structural_but_identity_is_not() {
    let source = r#"
        a = [1, 2]
        b = [1, 2]
        print(a == b)
        print(a is b)
        print(a is a)
    "#;
    assert_eq!(run(source), "true\nfalse\ntrue\n");
}

#[test]
fn for_loop_iterates_dict_keys() {
    let source = r#"
        d = dict("a", 1, "b", 2)
        for (k in d) {
            print(k)
        }
    "#;
    assert_eq!(run(source), "a\nb\n");
}
