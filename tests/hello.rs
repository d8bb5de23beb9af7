mod support;
use support::run;

#[test]
fn prints_a_greeting() {
    assert_eq!(run(r#"print("Hello, World!")"#), "Hello, World!\n");
}

#[test]
fn print_joins_multiple_arguments_with_a_space() {
    assert_eq!(run(r#"print("a", 1, true)"#), "a 1 true\n");
}
