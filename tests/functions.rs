mod support;
use support::run;

#[test]
fn function_call_and_return() {
    assert_eq!(run("def add(a,b){ return a+b }\nprint(add(2,3))"), "5\n");
}

#[test]
fn falling_off_the_end_returns_null() {
    assert_eq!(run("def noop(){ 1 + 1 }\nprint(noop())"), "null\n");
}

#[test]
fn wrong_arity_is_an_argument_error() {
    let err = virtolang::run_capture("def add(a,b){ return a+b }\nadd(1)").unwrap_err();
    assert_eq!(err.kind, virtolang::diagnostics::ErrorKind::Argument);
}

#[test]
fn closures_capture_the_defining_frame_not_the_caller() {
    let source = r#"
        def make_counter(){
            count = 0
            def inc(){
                count = count + 1
                return count
            }
            return inc
        }
        c = make_counter()
        print(c())
        print(c())
        print(c())
    "#;
    assert_eq!(run(source), "1\n2\n3\n");
}

#[test]
fn lambdas_are_callable_values() {
    assert_eq!(run("sq = lambda(x){ return x * x }\nprint(sq(4))"), "16\n");
}
