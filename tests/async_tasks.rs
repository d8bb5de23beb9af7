mod support;
use support::run;

#[test]
fn async_function_and_await() {
    let source = "async def f(){ await sleep(0); return 42 }\nt = f()\nprint(await t)";
    assert_eq!(run(source), "42\n");
}

#[test]
fn awaiting_a_finished_task_twice_returns_the_cached_value() {
    let source = "async def f(){ return 1 }\nt = f()\nprint(await t)\nprint(await t)";
    assert_eq!(run(source), "1\n1\n");
}

#[test]
fn awaiting_a_non_task_value_returns_it_unchanged() {
    assert_eq!(run("print(await 5)"), "5\n");
}

#[test]
fn a_failed_task_raises_when_awaited() {
    let source = "async def f(){ raise Error(\"task failed\") }\nt = f()\nawait t";
    let err = virtolang::run_capture(source).unwrap_err();
    assert_eq!(err.display_message(), "task failed");
}

#[test]
fn an_unawaited_failing_task_still_fails_the_program() {
    let source = "async def f(){ raise Error(\"orphaned\") }\nf()\nprint(\"after\")";
    let err = virtolang::run_capture(source).unwrap_err();
    assert_eq!(err.display_message(), "orphaned");
}

#[test]
fn sequential_awaits_happen_in_program_order() {
    let source = r#"
        async def step(n){ return n }
        a = await step(1)
        b = await step(2)
        print(a, b)
    "#;
    assert_eq!(run(source), "1 2\n");
}
