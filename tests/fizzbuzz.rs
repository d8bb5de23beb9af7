mod support;
use support::run;

#[test]
fn fizzbuzz_one_to_fifteen() {
    let source = r#"
        for (n in range(1, 16)) {
            if (n % 15 == 0) {
                print("FizzBuzz")
            } elif (n % 3 == 0) {
                print("Fizz")
            } elif (n % 5 == 0) {
                print("Buzz")
            } else {
                print(n)
            }
        }
    "#;
    let expected = "1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz\n";
    assert_eq!(run(source), expected);
}
