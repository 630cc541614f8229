/// End-to-end language tests
/// Source text goes through Scanner → Parser → Evaluator
use qor::{Error, ErrorCategory, Evaluator, EvaluatorConfig, Parser, Scanner, TokenKind, Value};

fn quiet_evaluator() -> Evaluator {
    Evaluator::with_config(EvaluatorConfig {
        echo_output: false,
        ..EvaluatorConfig::default()
    })
}

fn output_of(source: &str) -> Vec<String> {
    qor::run(source).unwrap().output().to_vec()
}

fn error_of(source: &str) -> Error {
    match qor::run(source) {
        Ok(_) => panic!("expected an error from {:?}", source),
        Err(err) => err,
    }
}

fn variable(source: &str, name: &str) -> Value {
    qor::run(source).unwrap().env().get(name).unwrap()
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_e2e_token_stream() {
    let tokens = Scanner::new("x = 10 + 5").scan_tokens().unwrap();

    let pairs: Vec<(&str, &str)> = tokens
        .iter()
        .map(|t| (t.kind.name(), t.lexeme.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("ID", "x"),
            ("ASSIGN", "="),
            ("NUMBER", "10"),
            ("PLUS", "+"),
            ("NUMBER", "5"),
        ]
    );
    assert_eq!(tokens[3].kind, TokenKind::Plus);
}

#[test]
fn test_e2e_precedence() {
    let source = "result = 10 + 5 * 2";

    // Lex
    let tokens = Scanner::new(source).scan_tokens().unwrap();

    // Parse
    let program = Parser::new(tokens).parse().unwrap();

    // Evaluate
    let mut evaluator = quiet_evaluator();
    evaluator.execute(&program).unwrap();

    assert_eq!(evaluator.env().get("result").unwrap(), Value::Int(20));
}

#[test]
fn test_e2e_power_binds_multiplicative_right_operand() {
    assert_eq!(output_of("print(2 ** 3 * 2)"), vec!["64"]);
    assert_eq!(output_of("print(2 * 3 ** 2)"), vec!["18"]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_division_by_zero_is_runtime_error() {
    let err = error_of("x = 10 / 0");
    assert_eq!(err, Error::DivisionByZero);
    assert_eq!(err.category(), ErrorCategory::Runtime);
}

#[test]
fn test_undefined_variable() {
    assert_eq!(
        error_of("print(y)"),
        Error::UndefinedVariable {
            name: "y".to_string()
        }
    );
}

#[test]
fn test_error_categories() {
    assert_eq!(error_of("x = 1 @ 2").category(), ErrorCategory::Lex);
    assert_eq!(error_of("x = (1 + 2").category(), ErrorCategory::Parse);
    assert_eq!(error_of("x = 1 < 2 < 3").category(), ErrorCategory::Parse);
    assert_eq!(error_of("x = [1][0]").category(), ErrorCategory::Parse);
    assert_eq!(error_of("x = \"a\" - 1").category(), ErrorCategory::Runtime);
}

#[test]
fn test_runtime_error_stops_execution() {
    let mut evaluator = quiet_evaluator();
    let result = qor::run_with(&mut evaluator, "print(1)\nx = 1 / 0\nprint(2)");

    assert_eq!(result, Err(Error::DivisionByZero));
    assert_eq!(evaluator.output(), &["1".to_string()]);
    assert!(!evaluator.env().exists("x"));
}

#[test]
fn test_integer_overflow() {
    assert_eq!(
        error_of("x = 9223372036854775807 + 1"),
        Error::Overflow {
            op: "+".to_string()
        }
    );
    assert!(matches!(
        error_of("x = 99999999999999999999"),
        Error::InvalidLiteral { .. }
    ));
}

#[test]
fn test_index_errors() {
    assert_eq!(output_of("xs = [1, 2, 3]\nprint(xs[-1])"), vec!["3"]);
    assert_eq!(
        error_of("xs = [1, 2, 3]\nprint(xs[5])"),
        Error::IndexOutOfBounds {
            index: 5,
            length: 3
        }
    );
    assert!(matches!(
        error_of("d = {\"a\": 1}\nprint(d[\"b\"])"),
        Error::KeyNotFound { .. }
    ));
}

#[test]
fn test_huge_sizes_are_errors() {
    let too_big = Error::Overflow {
        op: "*".to_string(),
    };
    assert_eq!(error_of("s = \"ab\" * 9223372036854775807"), too_big);
    assert_eq!(error_of("xs = [1, 2] * 9223372036854775807"), too_big);

    let wide = "r = range(-9223372036854775807, 9223372036854775807)\n";
    assert_eq!(
        error_of(&format!("{}print(len(r))", wide)),
        Error::Overflow {
            op: "len".to_string()
        }
    );
    assert_eq!(
        output_of(&format!("{}print(r[-1])\nprint(r[-9223372036854775807])", wide)),
        vec!["9223372036854775806", "0"]
    );
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn test_for_range_prints_and_keeps_variable() {
    let evaluator = qor::run("for i in range(5): print(i)").unwrap();

    assert_eq!(evaluator.output(), &["0", "1", "2", "3", "4"]);
    assert_eq!(evaluator.env().get("i").unwrap(), Value::Int(4));
}

#[test]
fn test_range_forms() {
    assert_eq!(
        output_of("for i in range(2, 5): print(i)"),
        vec!["2", "3", "4"]
    );
    assert_eq!(
        output_of("for i in range(10, 0, -4): print(i)"),
        vec!["10", "6", "2"]
    );
    assert_eq!(output_of("r = range(3)\nprint(r)\nprint(len(r))"), vec!["range(0, 3)", "3"]);
}

#[test]
fn test_if_elif_else_chain() {
    let source = "\
for i in range(1, 16):
    if i % 15 == 0:
        print(\"FizzBuzz\")
    elif i % 3 == 0:
        print(\"Fizz\")
    elif i % 5 == 0:
        print(\"Buzz\")
    else:
        print(i)
";
    let output = output_of(source);
    assert_eq!(output.len(), 15);
    assert_eq!(output[0], "1");
    assert_eq!(output[2], "Fizz");
    assert_eq!(output[4], "Buzz");
    assert_eq!(output[14], "FizzBuzz");
}

#[test]
fn test_while_loop() {
    let source = "\
n = 10
steps = 0
while n != 1:
    if n % 2 == 0:
        n = int(n / 2)
    else:
        n = 3 * n + 1
    steps = steps + 1
";
    assert_eq!(variable(source, "steps"), Value::Int(6));
}

#[test]
fn test_later_conditions_skipped_once_branch_taken() {
    let source = "\
function check(label, result):
    print(label)
    return result
if check(\"if\", false):
    print(\"a\")
elif check(\"first elif\", true):
    print(\"b\")
elif check(\"second elif\", true):
    print(\"c\")
elif missing > 0:
    print(\"d\")
else:
    print(\"e\")
";
    assert_eq!(output_of(source), vec!["if", "first elif", "b"]);
}

#[test]
fn test_while_checks_condition_before_first_iteration() {
    let source = "\
runs = 0
while false:
    runs = runs + 1
    print(\"body\")
function never():
    print(\"condition\")
    return false
while never():
    print(\"body\")
print(runs)
";
    assert_eq!(output_of(source), vec!["condition", "0"]);
}

#[test]
fn test_for_over_string_and_dict() {
    assert_eq!(output_of("for c in \"ab\": print(c)"), vec!["a", "b"]);
    assert_eq!(
        output_of("for k in {\"x\": 1, \"y\": 2}: print(k)"),
        vec!["x", "y"]
    );
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn test_function_call_and_arity() {
    let source = "function add(a, b): return a + b\nprint(add(2, 3))";
    assert_eq!(output_of(source), vec!["5"]);

    let err = error_of("function add(a, b): return a + b\nadd(1)");
    assert_eq!(
        err,
        Error::ArgumentCountMismatch {
            name: "add".to_string(),
            expected: "2".to_string(),
            got: 1,
        }
    );
    assert_eq!(err.category(), ErrorCategory::Runtime);
}

#[test]
fn test_recursion() {
    let source = "\
function fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
print(fib(15))
";
    assert_eq!(output_of(source), vec!["610"]);
}

#[test]
fn test_function_without_return_gives_nil() {
    let source = "\
function greet(name):
    print(\"hi \" + name)
result = greet(\"bob\")
print(result)
";
    assert_eq!(output_of(source), vec!["hi bob", "nil"]);
}

#[test]
fn test_globals_captured_at_definition() {
    let source = "\
x = 1
function get_x(): return x
x = 2
print(get_x())
print(x)
";
    assert_eq!(output_of(source), vec!["1", "2"]);

    assert!(matches!(
        error_of("function f(): return later\nlater = 5\nf()"),
        Error::UndefinedVariable { .. }
    ));
}

#[test]
fn test_locals_do_not_leak() {
    let source = "\
function double(a):
    b = a * 2
    return b
y = double(4)
";
    let evaluator = qor::run(source).unwrap();
    assert_eq!(evaluator.env().get("y").unwrap(), Value::Int(8));
    assert!(!evaluator.env().exists("b"));
    assert!(!evaluator.env().exists("a"));
}

#[test]
fn test_arguments_are_copied() {
    let source = "\
xs = [1]
function add_item(ys):
    ys.append(2)
    return ys
zs = add_item(xs)
print(xs)
print(zs)
";
    assert_eq!(output_of(source), vec!["[1]", "[1, 2]"]);
}

#[test]
fn test_return_outside_function_and_builtin_redefinition() {
    assert_eq!(error_of("return 5"), Error::ReturnOutsideFunction);
    assert_eq!(
        error_of("function print_me(x): return x\nfunction max(a, b): return a"),
        Error::BuiltinRedefinition {
            name: "max".to_string()
        }
    );
}

#[test]
fn test_deep_recursion_below_default_limit() {
    let depth = EvaluatorConfig::default().max_call_depth - 1;
    let source = format!(
        "function down(n):\n    if n == 0:\n        return 0\n    return down(n - 1) + 1\nprint(down({}))",
        depth - 1
    );
    assert_eq!(output_of(&source), vec![(depth - 1).to_string()]);
}

#[test]
fn test_recursion_limit() {
    let mut evaluator = Evaluator::with_config(EvaluatorConfig {
        echo_output: false,
        max_call_depth: 32,
    });
    let err = qor::run_with(&mut evaluator, "function down(n): return down(n - 1)\ndown(0)");
    assert_eq!(err, Err(Error::RecursionLimit { limit: 32 }));
}

// =============================================================================
// Values, collections, methods
// =============================================================================

#[test]
fn test_print_formats() {
    let source = "\
print(7 / 2)
print(10 / 2)
print(2 ** 10)
print(2 ** -1)
print(-7 % 3)
print(true)
print([1, \"a\", 2.0])
print({\"k\": [1]})
print(1 == 1.0)
print(\"text\")
";
    assert_eq!(
        output_of(source),
        vec![
            "3.5",
            "5.0",
            "1024",
            "0.5",
            "2",
            "true",
            "[1, \"a\", 2.0]",
            "{\"k\": [1]}",
            "true",
            "text",
        ]
    );
}

#[test]
fn test_collections_and_methods() {
    let source = "\
scores = {\"alice\": 90, \"bob\": 72}
scores[\"carol\"] = 85
names = scores.keys()
names.sort()
print(names)
print(scores.get(\"dave\", 0))
print(len(scores))
xs = [3, 1, 2]
xs[0] = 10
xs.reverse()
print(xs)
print(xs.pop())
print(xs)
";
    assert_eq!(
        output_of(source),
        vec![
            "[\"alice\", \"bob\", \"carol\"]",
            "0",
            "3",
            "[2, 1, 10]",
            "10",
            "[2, 1]",
        ]
    );
}

#[test]
fn test_string_methods() {
    let source = "\
s = \"Hello, World\"
print(s.upper())
print(s.split(\", \"))
sep = \"-\"
print(sep.join([\"a\", \"b\"]))
print(s.find(\"World\"))
print(s.startswith(\"Hell\"))
";
    assert_eq!(
        output_of(source),
        vec!["HELLO, WORLD", "[\"Hello\", \"World\"]", "a-b", "7", "true"]
    );
}

#[test]
fn test_unknown_method() {
    assert_eq!(
        error_of("x = 5\nx.append(1)"),
        Error::UnknownMethod {
            type_name: "int".to_string(),
            method: "append".to_string(),
        }
    );
}

#[test]
fn test_logical_operators() {
    let source = "\
print(1 < 2 and 3 < 4)
print(not 1 == 2)
print(0 or \"fallback\")
print(false and undefined_name)
";
    assert_eq!(output_of(source), vec!["true", "true", "fallback", "false"]);
}

#[test]
fn test_keywords_inside_identifiers() {
    let source = "index = 3\nformat = 4\norder = index + format\nprint(order)";
    assert_eq!(output_of(source), vec!["7"]);
}

#[test]
fn test_builtins_and_constants() {
    let source = "\
print(round(pi, 2))
print(type(1.5))
print(abs(-3))
print(max([4, 9, 2]))
print(sum(range(1, 5)))
print(str(12) + \"!\")
print(int(\"42\") + 1)
";
    assert_eq!(
        output_of(source),
        vec!["3.14", "float", "3", "9", "10", "12!", "43"]
    );
}

#[test]
fn test_literal_round_trip() {
    let literals = [
        "42",
        "-7",
        "3.5",
        "\"line\\nbreak \\\"quoted\\\"\"",
        "true",
        "false",
        "[1, 2.5, \"a\", [true]]",
        "{\"a\": 1, 2: [3], \"nested\": {\"b\": false}}",
    ];

    for literal in literals {
        let original = variable(&format!("v = {}", literal), "v");
        let reprinted = original.repr();
        let reparsed = variable(&format!("v = {}", reprinted), "v");
        assert_eq!(original, reparsed, "round trip of {}", literal);
    }
}

#[test]
fn test_rerun_on_fresh_environment_is_idempotent() {
    let source = "\
total = 0
xs = []
for i in range(10):
    total = total + i * i
    xs.append(i)
print(total)
print(xs)
";
    let first = qor::run(source).unwrap();
    let second = qor::run(source).unwrap();

    assert_eq!(first.output(), second.output());
    assert_eq!(first.env().variables(), second.env().variables());
}

#[test]
fn test_environment_persists_across_runs() {
    let mut evaluator = quiet_evaluator();
    qor::run_with(&mut evaluator, "function sq(n): return n * n\nx = 3").unwrap();
    qor::run_with(&mut evaluator, "print(sq(x))").unwrap();

    assert_eq!(evaluator.output(), &["9".to_string()]);
}
