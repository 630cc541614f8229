use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qor::{Evaluator, EvaluatorConfig, Parser, Scanner};

const FIB: &str = "\
function fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
result = fib(15)
";

const LOOPS: &str = "\
total = 0
xs = []
for i in range(500):
    if i % 3 == 0:
        xs.append(i)
    elif i % 5 == 0:
        total = total + i
    else:
        total = total - 1
";

fn lexer_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize loop program", |b| {
        b.iter(|| Scanner::new(black_box(LOOPS)).scan_tokens().unwrap())
    });
}

fn parser_benchmark(c: &mut Criterion) {
    let tokens = Scanner::new(LOOPS).scan_tokens().unwrap();

    c.bench_function("parse loop program", |b| {
        b.iter(|| Parser::new(black_box(tokens.clone())).parse().unwrap())
    });
}

fn evaluator_benchmark(c: &mut Criterion) {
    let config = EvaluatorConfig {
        echo_output: false,
        ..EvaluatorConfig::default()
    };

    for (name, source) in [("execute fib(15)", FIB), ("execute loop program", LOOPS)] {
        let program = Parser::new(Scanner::new(source).scan_tokens().unwrap())
            .parse()
            .unwrap();

        c.bench_function(name, |b| {
            b.iter(|| {
                let mut evaluator = Evaluator::with_config(config.clone());
                evaluator.execute(black_box(&program)).unwrap()
            })
        });
    }
}

criterion_group!(benches, lexer_benchmark, parser_benchmark, evaluator_benchmark);
criterion_main!(benches);
