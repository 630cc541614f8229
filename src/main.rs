use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use qor::{Evaluator, EvaluatorConfig, VERSION};

/// QOR is a small dynamically-typed scripting language. Run a `.qor` file or
/// start the interactive shell.
#[derive(Parser, Debug)]
#[command(name = "qor", version, about, long_about = None)]
struct Args {
    /// Source file to execute.
    file: Option<PathBuf>,

    /// Start the interactive shell.
    #[arg(short, long)]
    repl: bool,

    /// Print the token stream of FILE as JSON instead of running it.
    #[arg(long, requires = "file")]
    dump_tokens: bool,

    /// Print the syntax tree of FILE as JSON instead of running it.
    #[arg(long, requires = "file")]
    dump_ast: bool,

    /// Maximum depth of nested function calls.
    #[arg(long, default_value_t = 256)]
    max_call_depth: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match dispatch(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: Args) -> anyhow::Result<()> {
    let config = EvaluatorConfig {
        echo_output: true,
        max_call_depth: args.max_call_depth,
    };

    if args.repl {
        return repl(config);
    }

    let Some(path) = args.file else {
        Args::command().print_help()?;
        return Ok(());
    };

    let source = read_source(&path)?;
    let name = path.display();

    if args.dump_tokens {
        let tokens = qor::tokenize(&source).map_err(|e| report(&name, e))?;
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    if args.dump_ast {
        let program = qor::tokenize(&source)
            .and_then(qor::parse)
            .map_err(|e| report(&name, e))?;
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    let mut evaluator = Evaluator::with_config(config);
    qor::run_with(&mut evaluator, &source).map_err(|e| report(&name, e))
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        bail!("Error: File '{}' not found", path.display());
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("qor") {
        eprintln!(
            "Warning: File '{}' doesn't have .qor extension",
            path.display()
        );
    }

    fs::read_to_string(path).with_context(|| format!("Error reading file '{}'", path.display()))
}

fn report(source_name: &dyn std::fmt::Display, err: qor::Error) -> anyhow::Error {
    anyhow::anyhow!("{} in {}: {}", err.label(), source_name, err)
}

fn repl(config: EvaluatorConfig) -> anyhow::Result<()> {
    println!("QOR v{} Interactive Shell", VERSION);
    println!("Type 'exit' or 'quit' to exit, 'help' for help");
    println!("{}", "-".repeat(50));

    let mut evaluator = Evaluator::with_config(config);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        let Some(line) = prompt(&mut input, "qor> ")? else {
            println!("\nGoodbye!");
            return Ok(());
        };

        match line.trim() {
            "exit" | "quit" => {
                println!("Goodbye!");
                return Ok(());
            }
            "help" => {
                show_help(&evaluator);
                continue;
            }
            "vars" => {
                show_vars(&evaluator);
                continue;
            }
            "clear" => {
                evaluator.reset();
                println!("Variables cleared");
                continue;
            }
            "" => continue,
            _ => {}
        }

        // A header line opens a block that runs until an empty line
        let mut source = line;
        if source.trim_end().ends_with(':') {
            while let Some(more) = prompt(&mut input, "...  ")? {
                if more.trim().is_empty() {
                    break;
                }
                source.push_str(&more);
            }
        }

        if let Err(err) = qor::run_with(&mut evaluator, &source) {
            println!("{} in <repl>: {}", err.label(), err);
        }
        evaluator.take_output();
    }
}

/// Prints a prompt and reads one line; `None` at end of input
fn prompt(input: &mut impl BufRead, text: &str) -> io::Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if !line.ends_with('\n') {
        line.push('\n');
    }
    Ok(Some(line))
}

fn show_help(evaluator: &Evaluator) {
    println!(
        "
QOR Interactive Shell Commands:
  exit, quit    - Exit the shell
  help          - Show this help message
  vars          - Show all variables
  clear         - Clear all variables and functions

Example QOR code:
  x = 10
  y = 20
  result = x + y
  print(result)
  print(\"Hello, QOR!\")
"
    );

    println!("Builtin functions:");
    let registry = evaluator.builtins();
    for name in registry.names() {
        if let Some(builtin) = registry.get(&name) {
            println!("  {:<13} - {}", name, builtin.description());
        }
    }
}

fn show_vars(evaluator: &Evaluator) {
    println!("Variables:");
    for (name, value) in evaluator.env().variables() {
        println!("  {} = {}", name, value.repr());
    }

    let functions = evaluator.function_names();
    if !functions.is_empty() {
        println!("Functions: {}", functions.join(", "));
    }
}
