use std::{fs, process::ExitCode};

use clap::Parser;
use logica::{
    engine::{registry::FunctionRegistry, value::Value},
    evaluate_str,
};

/// logica evaluates rule predicates against files and repositories.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells logica to read the expression from a file instead of the
    /// command line.
    #[arg(short, long)]
    file: bool,

    /// Seeds a variable into the root scope, as NAME=VALUE. Values that
    /// read as integers, floats or booleans are bound with that kind;
    /// everything else is bound as a string. May be repeated.
    #[arg(short, long, value_name = "NAME=VALUE")]
    bind: Vec<String>,

    /// The expression to evaluate, or a path to it with --file.
    expression: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let source = if args.file {
        match fs::read_to_string(&args.expression) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Failed to read '{}': {e}", args.expression);
                return ExitCode::from(2);
            },
        }
    } else {
        args.expression
    };

    let mut bindings = Vec::new();
    for binding in &args.bind {
        match binding.split_once('=') {
            Some((name, value)) => bindings.push((name.to_string(), parse_binding(value))),
            None => {
                eprintln!("Invalid binding '{binding}': expected NAME=VALUE");
                return ExitCode::from(2);
            },
        }
    }

    let registry = FunctionRegistry::with_builtins();

    match evaluate_str(&source, &registry, bindings) {
        Ok(Value::Bool(true)) => {
            println!("true");
            ExitCode::SUCCESS
        },
        Ok(Value::Bool(false)) => {
            println!("false");
            ExitCode::FAILURE
        },
        Ok(other) => {
            println!("{other}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        },
    }
}

/// Interprets a binding value: integer, float and boolean spellings keep
/// their kind, anything else is a string.
fn parse_binding(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(r) = value.parse::<f64>() {
        return Value::Float(r);
    }
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(value.to_string()),
    }
}
