//! # logica
//!
//! logica is a rule-predicate expression engine for validating source
//! repositories. Rules are logical predicates written in a small
//! expression language — boolean logic, comparisons, arithmetic,
//! `forall`/`exists` quantifiers over runtime-computed domains, and calls
//! into a registry of native functions that inspect files, strings and
//! numbers. A rule that evaluates to `false` (or fails to evaluate) is a
//! violation against the target under test.
//!
//! The engine takes a UTF-8 expression string and a set of seed bindings,
//! and produces a `Result<Value, EvalError>`. Where the expression came
//! from and what happens to the result are the caller's concern.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    engine::{context::Context, lexer::tokenize, parser::parse, registry::FunctionRegistry, value::Value},
    error::EngineError,
};

/// Defines the structure of parsed rule expressions.
///
/// Declares the `Expr` sum type and related types that represent the
/// syntactic structure of a rule as a tree, with source positions attached
/// to every node for error reporting.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// Every failure mode is a typed, recoverable value carrying enough
/// context (positions, names, operand kinds) to render an actionable
/// message without re-parsing.
pub mod error;
/// The expression engine: lexer, parser, values, contexts, the function
/// registry and the evaluator.
pub mod engine;
/// Evaluates compiled rules against targets on a worker pool and
/// aggregates violations.
pub mod validate;
/// General utilities for safe numeric conversion.
pub mod util;

/// Parses and evaluates an expression string against a fresh context.
///
/// This is the top-level convenience entry: lex, parse, seed a root
/// context with `bindings`, evaluate. Callers that reuse one rule across
/// many targets should prefer [`validate::Rule::compile`] and keep the
/// AST.
///
/// # Parameters
/// - `source`: The rule expression text.
/// - `registry`: The function registry to resolve calls against.
/// - `bindings`: Name/value pairs seeded into the root scope.
///
/// # Errors
/// Returns the first parse or evaluation error, with source position.
///
/// # Examples
/// ```
/// use logica::{engine::{registry::FunctionRegistry, value::Value}, evaluate_str};
///
/// let registry = FunctionRegistry::with_builtins();
/// let result = evaluate_str("1 + 2 == 3", &registry, Vec::new());
/// assert_eq!(result.unwrap(), Value::Bool(true));
///
/// let bound = evaluate_str("string.length($name) > 0",
///                          &registry,
///                          vec![("name".to_string(), Value::Str("core".to_string()))]);
/// assert_eq!(bound.unwrap(), Value::Bool(true));
/// ```
pub fn evaluate_str(source: &str,
                    registry: &FunctionRegistry,
                    bindings: Vec<(String, Value)>)
                    -> Result<Value, EngineError> {
    let program = parse(&tokenize(source))?;
    let ctx = Context::with_bindings(registry, bindings);
    Ok(ctx.eval(&program)?)
}
