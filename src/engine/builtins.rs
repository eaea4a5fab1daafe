use crate::{
    ast::Pos,
    engine::{
        registry::FunctionRegistry,
        value::{Value, ValueKind},
    },
    error::EvalError,
};

/// Filesystem inspection: listing, reading, existence and path queries.
pub mod filesystem;
/// Advisory pattern-scanning heuristics over raw source text.
pub mod source;
/// String primitives.
pub mod strings;
/// Arithmetic primitives mirroring the operator semantics.
pub mod math;
/// Collection primitives.
pub mod collection;
/// Self-referential utilities: expression checks and fixpoint iteration.
pub mod meta;

/// Registers every builtin category into `registry`.
///
/// Called once per engine instance; collaborators may register additional
/// functions afterwards through the same interface.
pub fn register_all(registry: &mut FunctionRegistry) {
    filesystem::register(registry);
    source::register(registry);
    strings::register(registry);
    math::register(registry);
    collection::register(registry);
    meta::register(registry);
    log::debug!("registered {} builtin functions", registry.len());
}

/// Extracts a string argument, or reports which argument of which function
/// was wrong. The registry has already checked declared kinds; this guards
/// the variadic functions and keeps the checked ones honest.
pub(crate) fn str_arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a str, EvalError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| expected(function, index, "String", args))
}

/// Extracts an integer argument.
pub(crate) fn int_arg(function: &str, args: &[Value], index: usize) -> Result<i64, EvalError> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| expected(function, index, "Integer", args))
}

/// Extracts a numeric argument as `f64`, promoting integers.
pub(crate) fn float_arg(function: &str, args: &[Value], index: usize) -> Result<f64, EvalError> {
    args.get(index)
        .and_then(Value::as_float)
        .ok_or_else(|| expected(function, index, "Integer or Float", args))
}

/// Extracts a collection argument.
pub(crate) fn collection_arg<'a>(function: &str,
                                 args: &'a [Value],
                                 index: usize)
                                 -> Result<&'a [Value], EvalError> {
    args.get(index)
        .and_then(Value::as_collection)
        .ok_or_else(|| expected(function, index, "Collection", args))
}

fn expected(function: &str, index: usize, kind: &str, args: &[Value]) -> EvalError {
    EvalError::ExpectedType { operation: format!("{function} (argument {})", index + 1),
                              expected:  kind.to_string(),
                              found:     args.get(index).map_or(ValueKind::Null, Value::kind),
                              pos:       Pos::NONE, }
}
