use crate::{
    ast::{Expr, Pos},
    engine::{
        builtins::{int_arg, str_arg},
        lexer::tokenize,
        parser::parse,
        registry::{Function, FunctionRegistry},
        value::{Value, ValueKind},
    },
    error::EvalError,
};

/// Hard ceiling on fixpoint iterations, applied on top of the caller's
/// budget so one hostile rule cannot stall a validation run.
pub const MAX_FIXPOINT_ITERATIONS: i64 = 100_000;

/// Registers the self-referential utilities.
pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new(
        "logic.is_well_formed",
        Some(vec![ValueKind::String]),
        ValueKind::Boolean,
        "True if the given text lexes and parses as a rule expression.",
        Box::new(|args, _| {
            let text = str_arg("logic.is_well_formed", args, 0)?;
            Ok(Value::Bool(parse(&tokenize(text)).is_ok()))
        }),
    ));

    registry.register(Function::new(
        "logic.all_functions_exist",
        Some(vec![ValueKind::String]),
        ValueKind::Boolean,
        "True if every function the given expression calls is registered; false for unparseable text.",
        Box::new(|args, ctx| {
            let text = str_arg("logic.all_functions_exist", args, 0)?;
            let Ok(program) = parse(&tokenize(text)) else {
                return Ok(Value::Bool(false));
            };

            let mut all_exist = true;
            program.walk(&mut |node| {
                if let Expr::FunctionCall { name, .. } = node {
                    all_exist &= ctx.registry().contains(name);
                }
            });
            Ok(Value::Bool(all_exist))
        }),
    ));

    registry.register(Function::new(
        "fixpoint.iterate",
        None,
        ValueKind::Float,
        "Applies a registered one-argument function to its own output until two consecutive \
         results converge (numeric difference strictly under the tolerance, or exact equality), \
         or the iteration budget runs out, in which case the last computed value is returned.",
        Box::new(|args, ctx| {
            if args.len() != 4 {
                return Err(EvalError::ArityError { function: "fixpoint.iterate".to_string(),
                                                   expected: 4,
                                                   found:    args.len(),
                                                   pos:      Pos::NONE, });
            }

            let function = str_arg("fixpoint.iterate", args, 0)?;
            let max_iterations = int_arg("fixpoint.iterate", args, 2)?;
            let tolerance = &args[3];

            if !ctx.registry().contains(function) {
                return Err(EvalError::UndefinedFunction { name: function.to_string(),
                                                          pos:  Pos::NONE, });
            }
            if max_iterations < 0 {
                return Err(EvalError::InvalidArgument {
                    function: "fixpoint.iterate".to_string(),
                    detail: format!("max_iterations must be non-negative, got {max_iterations}"),
                    pos: Pos::NONE,
                });
            }
            if tolerance.is_numeric() {
                let bound = tolerance.as_float().unwrap_or(0.0);
                if bound < 0.0 {
                    return Err(EvalError::InvalidArgument {
                        function: "fixpoint.iterate".to_string(),
                        detail: format!("tolerance must be non-negative, got {bound}"),
                        pos: Pos::NONE,
                    });
                }
            }

            let budget = max_iterations.min(MAX_FIXPOINT_ITERATIONS);
            let mut current = args[1].clone();

            for _ in 0..budget {
                let next = ctx.registry().call(function, &[current.clone()], ctx)?;
                if converged(&current, &next, tolerance) {
                    return Ok(next);
                }
                current = next;
            }

            // Budget exhausted: the last computed value, not a failure.
            // Callers that require strict convergence must check separately.
            Ok(current)
        }),
    ));
}

/// Tests the stopping criterion between two consecutive results.
///
/// Numeric pairs converge when their difference is strictly inside the
/// tolerance; everything else converges only on exact equality.
fn converged(current: &Value, next: &Value, tolerance: &Value) -> bool {
    if let (Some(a), Some(b), Some(bound)) = (current.as_float(), next.as_float(), tolerance.as_float()) {
        return (a - b).abs() < bound || a == b;
    }
    current.try_equals(next) == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::Context;

    /// `half_plus_one(x) = x / 2 + 1`, the reference convergence example;
    /// its fixpoint is 2.
    fn registry_with_half_plus_one() -> FunctionRegistry {
        let mut registry = FunctionRegistry::with_builtins();
        registry.register(Function::new("test.half_plus_one",
                                        Some(vec![ValueKind::Integer]),
                                        ValueKind::Integer,
                                        "x / 2 + 1",
                                        Box::new(|args, _| {
                                            let x = int_arg("test.half_plus_one", args, 0)?;
                                            Ok(Value::Int(x / 2 + 1))
                                        })));
        registry
    }

    fn iterate(registry: &FunctionRegistry, initial: i64, budget: i64, tolerance: i64) -> Value {
        let ctx = Context::new(registry);
        registry.call("fixpoint.iterate",
                      &[Value::Str("test.half_plus_one".to_string()),
                        Value::Int(initial),
                        Value::Int(budget),
                        Value::Int(tolerance)],
                      &ctx)
                .expect("fixpoint.iterate should succeed")
    }

    #[test]
    fn converges_to_the_fixpoint_within_budget() {
        let registry = registry_with_half_plus_one();
        assert_eq!(iterate(&registry, 10, 50, 1), Value::Int(2));
    }

    #[test]
    fn exhausted_budget_returns_the_last_value_not_an_error() {
        let registry = registry_with_half_plus_one();
        // One application of 10/2+1.
        assert_eq!(iterate(&registry, 10, 1, 0), Value::Int(6));
        // Zero applications return the initial value untouched.
        assert_eq!(iterate(&registry, 10, 0, 0), Value::Int(10));
    }

    #[test]
    fn unknown_function_names_are_rejected_up_front() {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);
        let result = registry.call("fixpoint.iterate",
                                   &[Value::Str("no.such_fn".to_string()),
                                     Value::Int(1),
                                     Value::Int(5),
                                     Value::Int(0)],
                                   &ctx);
        assert!(matches!(result, Err(EvalError::UndefinedFunction { .. })));
    }

    #[test]
    fn well_formedness_checks_the_grammar_only() {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);
        let check = |text: &str| {
            registry.call("logic.is_well_formed",
                          &[Value::Str(text.to_string())],
                          &ctx)
        };

        assert_eq!(check("1 + 2 == 3"), Ok(Value::Bool(true)));
        assert_eq!(check("forall x in [1]: x > 0"), Ok(Value::Bool(true)));
        assert_eq!(check("1 +"), Ok(Value::Bool(false)));
        assert_eq!(check("no.such_function()"), Ok(Value::Bool(true)));
    }

    #[test]
    fn function_existence_walks_every_call() {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);
        let check = |text: &str| {
            registry.call("logic.all_functions_exist",
                          &[Value::Str(text.to_string())],
                          &ctx)
        };

        assert_eq!(check("string.length(\"x\") > 0"), Ok(Value::Bool(true)));
        assert_eq!(check("string.length(\"x\") > 0 && no.such_function()"),
                   Ok(Value::Bool(false)));
        assert_eq!(check("not ( valid"), Ok(Value::Bool(false)));
    }
}
