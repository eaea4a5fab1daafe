use crate::{
    ast::{BinaryOperator, Pos},
    engine::{
        builtins::float_arg,
        evaluator::binary::apply_arithmetic,
        registry::{Function, FunctionRegistry},
        value::{Value, ValueKind},
    },
    error::EvalError,
};

/// Registers the arithmetic primitives.
///
/// Each delegates to the operator implementation, so `math.divide` and the
/// `/` operator can never disagree about promotion or zero divisors. These
/// exist for rule expressions that want a mathematical result rather than
/// a relational comparison. All are pure.
pub fn register(registry: &mut FunctionRegistry) {
    arithmetic(registry, "math.add", BinaryOperator::Add, "The sum of two numbers.");
    arithmetic(registry, "math.subtract", BinaryOperator::Sub, "The difference of two numbers.");
    arithmetic(registry, "math.multiply", BinaryOperator::Mul, "The product of two numbers.");
    arithmetic(registry,
               "math.divide",
               BinaryOperator::Div,
               "The quotient of two numbers; division by zero is an error.");
    arithmetic(registry,
               "math.modulo",
               BinaryOperator::Mod,
               "The remainder of two numbers; modulo by zero is an error.");
    arithmetic(registry,
               "math.power",
               BinaryOperator::Pow,
               "The first number raised to the second.");

    registry.register(Function::new(
        "math.abs",
        Some(vec![ValueKind::Float]),
        ValueKind::Float,
        "The absolute value of a number; integers stay integral.",
        Box::new(|args, _| match args.first() {
            Some(Value::Int(n)) => n.checked_abs().map(Value::Int).ok_or_else(|| {
                                       EvalError::ArithmeticError {
                    operation: "math.abs".to_string(),
                    detail: "integer overflow".to_string(),
                    pos: Pos::NONE,
                }
                                   }),
            _ => Ok(Value::Float(float_arg("math.abs", args, 0)?.abs())),
        }),
    ));
}

/// Registers one two-argument arithmetic function backed by the operator
/// evaluator.
fn arithmetic(registry: &mut FunctionRegistry,
              name: &'static str,
              op: BinaryOperator,
              description: &'static str) {
    registry.register(Function::new(
        name,
        Some(vec![ValueKind::Float, ValueKind::Float]),
        ValueKind::Float,
        description,
        Box::new(move |args, _| apply_arithmetic(op, &args[0], &args[1], Pos::NONE)),
    ));
}
