use std::cmp::Ordering;

use crate::{
    ast::{BinaryOperator, Expr, Pos},
    engine::{context::Context, evaluator::core::EvalResult, value::Value},
    error::EvalError,
    util::num::i64_to_f64_checked,
};

impl Context<'_> {
    /// Evaluates a binary operation.
    ///
    /// `&&` and `||` receive the unevaluated operand expressions so they
    /// can short-circuit: the right operand is not evaluated when the left
    /// one already decides the result. Every other operator evaluates both
    /// operands, left then right, and dispatches on the value pair.
    ///
    /// # Parameters
    /// - `op`: The operator.
    /// - `left`: Left operand expression.
    /// - `right`: Right operand expression.
    /// - `pos`: Position of the operator, for diagnostics.
    ///
    /// # Returns
    /// An `EvalResult<Value>` with the operation's result.
    pub(crate) fn eval_binary(&self,
                              op: BinaryOperator,
                              left: &Expr,
                              right: &Expr,
                              pos: Pos)
                              -> EvalResult<Value> {
        use BinaryOperator::{And, Equal, Greater, GreaterEqual, Iff, Implies, Less, LessEqual,
                             NotEqual, Or};

        match op {
            And => {
                if !self.eval_bool_operand(left, "&&")? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_bool_operand(right, "&&")?))
            },
            Or => {
                if self.eval_bool_operand(left, "||")? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_bool_operand(right, "||")?))
            },
            Implies => {
                let premise = self.eval_bool_operand(left, "->")?;
                let conclusion = self.eval_bool_operand(right, "->")?;
                Ok(Value::Bool(!premise || conclusion))
            },
            Iff => {
                let lhs = self.eval_bool_operand(left, "<->")?;
                let rhs = self.eval_bool_operand(right, "<->")?;
                Ok(Value::Bool(lhs == rhs))
            },
            Equal | NotEqual => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                let equal = lhs.try_equals(&rhs)
                               .ok_or_else(|| EvalError::TypeMismatch { operation: op.to_string(),
                                                                        left:      lhs.kind(),
                                                                        right:     rhs.kind(),
                                                                        pos })?;
                Ok(Value::Bool(if op == Equal { equal } else { !equal }))
            },
            Less | LessEqual | Greater | GreaterEqual => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                let ordering = lhs.try_compare(&rhs)
                                  .ok_or_else(|| EvalError::TypeMismatch { operation: op.to_string(),
                                                                           left:      lhs.kind(),
                                                                           right:     rhs.kind(),
                                                                           pos })?;
                let satisfied = match op {
                    Less => ordering == Ordering::Less,
                    LessEqual => ordering != Ordering::Greater,
                    Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };
                Ok(Value::Bool(satisfied))
            },
            _ => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                apply_arithmetic(op, &lhs, &rhs, pos)
            },
        }
    }

    /// Evaluates one logical operand and requires it to be a boolean.
    fn eval_bool_operand(&self, operand: &Expr, operation: &str) -> EvalResult<bool> {
        let value = self.eval(operand)?;
        value.as_bool()
             .ok_or_else(|| EvalError::ExpectedType { operation: operation.to_string(),
                                                      expected:  "Boolean".to_string(),
                                                      found:     value.kind(),
                                                      pos:       operand.position(), })
    }
}

/// Applies an arithmetic operator to two values.
///
/// Integer pairs stay in integer arithmetic with overflow checking; any
/// float operand promotes both sides to `f64` (refusing integers too large
/// to promote exactly). Division and modulo by zero fail with
/// `ArithmeticError` instead of producing platform-dependent values, for
/// floats as well as integers. Exponentiation with a non-negative integer
/// exponent stays integral, so `2 ** 3 ** 2` is exactly `512`.
///
/// Shared by the operator evaluator and the `math.*` builtins so the two
/// can never drift apart.
pub(crate) fn apply_arithmetic(op: BinaryOperator,
                               left: &Value,
                               right: &Value,
                               pos: Pos)
                               -> EvalResult<Value> {
    use BinaryOperator::{Add, Div, Mod, Mul, Pow, Sub};

    if !left.is_numeric() || !right.is_numeric() {
        return Err(EvalError::TypeMismatch { operation: op.to_string(),
                                             left:      left.kind(),
                                             right:     right.kind(),
                                             pos });
    }

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let result = match op {
            Add => a.checked_add(*b),
            Sub => a.checked_sub(*b),
            Mul => a.checked_mul(*b),
            Div => {
                if *b == 0 {
                    return Err(division_by_zero(op, pos));
                }
                a.checked_div(*b)
            },
            Mod => {
                if *b == 0 {
                    return Err(division_by_zero(op, pos));
                }
                a.checked_rem(*b)
            },
            Pow => {
                if *b >= 0 {
                    let exponent = u32::try_from(*b).map_err(|_| overflow(op, pos))?;
                    a.checked_pow(exponent)
                } else {
                    // Negative exponents leave the integers; fall through
                    // to the float path below.
                    None
                }
            },
            _ => None,
        };

        match result {
            Some(value) => return Ok(Value::Int(value)),
            None if op != Pow || *b >= 0 => return Err(overflow(op, pos)),
            None => {},
        }
    }

    let a = promote(left, op, pos)?;
    let b = promote(right, op, pos)?;

    let result = match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => {
            if b == 0.0 {
                return Err(division_by_zero(op, pos));
            }
            a / b
        },
        Mod => {
            if b == 0.0 {
                return Err(division_by_zero(op, pos));
            }
            a % b
        },
        Pow => a.powf(b),
        _ => {
            return Err(EvalError::TypeMismatch { operation: op.to_string(),
                                                 left:      left.kind(),
                                                 right:     right.kind(),
                                                 pos });
        },
    };

    Ok(Value::Float(result))
}

/// Promotes a numeric value to `f64`, refusing lossy conversions.
fn promote(value: &Value, op: BinaryOperator, pos: Pos) -> EvalResult<f64> {
    match value {
        Value::Float(r) => Ok(*r),
        Value::Int(n) => i64_to_f64_checked(*n, EvalError::ArithmeticError {
            operation: op.to_string(),
            detail: format!("{n} is not exactly representable as a float"),
            pos,
        }),
        other => Err(EvalError::ExpectedType { operation: op.to_string(),
                                               expected:  "Integer or Float".to_string(),
                                               found:     other.kind(),
                                               pos }),
    }
}

fn division_by_zero(op: BinaryOperator, pos: Pos) -> EvalError {
    let detail = if op == BinaryOperator::Mod {
        "modulo by zero"
    } else {
        "division by zero"
    };
    EvalError::ArithmeticError { operation: op.to_string(),
                                 detail: detail.to_string(),
                                 pos }
}

fn overflow(op: BinaryOperator, pos: Pos) -> EvalError {
    EvalError::ArithmeticError { operation: op.to_string(),
                                 detail:    "integer overflow".to_string(),
                                 pos }
}
