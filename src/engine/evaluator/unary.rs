use crate::{
    ast::{Expr, Pos, UnaryOperator},
    engine::{context::Context, evaluator::core::EvalResult, value::Value},
    error::EvalError,
};

impl Context<'_> {
    /// Evaluates a unary operation.
    ///
    /// `!` requires a boolean operand; `-` requires an integer or float.
    /// Negating `i64::MIN` is an overflow, not a wrap.
    pub(crate) fn eval_unary(&self,
                             op: UnaryOperator,
                             operand: &Expr,
                             pos: Pos)
                             -> EvalResult<Value> {
        let value = self.eval(operand)?;

        match op {
            UnaryOperator::Not => match value {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(EvalError::ExpectedType { operation: "!".to_string(),
                                                       expected:  "Boolean".to_string(),
                                                       found:     other.kind(),
                                                       pos }),
            },
            UnaryOperator::Negate => match value {
                Value::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(|| {
                                     EvalError::ArithmeticError {
                            operation: "-".to_string(),
                            detail: "integer overflow".to_string(),
                            pos,
                        }
                                 }),
                Value::Float(r) => Ok(Value::Float(-r)),
                other => Err(EvalError::ExpectedType { operation: "-".to_string(),
                                                       expected:  "Integer or Float".to_string(),
                                                       found:     other.kind(),
                                                       pos }),
            },
        }
    }
}
