use std::collections::BTreeMap;

use crate::{
    ast::{Expr, Pos},
    engine::{context::Context, value::Value},
    error::EvalError,
};

/// Result type used by the evaluator.
///
/// Every evaluation either produces a value or a typed, recoverable
/// [`EvalError`]; the engine never aborts the host process.
pub type EvalResult<T> = Result<T, EvalError>;

impl Context<'_> {
    /// Evaluates an expression against this context.
    ///
    /// This is the main entry point for evaluation. The evaluator walks the
    /// tree, dispatching on the expression form; it holds no state of its
    /// own beyond the call stack, so evaluating the same tree against the
    /// same context twice yields identical results.
    ///
    /// # Parameters
    /// - `expr`: Expression to evaluate.
    ///
    /// # Returns
    /// The computed [`Value`], or the first [`EvalError`] encountered.
    ///
    /// # Errors
    /// See [`EvalError`] for the failure taxonomy: unresolved names, type
    /// mismatches, arithmetic faults, arity violations.
    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Program { statements, .. } => self.eval_sequence(statements),
            Expr::Block { expressions, .. } => self.eval_sequence(expressions),
            Expr::Literal { value, .. } => Ok(Value::from(value)),
            Expr::Variable { name, pos } => self.eval_variable(name, *pos),
            Expr::UnaryOp { op, expr, pos } => self.eval_unary(*op, expr, *pos),
            Expr::BinaryOp { op,
                             left,
                             right,
                             pos, } => self.eval_binary(*op, left, right, *pos),
            Expr::FunctionCall { name,
                                 arguments,
                                 pos, } => self.eval_call(name, arguments, *pos),
            Expr::Quantifier { kind,
                               variable,
                               domain,
                               condition,
                               pos, } => self.eval_quantifier(*kind, variable, domain, condition, *pos),
            Expr::Conditional { condition,
                                then_branch,
                                else_branch,
                                pos, } => {
                self.eval_conditional(condition, then_branch, else_branch, *pos)
            },
            Expr::Collection { elements, .. } => self.eval_collection(elements),
            Expr::Object { entries, .. } => self.eval_object(entries),
        }
    }

    /// Evaluates a statement sequence; its value is the last statement's
    /// value, or `Null` for an empty sequence.
    fn eval_sequence(&self, expressions: &[Expr]) -> EvalResult<Value> {
        let mut last = Value::Null;
        for expression in expressions {
            last = self.eval(expression)?;
        }
        Ok(last)
    }

    /// Resolves a variable by walking the scope chain outward.
    fn eval_variable(&self, name: &str, pos: Pos) -> EvalResult<Value> {
        self.get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable { name: name.to_string(),
                                                          pos })
    }

    /// Evaluates a conditional, running exactly one branch.
    ///
    /// The unchosen branch is never evaluated, which preserves
    /// short-circuit semantics for side-effecting functions such as file
    /// reads.
    fn eval_conditional(&self,
                        condition: &Expr,
                        then_branch: &Expr,
                        else_branch: &Expr,
                        pos: Pos)
                        -> EvalResult<Value> {
        let tested = self.eval(condition)?;
        match tested.as_bool() {
            Some(true) => self.eval(then_branch),
            Some(false) => self.eval(else_branch),
            None => Err(EvalError::ExpectedType { operation: "conditional".to_string(),
                                                  expected:  "Boolean".to_string(),
                                                  found:     tested.kind(),
                                                  pos }),
        }
    }

    /// Evaluates a collection literal, preserving source order.
    fn eval_collection(&self, elements: &[Expr]) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(self.eval(element)?);
        }
        Ok(Value::Collection(values))
    }

    /// Evaluates an object literal. Entries are evaluated in source order;
    /// duplicate keys take the last-written value.
    fn eval_object(&self, entries: &[(String, Expr)]) -> EvalResult<Value> {
        let mut object = BTreeMap::new();
        for (key, expression) in entries {
            let value = self.eval(expression)?;
            object.insert(key.clone(), value);
        }
        Ok(Value::Object(object))
    }
}
