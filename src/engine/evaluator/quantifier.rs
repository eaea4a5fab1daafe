use crate::{
    ast::{Expr, Pos, QuantifierKind},
    engine::{
        context::{Context, MAX_SCOPE_DEPTH},
        evaluator::core::EvalResult,
        value::Value,
    },
    error::EvalError,
};

impl Context<'_> {
    /// Evaluates a `forall` or `exists` quantifier.
    ///
    /// The domain expression is evaluated first and must yield a
    /// collection. Each element is bound under the quantifier's variable in
    /// a fresh child scope, in insertion order, and the condition is
    /// evaluated there; the parent scope is never touched, so the bound
    /// variable cannot leak.
    ///
    /// `forall` short-circuits to `false` on the first failing element and
    /// is vacuously `true` over an empty collection. `exists`
    /// short-circuits to `true` on the first satisfying element and is
    /// `false` over an empty collection. Short-circuiting means remaining
    /// elements are not evaluated at all.
    pub(crate) fn eval_quantifier(&self,
                                  kind: QuantifierKind,
                                  variable: &str,
                                  domain: &Expr,
                                  condition: &Expr,
                                  pos: Pos)
                                  -> EvalResult<Value> {
        let elements = match self.eval(domain)? {
            Value::Collection(elements) => elements,
            other => {
                return Err(EvalError::ExpectedType { operation: kind.to_string(),
                                                     expected:  "a Collection domain".to_string(),
                                                     found:     other.kind(),
                                                     pos });
            },
        };

        if self.depth() >= MAX_SCOPE_DEPTH {
            return Err(EvalError::RecursionLimit { depth: MAX_SCOPE_DEPTH,
                                                   pos });
        }

        for element in elements {
            let mut scope = self.child();
            scope.bind(variable, element);

            let outcome = scope.eval(condition)?;
            let satisfied = outcome.as_bool().ok_or_else(|| EvalError::ExpectedType {
                operation: format!("{kind} condition"),
                expected: "Boolean".to_string(),
                found: outcome.kind(),
                pos: condition.position(),
            })?;

            match kind {
                QuantifierKind::Forall if !satisfied => return Ok(Value::Bool(false)),
                QuantifierKind::Exists if satisfied => return Ok(Value::Bool(true)),
                _ => {},
            }
        }

        Ok(Value::Bool(kind == QuantifierKind::Forall))
    }
}
