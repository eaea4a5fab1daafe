use crate::{
    ast::{Expr, Pos},
    engine::{context::Context, evaluator::core::EvalResult, value::Value},
    error::EvalError,
};

impl Context<'_> {
    /// Evaluates a function call.
    ///
    /// The callee is resolved in the registry before any argument is
    /// touched, so an undefined function fails without side effects.
    /// Arguments are then evaluated eagerly, left to right, and handed to
    /// the registry, which validates arity and declared parameter kinds
    /// before invoking the native implementation. A native function may
    /// call back into the evaluator through the same context chain.
    ///
    /// Errors coming out of the native body carry no source position; the
    /// call site is stamped on here.
    pub(crate) fn eval_call(&self,
                            name: &str,
                            arguments: &[Expr],
                            pos: Pos)
                            -> EvalResult<Value> {
        if !self.registry().contains(name) {
            return Err(EvalError::UndefinedFunction { name: name.to_string(),
                                                      pos });
        }

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval(argument)?);
        }

        self.registry()
            .call(name, &args, self)
            .map_err(|error| error.with_pos(pos))
    }
}
