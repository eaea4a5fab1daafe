use std::collections::HashMap;

use crate::{
    ast::Pos,
    engine::{
        builtins,
        context::Context,
        value::{Value, ValueKind},
    },
    error::eval_error::EvalError,
};

/// Result type used by native functions and the registry.
pub type NativeResult = Result<Value, EvalError>;

/// The callable body of a native function.
///
/// A handler receives the already-evaluated arguments and the calling
/// context (through which it may look up and call other registered
/// functions, but never mutate bindings). Handlers must not retain or
/// modify their arguments; `Send + Sync` keeps a populated registry
/// shareable across validation worker threads.
pub type NativeFn = Box<dyn Fn(&[Value], &Context) -> NativeResult + Send + Sync>;

/// Describes one registered native function.
///
/// The declared parameter list drives arity and argument-kind checks before
/// the handler runs; the declared return kind exists for documentation and
/// introspection only and is not enforced at runtime.
pub struct Function {
    name:        String,
    params:      Option<Vec<ValueKind>>,
    returns:     ValueKind,
    description: String,
    handler:     NativeFn,
}

impl Function {
    /// Creates a function descriptor.
    ///
    /// # Parameters
    /// - `name`: Fully-qualified name, e.g. `"string.length"`.
    /// - `params`: Declared parameter kinds, or `None` for a variadic
    ///   contract that performs its own argument validation.
    /// - `returns`: Declared return kind, for introspection.
    /// - `description`: One-line human-readable summary.
    /// - `handler`: The native implementation.
    #[must_use]
    pub fn new(name: impl Into<String>,
               params: Option<Vec<ValueKind>>,
               returns: ValueKind,
               description: impl Into<String>,
               handler: NativeFn)
               -> Self {
        Self { name: name.into(),
               params,
               returns,
               description: description.into(),
               handler }
    }

    /// Gets the fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the declared parameter kinds, if the function declares any.
    #[must_use]
    pub fn params(&self) -> Option<&[ValueKind]> {
        self.params.as_deref()
    }

    /// Gets the declared return kind.
    #[must_use]
    pub const fn returns(&self) -> ValueKind {
        self.returns
    }

    /// Gets the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A registry of native functions, looked up by fully-qualified name.
///
/// Entries are inserted once at startup and never removed; lookups are
/// read-only, so one populated registry is safely shared by any number of
/// concurrent evaluations. Registration is the engine's sole extension
/// mechanism: collaborators add functions before evaluation begins.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Creates a registry pre-populated with every builtin category.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Registers a function under its fully-qualified name.
    ///
    /// Registering the same name twice replaces the earlier entry; the
    /// replacement is logged since it usually indicates a collaborator
    /// clobbering a builtin.
    pub fn register(&mut self, function: Function) {
        let name = function.name().to_string();
        if self.functions.insert(name.clone(), function).is_some() {
            log::warn!("function '{name}' was registered more than once; keeping the last");
        } else {
            log::trace!("registered function '{name}'");
        }
    }

    /// Looks up a function descriptor by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Iterates the registered names in unspecified order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Gets the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Calls a registered function with already-evaluated arguments.
    ///
    /// Validates the argument count and, where the function declares
    /// parameter kinds, each argument's kind (an `Integer` is accepted
    /// where a `Float` is declared, matching numeric promotion) before
    /// invoking the handler. Errors come back without positions; the
    /// evaluator stamps the call site on.
    ///
    /// # Errors
    /// - `UndefinedFunction` if `name` is not registered.
    /// - `ArityError` on an argument-count mismatch.
    /// - `ExpectedType` on an argument-kind mismatch.
    /// - Whatever the handler itself returns.
    pub fn call(&self, name: &str, args: &[Value], ctx: &Context) -> NativeResult {
        let function = self.lookup(name)
                           .ok_or_else(|| EvalError::UndefinedFunction { name: name.to_string(),
                                                                         pos:  Pos::NONE, })?;

        if let Some(params) = function.params() {
            if params.len() != args.len() {
                return Err(EvalError::ArityError { function: name.to_string(),
                                                   expected: params.len(),
                                                   found:    args.len(),
                                                   pos:      Pos::NONE, });
            }

            for (index, (declared, arg)) in params.iter().zip(args).enumerate() {
                if !kind_matches(*declared, arg) {
                    return Err(EvalError::ExpectedType {
                        operation: format!("{name} (argument {})", index + 1),
                        expected: declared.to_string(),
                        found: arg.kind(),
                        pos: Pos::NONE,
                    });
                }
            }
        }

        (function.handler)(args, ctx)
    }
}

/// Tests a declared parameter kind against an argument.
///
/// `Float` parameters accept integers, mirroring the numeric promotion the
/// operators perform; every other declaration requires an exact kind.
fn kind_matches(declared: ValueKind, arg: &Value) -> bool {
    match declared {
        ValueKind::Float => arg.is_numeric(),
        other => arg.kind() == other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str, value: Value) -> Function {
        Function::new(name,
                      Some(vec![]),
                      value.kind(),
                      "test constant",
                      Box::new(move |_, _| Ok(value.clone())))
    }

    #[test]
    fn lookup_and_call_roundtrip() {
        let mut registry = FunctionRegistry::new();
        registry.register(constant("test.answer", Value::Int(42)));

        assert!(registry.contains("test.answer"));
        let ctx = Context::new(&registry);
        assert_eq!(registry.call("test.answer", &[], &ctx), Ok(Value::Int(42)));
    }

    #[test]
    fn unknown_names_fail_with_undefined_function() {
        let registry = FunctionRegistry::new();
        let ctx = Context::new(&registry);
        assert!(matches!(registry.call("no.such", &[], &ctx),
                         Err(EvalError::UndefinedFunction { .. })));
    }

    #[test]
    fn arity_is_checked_before_the_handler_runs() {
        let mut registry = FunctionRegistry::new();
        registry.register(constant("test.none", Value::Null));
        let ctx = Context::new(&registry);

        let result = registry.call("test.none", &[Value::Int(1)], &ctx);
        assert!(matches!(result,
                         Err(EvalError::ArityError { expected: 0, found: 1, .. })));
    }

    #[test]
    fn declared_float_parameters_accept_integers() {
        let mut registry = FunctionRegistry::new();
        registry.register(Function::new("test.double",
                                        Some(vec![ValueKind::Float]),
                                        ValueKind::Float,
                                        "doubles a number",
                                        Box::new(|args, _| {
                                            let x = args[0].as_float().unwrap_or(0.0);
                                            Ok(Value::Float(x * 2.0))
                                        })));
        let ctx = Context::new(&registry);

        assert_eq!(registry.call("test.double", &[Value::Int(3)], &ctx),
                   Ok(Value::Float(6.0)));
        assert!(matches!(registry.call("test.double", &[Value::Str("x".into())], &ctx),
                         Err(EvalError::ExpectedType { .. })));
    }
}
