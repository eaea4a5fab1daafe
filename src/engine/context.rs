use std::collections::HashMap;

use crate::engine::{registry::FunctionRegistry, value::Value};

/// Maximum depth of the scope chain before evaluation is refused.
///
/// Each quantifier iteration adds one link, so this bounds quantifier
/// nesting and keeps a pathological rule from exhausting the stack.
pub const MAX_SCOPE_DEPTH: usize = 128;

/// The variable-binding scope used during one evaluation.
///
/// A context is a mapping from variable names to values, an optional link to
/// a parent scope, and a shared read-only reference to the function
/// registry. Lookup walks outward from the innermost scope, so a quantifier
/// variable shadows an outer binding of the same name without disturbing
/// it. Child contexts never mutate their parents; quantifier-bound
/// variables therefore cannot leak.
///
/// A fresh root context is created per top-level evaluation and a fresh
/// child per quantifier iteration; none outlive the evaluation that spawned
/// them.
pub struct Context<'a> {
    registry: &'a FunctionRegistry,
    vars:     HashMap<String, Value>,
    parent:   Option<&'a Context<'a>>,
    depth:    usize,
}

impl<'a> Context<'a> {
    /// Creates a root context with no bindings.
    #[must_use]
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry,
               vars: HashMap::new(),
               parent: None,
               depth: 0 }
    }

    /// Creates a root context seeded with the given bindings, e.g. the
    /// path of the file currently under validation.
    #[must_use]
    pub fn with_bindings<I>(registry: &'a FunctionRegistry, bindings: I) -> Self
        where I: IntoIterator<Item = (String, Value)>
    {
        Self { registry,
               vars: bindings.into_iter().collect(),
               parent: None,
               depth: 0 }
    }

    /// Creates a child scope for one quantifier iteration.
    ///
    /// The child starts empty and resolves unknown names through `self`.
    #[must_use]
    pub fn child<'b>(&'b self) -> Context<'b>
        where 'a: 'b
    {
        Context { registry: self.registry,
                  vars:     HashMap::new(),
                  parent:   Some(self),
                  depth:    self.depth + 1, }
    }

    /// Binds `name` to `value` in this scope. A repeated bind of the same
    /// name overwrites the earlier value; outer scopes are untouched.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Resolves a variable, walking outward until found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.vars.get(name) {
            Some(value) => Some(value),
            None => self.parent.and_then(|parent| parent.get(name)),
        }
    }

    /// Gets the function registry shared by this evaluation.
    #[must_use]
    pub const fn registry(&self) -> &'a FunctionRegistry {
        self.registry
    }

    /// Gets the number of parent links above this scope.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_until_found() {
        let registry = FunctionRegistry::new();
        let mut root = Context::new(&registry);
        root.bind("x", Value::Int(1));
        root.bind("y", Value::Int(2));

        let mut child = root.child();
        child.bind("x", Value::Int(10));

        assert_eq!(child.get("x"), Some(&Value::Int(10)));
        assert_eq!(child.get("y"), Some(&Value::Int(2)));
        assert_eq!(child.get("z"), None);
    }

    #[test]
    fn child_bindings_never_reach_the_parent() {
        let registry = FunctionRegistry::new();
        let mut root = Context::new(&registry);
        root.bind("x", Value::Int(1));

        {
            let mut child = root.child();
            child.bind("x", Value::Int(99));
            child.bind("leaked", Value::Bool(true));
        }

        assert_eq!(root.get("x"), Some(&Value::Int(1)));
        assert_eq!(root.get("leaked"), None);
    }

    #[test]
    fn rebinding_in_one_scope_takes_the_last_write() {
        let registry = FunctionRegistry::new();
        let mut ctx = Context::new(&registry);
        ctx.bind("x", Value::Int(1));
        ctx.bind("x", Value::Int(2));
        assert_eq!(ctx.get("x"), Some(&Value::Int(2)));
    }
}
