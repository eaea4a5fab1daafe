use crate::{
    ast::Pos,
    engine::{
        builtins::collection_arg,
        registry::{Function, FunctionRegistry},
        value::{Value, ValueKind},
    },
    error::EvalError,
};

/// Registers the collection primitives. All are pure.
pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new(
        "collection.count",
        Some(vec![ValueKind::Collection]),
        ValueKind::Integer,
        "Number of elements in the collection.",
        Box::new(|args, _| {
            let items = collection_arg("collection.count", args, 0)?;
            Ok(Value::Int(items.len() as i64))
        }),
    ));

    registry.register(Function::new(
        "collection.contains",
        None,
        ValueKind::Boolean,
        "True if the collection contains the given value; comparison follows the engine's equality rules.",
        Box::new(|args, _| {
            if args.len() != 2 {
                return Err(EvalError::ArityError { function: "collection.contains".to_string(),
                                                   expected: 2,
                                                   found:    args.len(),
                                                   pos:      Pos::NONE, });
            }
            let items = collection_arg("collection.contains", args, 0)?;
            let found = items.iter()
                             .any(|item| item.try_equals(&args[1]) == Some(true));
            Ok(Value::Bool(found))
        }),
    ));
}
