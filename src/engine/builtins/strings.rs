use crate::engine::{
    builtins::str_arg,
    registry::{Function, FunctionRegistry},
    value::{Value, ValueKind},
};

/// Registers the string primitives. All are pure.
pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new(
        "string.length",
        Some(vec![ValueKind::String]),
        ValueKind::Integer,
        "Length of the string in characters.",
        Box::new(|args, _| {
            let s = str_arg("string.length", args, 0)?;
            Ok(Value::Int(s.chars().count() as i64))
        }),
    ));

    registry.register(Function::new(
        "string.concat",
        Some(vec![ValueKind::String, ValueKind::String]),
        ValueKind::String,
        "The two strings joined.",
        Box::new(|args, _| {
            let a = str_arg("string.concat", args, 0)?;
            let b = str_arg("string.concat", args, 1)?;
            Ok(Value::Str(format!("{a}{b}")))
        }),
    ));

    registry.register(Function::new(
        "string.contains",
        Some(vec![ValueKind::String, ValueKind::String]),
        ValueKind::Boolean,
        "True if the first string contains the second as a substring.",
        Box::new(|args, _| {
            let haystack = str_arg("string.contains", args, 0)?;
            let needle = str_arg("string.contains", args, 1)?;
            Ok(Value::Bool(haystack.contains(needle)))
        }),
    ));

    registry.register(Function::new(
        "string.starts_with",
        Some(vec![ValueKind::String, ValueKind::String]),
        ValueKind::Boolean,
        "True if the first string starts with the second.",
        Box::new(|args, _| {
            let haystack = str_arg("string.starts_with", args, 0)?;
            let prefix = str_arg("string.starts_with", args, 1)?;
            Ok(Value::Bool(haystack.starts_with(prefix)))
        }),
    ));

    registry.register(Function::new(
        "string.ends_with",
        Some(vec![ValueKind::String, ValueKind::String]),
        ValueKind::Boolean,
        "True if the first string ends with the second.",
        Box::new(|args, _| {
            let haystack = str_arg("string.ends_with", args, 0)?;
            let suffix = str_arg("string.ends_with", args, 1)?;
            Ok(Value::Bool(haystack.ends_with(suffix)))
        }),
    ));
}
