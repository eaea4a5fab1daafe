use std::{fs, path::Path};

use walkdir::WalkDir;

use crate::engine::{
    builtins::str_arg,
    registry::{Function, FunctionRegistry},
    value::{Value, ValueKind},
};

/// Registers the filesystem inspection functions.
///
/// All of these share one error policy: a missing or unreadable path
/// degrades to an empty result — an empty collection from the listing
/// functions, an empty string from `read_file` and the path-component
/// functions, `false` from the predicates. A rule can therefore validate
/// "this file is missing" without tripping an engine error, and a
/// validation run never stalls on a permission problem.
pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new(
        "filesystem.get_files",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Lists the regular files directly inside a directory; empty if the path is missing or unreadable.",
        Box::new(|args, _| {
            let dir = str_arg("filesystem.get_files", args, 0)?;
            Ok(list_files(dir, None))
        }),
    ));

    registry.register(Function::new(
        "filesystem.get_files_with_extension",
        Some(vec![ValueKind::String, ValueKind::String]),
        ValueKind::Collection,
        "Lists the regular files directly inside a directory whose extension matches; empty on a missing path.",
        Box::new(|args, _| {
            let dir = str_arg("filesystem.get_files_with_extension", args, 0)?;
            let ext = str_arg("filesystem.get_files_with_extension", args, 1)?;
            Ok(list_files(dir, Some(ext)))
        }),
    ));

    registry.register(Function::new(
        "filesystem.get_files_recursive",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Lists all regular files beneath a directory, recursively; empty if the path is missing or unreadable.",
        Box::new(|args, _| {
            let dir = str_arg("filesystem.get_files_recursive", args, 0)?;
            let mut files = Vec::new();
            for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    files.push(Value::Str(entry.path().display().to_string()));
                }
            }
            files.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
            Ok(Value::Collection(files))
        }),
    ));

    registry.register(Function::new(
        "filesystem.list_subdirs",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Lists the directories directly inside a directory; empty if the path is missing or unreadable.",
        Box::new(|args, _| {
            let dir = str_arg("filesystem.list_subdirs", args, 0)?;
            let mut subdirs = Vec::new();
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.filter_map(Result::ok) {
                    if entry.file_type().is_ok_and(|t| t.is_dir()) {
                        subdirs.push(Value::Str(entry.path().display().to_string()));
                    }
                }
            }
            subdirs.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
            Ok(Value::Collection(subdirs))
        }),
    ));

    registry.register(Function::new(
        "filesystem.read_file",
        Some(vec![ValueKind::String]),
        ValueKind::String,
        "Reads a file as text; a missing or unreadable file yields an empty string.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.read_file", args, 0)?;
            Ok(Value::Str(fs::read_to_string(path).unwrap_or_default()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.file_exists",
        Some(vec![ValueKind::String]),
        ValueKind::Boolean,
        "True if the path exists at all.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.file_exists", args, 0)?;
            Ok(Value::Bool(Path::new(path).exists()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.is_file",
        Some(vec![ValueKind::String]),
        ValueKind::Boolean,
        "True if the path exists and is a regular file.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.is_file", args, 0)?;
            Ok(Value::Bool(Path::new(path).is_file()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.is_directory",
        Some(vec![ValueKind::String]),
        ValueKind::Boolean,
        "True if the path exists and is a directory.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.is_directory", args, 0)?;
            Ok(Value::Bool(Path::new(path).is_dir()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.has_extension",
        Some(vec![ValueKind::String, ValueKind::String]),
        ValueKind::Boolean,
        "True if the path's extension equals the given one; a leading dot on the extension is optional.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.has_extension", args, 0)?;
            let wanted = str_arg("filesystem.has_extension", args, 1)?;
            let wanted = wanted.strip_prefix('.').unwrap_or(wanted);
            let actual = Path::new(path).extension().and_then(|e| e.to_str());
            Ok(Value::Bool(actual == Some(wanted) && !wanted.is_empty()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.get_filename",
        Some(vec![ValueKind::String]),
        ValueKind::String,
        "The final path component, or an empty string if there is none.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.get_filename", args, 0)?;
            let name = Path::new(path).file_name()
                                      .and_then(|n| n.to_str())
                                      .unwrap_or_default();
            Ok(Value::Str(name.to_string()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.get_stem",
        Some(vec![ValueKind::String]),
        ValueKind::String,
        "The file name without its extension, or an empty string.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.get_stem", args, 0)?;
            let stem = Path::new(path).file_stem()
                                      .and_then(|n| n.to_str())
                                      .unwrap_or_default();
            Ok(Value::Str(stem.to_string()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.get_extension",
        Some(vec![ValueKind::String]),
        ValueKind::String,
        "The extension without the dot, or an empty string.",
        Box::new(|args, _| {
            let path = str_arg("filesystem.get_extension", args, 0)?;
            let ext = Path::new(path).extension()
                                     .and_then(|n| n.to_str())
                                     .unwrap_or_default();
            Ok(Value::Str(ext.to_string()))
        }),
    ));

    registry.register(Function::new(
        "filesystem.current_directory",
        Some(vec![]),
        ValueKind::String,
        "The process working directory, or an empty string if it cannot be read.",
        Box::new(|_, _| {
            let cwd = std::env::current_dir().map(|p| p.display().to_string())
                                             .unwrap_or_default();
            Ok(Value::Str(cwd))
        }),
    ));
}

/// Lists regular files directly inside `dir`, optionally filtered by
/// extension (leading dot optional), sorted for reproducible iteration.
fn list_files(dir: &str, extension: Option<&str>) -> Value {
    let wanted = extension.map(|e| e.strip_prefix('.').unwrap_or(e));
    let mut files = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.filter_map(Result::ok) {
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            if let Some(wanted) = wanted {
                let actual = path.extension().and_then(|e| e.to_str());
                if actual != Some(wanted) {
                    continue;
                }
            }
            files.push(Value::Str(path.display().to_string()));
        }
    }

    files.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
    Value::Collection(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::Context;

    #[test]
    fn missing_directories_yield_empty_collections() {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);

        let result = registry.call("filesystem.get_files",
                                   &[Value::Str("/no/such/dir/anywhere".to_string())],
                                   &ctx);
        assert_eq!(result, Ok(Value::Collection(Vec::new())));
    }

    #[test]
    fn missing_files_read_as_empty_strings() {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);

        let result = registry.call("filesystem.read_file",
                                   &[Value::Str("/no/such/file.txt".to_string())],
                                   &ctx);
        assert_eq!(result, Ok(Value::Str(String::new())));
    }

    #[test]
    fn extension_checks_accept_both_spellings() {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);
        let call = |path: &str, ext: &str| {
            registry.call("filesystem.has_extension",
                          &[Value::Str(path.to_string()), Value::Str(ext.to_string())],
                          &ctx)
        };

        assert_eq!(call("a/b.cpp", "cpp"), Ok(Value::Bool(true)));
        assert_eq!(call("a/b.cpp", ".cpp"), Ok(Value::Bool(true)));
        assert_eq!(call("a/b.cpp", ".hpp"), Ok(Value::Bool(false)));
        assert_eq!(call("a/b", "cpp"), Ok(Value::Bool(false)));
    }
}
