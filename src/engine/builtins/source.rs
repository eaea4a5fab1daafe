use once_cell::sync::Lazy;
use regex::Regex;

use crate::engine::{
    builtins::str_arg,
    registry::{Function, FunctionRegistry},
    value::{Value, ValueKind},
};

// These are advisory heuristics over raw text, not parsers. They trade
// precision for tolerance: malformed input yields empty results, never an
// error, and a rule that needs certainty must say so in its own terms.

static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub\s+)?(?:class|struct|enum|interface|trait)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("type declaration pattern is valid")
});

static FN_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\b(?:fn|def|function)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(")
        .expect("function keyword pattern is valid")
});

static FN_C_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:[A-Za-z_][A-Za-z0-9_:<>,&*\s]*?)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\([^;{}]*\)\s*\{")
        .expect("C-style function pattern is valid")
});

static NAMESPACE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:namespace|mod|package)\s+([A-Za-z_][A-Za-z0-9_:.]*)")
        .expect("namespace pattern is valid")
});

static INCLUDE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:#\s*include\s*[<"]([^>"]+)[>"]|use\s+([A-Za-z_][A-Za-z0-9_:{}, ]*);|import\s+([A-Za-z_][A-Za-z0-9_.]*))"#)
        .expect("include pattern is valid")
});

static MAIN_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfn\s+main\s*\(|\bint\s+main\s*\(|(?m)^\s*def\s+main\s*\(")
        .expect("main pattern is valid")
});

/// Control-flow keywords the C-style function heuristic must not mistake
/// for function names.
const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "match", "return", "catch"];

/// Registers the source-text analysis functions.
pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new(
        "source.extract_types",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Names of type declarations (class/struct/enum/interface/trait) found by pattern scanning.",
        Box::new(|args, _| {
            let code = str_arg("source.extract_types", args, 0)?;
            Ok(captures(&TYPE_DECL, code))
        }),
    ));

    registry.register(Function::new(
        "source.count_types",
        Some(vec![ValueKind::String]),
        ValueKind::Integer,
        "Number of type declarations found by pattern scanning.",
        Box::new(|args, _| {
            let code = str_arg("source.count_types", args, 0)?;
            Ok(Value::Int(TYPE_DECL.captures_iter(code).count() as i64))
        }),
    ));

    registry.register(Function::new(
        "source.extract_functions",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Names of function definitions found by pattern scanning over comment-stripped text.",
        Box::new(|args, _| {
            let code = str_arg("source.extract_functions", args, 0)?;
            Ok(Value::Collection(function_names(&strip_comments(code))))
        }),
    ));

    registry.register(Function::new(
        "source.count_functions",
        Some(vec![ValueKind::String]),
        ValueKind::Integer,
        "Number of function definitions found by pattern scanning.",
        Box::new(|args, _| {
            let code = str_arg("source.count_functions", args, 0)?;
            Ok(Value::Int(function_names(&strip_comments(code)).len() as i64))
        }),
    ));

    registry.register(Function::new(
        "source.extract_namespaces",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Names of namespace/module/package declarations found by pattern scanning.",
        Box::new(|args, _| {
            let code = str_arg("source.extract_namespaces", args, 0)?;
            Ok(captures(&NAMESPACE_DECL, code))
        }),
    ));

    registry.register(Function::new(
        "source.extract_includes",
        Some(vec![ValueKind::String]),
        ValueKind::Collection,
        "Targets of include/use/import lines found by pattern scanning.",
        Box::new(|args, _| {
            let code = str_arg("source.extract_includes", args, 0)?;
            let mut found = Vec::new();
            for captures in INCLUDE_LINE.captures_iter(code) {
                let target = captures.get(1)
                                     .or_else(|| captures.get(2))
                                     .or_else(|| captures.get(3));
                if let Some(target) = target {
                    found.push(Value::Str(target.as_str().trim().to_string()));
                }
            }
            Ok(Value::Collection(found))
        }),
    ));

    registry.register(Function::new(
        "source.strip_comments",
        Some(vec![ValueKind::String]),
        ValueKind::String,
        "The text with // line comments and /* */ block comments removed.",
        Box::new(|args, _| {
            let code = str_arg("source.strip_comments", args, 0)?;
            Ok(Value::Str(strip_comments(code)))
        }),
    ));

    registry.register(Function::new(
        "source.line_count",
        Some(vec![ValueKind::String]),
        ValueKind::Integer,
        "Number of non-blank lines after comment stripping.",
        Box::new(|args, _| {
            let code = str_arg("source.line_count", args, 0)?;
            let count = strip_comments(code).lines()
                                            .filter(|line| !line.trim().is_empty())
                                            .count();
            Ok(Value::Int(count as i64))
        }),
    ));

    registry.register(Function::new(
        "source.has_main",
        Some(vec![ValueKind::String]),
        ValueKind::Boolean,
        "True if the text appears to define a main entry point.",
        Box::new(|args, _| {
            let code = str_arg("source.has_main", args, 0)?;
            Ok(Value::Bool(MAIN_DECL.is_match(code)))
        }),
    ));
}

/// Collects the first capture group of every match.
fn captures(pattern: &Regex, code: &str) -> Value {
    let found = pattern.captures_iter(code)
                       .filter_map(|c| c.get(1))
                       .map(|m| Value::Str(m.as_str().to_string()))
                       .collect();
    Value::Collection(found)
}

/// Unions the keyword-based and C-style function heuristics, filtering
/// control-flow keywords the C-style pattern can mistake for names.
fn function_names(code: &str) -> Vec<Value> {
    let mut names: Vec<String> = FN_KEYWORD.captures_iter(code)
                                           .filter_map(|c| c.get(1))
                                           .map(|m| m.as_str().to_string())
                                           .collect();

    for captures in FN_C_STYLE.captures_iter(code) {
        if let Some(name) = captures.get(1) {
            let name = name.as_str();
            if !KEYWORDS.contains(&name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    names.into_iter().map(Value::Str).collect()
}

/// Removes `//` line comments and `/* */` block comments, leaving string
/// contents untouched well enough for line counting.
fn strip_comments(code: &str) -> String {
    let mut result = String::with_capacity(code.len());
    let mut chars = code.chars().peekable();
    let mut in_string: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(quote) = in_string {
            result.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            } else if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = Some(c);
                result.push(c);
            },
            '/' => match chars.peek() {
                Some('/') => {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                },
                Some('*') => {
                    chars.next();
                    let mut last = '\0';
                    for next in chars.by_ref() {
                        if last == '*' && next == '/' {
                            break;
                        }
                        // Keep newlines so line numbers stay meaningful.
                        if next == '\n' {
                            result.push('\n');
                        }
                        last = next;
                    }
                },
                _ => result.push(c),
            },
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::Context;

    fn call(name: &str, code: &str) -> Value {
        let registry = FunctionRegistry::with_builtins();
        let ctx = Context::new(&registry);
        registry.call(name, &[Value::Str(code.to_string())], &ctx)
                .expect("source functions never fail on well-typed input")
    }

    #[test]
    fn type_extraction_spans_languages() {
        let code = "class Foo {};\nstruct Bar;\npub trait Baz {}\n";
        let found = call("source.extract_types", code);
        assert_eq!(found,
                   Value::Collection(vec![Value::Str("Foo".to_string()),
                                          Value::Str("Bar".to_string()),
                                          Value::Str("Baz".to_string())]));
    }

    #[test]
    fn function_extraction_skips_control_flow() {
        let code = "int main() {\n  if (x) {}\n}\nfn helper() {}\n";
        let found = call("source.extract_functions", code);
        assert_eq!(found,
                   Value::Collection(vec![Value::Str("helper".to_string()),
                                          Value::Str("main".to_string())]));
    }

    #[test]
    fn malformed_input_yields_empty_results() {
        assert_eq!(call("source.extract_types", "{{{{ %%% not code"),
                   Value::Collection(Vec::new()));
        assert_eq!(call("source.line_count", ""), Value::Int(0));
    }

    #[test]
    fn line_count_ignores_comments_and_blanks() {
        let code = "// header\nint x = 1;\n\n/* block\n   comment */\nint y = 2;\n";
        assert_eq!(call("source.line_count", code), Value::Int(2));
    }

    #[test]
    fn include_extraction_reads_all_three_styles() {
        let code = "#include <vector>\nuse std::fs;\nimport os.path\n";
        let found = call("source.extract_includes", code);
        assert_eq!(found,
                   Value::Collection(vec![Value::Str("vector".to_string()),
                                          Value::Str("std::fs".to_string()),
                                          Value::Str("os.path".to_string())]));
    }
}
